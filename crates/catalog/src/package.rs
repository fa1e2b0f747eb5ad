//! 패키지 및 추출기별 메타데이터
//!
//! [`Package`]의 식별 필드(이름, 버전, 생태계, 타입)는 생성 이후 변경되지 않습니다.
//! 메타데이터는 추출기별 태그된 열거형([`PackageMetadata`])으로 표현되며,
//! 병합 시에는 [`Package::merge`]가 정해진 우선순위로 값을 결정합니다.
//!
//! # 병합 우선순위
//!
//! - 메타데이터가 있는 쪽이 없는 쪽보다 우선합니다.
//! - 양쪽 모두 있으면 먼저 기록된 값을 유지합니다 (first-writer-wins).
//! - 패키지 고유 값(content hash, integrity, checksum 등)이 다르면 [`FieldConflict`]를 반환합니다.
//! - 매니페스트마다 달라질 수 있는 값(direct/transitive, requested 범위)은 조용히 첫 값을 유지합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::IdentityKey;
use crate::location::{Location, LocationSet};
use crate::purl;
use crate::types::{Ecosystem, PackageType};

/// 카탈로그 패키지
///
/// 식별 필드는 접근자로만 읽을 수 있으므로 PURL과 어긋나지 않습니다.
///
/// ```compile_fail
/// use lockgraph_catalog::{Location, Package, PackageType};
///
/// let mut pkg = Package::new(PackageType::Nuget, "log4net", "2.0.5", Location::new("a"));
/// pkg.version = "9.9.9".to_owned();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    name: String,
    version: String,
    ecosystem: Ecosystem,
    #[serde(rename = "type")]
    package_type: PackageType,
    /// Package URL (예: `pkg:nuget/AutoMapper@13.0.1`)
    purl: String,
    /// 관찰 위치
    pub locations: LocationSet,
    /// 추출기별 메타데이터
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PackageMetadata>,
}

impl Package {
    /// 새 패키지를 생성합니다. PURL은 타입/이름/버전에서 결정적으로 계산됩니다.
    pub fn new(
        package_type: PackageType,
        name: impl Into<String>,
        version: impl Into<String>,
        location: Location,
    ) -> Self {
        let name = name.into();
        let version = version.into();
        let purl = purl::build(package_type, &name, &version);
        Self {
            name,
            version,
            ecosystem: package_type.ecosystem(),
            package_type,
            purl,
            locations: LocationSet::from(location),
            metadata: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    pub fn package_type(&self) -> PackageType {
        self.package_type
    }

    /// 식별 필드에서 계산된 Package URL
    pub fn purl(&self) -> &str {
        &self.purl
    }

    /// 메타데이터를 지정합니다.
    pub fn with_metadata(mut self, metadata: PackageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// 식별 키를 계산합니다.
    pub fn identity(&self) -> IdentityKey {
        IdentityKey {
            ecosystem: self.ecosystem,
            name: self.name.clone(),
            version: self.version.clone(),
            package_type: self.package_type,
        }
    }

    /// 같은 식별 키를 가진 패키지를 이 패키지에 병합합니다.
    ///
    /// 위치 집합은 합집합(먼저 관찰된 순서 유지), 메타데이터는 모듈 문서의 우선순위를 따릅니다.
    /// 값이 충돌한 필드 목록을 반환합니다.
    pub fn merge(&mut self, incoming: Package) -> Vec<FieldConflict> {
        debug_assert_eq!(self.identity(), incoming.identity());
        self.locations.union(&incoming.locations);

        let Some(theirs) = incoming.metadata else {
            return Vec::new();
        };
        match &mut self.metadata {
            Some(ours) => ours.merge(theirs),
            None => {
                self.metadata = Some(theirs);
                Vec::new()
            }
        }
    }

    /// SBOM 인코더가 사용할 체크섬 문자열을 반환합니다.
    pub fn checksum(&self) -> Option<&str> {
        match self.metadata.as_ref()? {
            PackageMetadata::NugetLockEntry(m) => m.content_hash.as_deref(),
            PackageMetadata::NpmLockEntry(m) => m.integrity.as_deref(),
            PackageMetadata::CargoLockEntry(m) => m.checksum.as_deref(),
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.version, self.package_type)
    }
}

/// 추출기별 메타데이터 (태그된 열거형)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PackageMetadata {
    /// NuGet `packages.lock.json` 항목
    NugetLockEntry(NugetLockEntry),
    /// npm `package-lock.json` 항목
    NpmLockEntry(NpmLockEntry),
    /// `Cargo.lock` 항목
    CargoLockEntry(CargoLockEntry),
}

impl PackageMetadata {
    /// 메타데이터 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NugetLockEntry(_) => "nuget-lock-entry",
            Self::NpmLockEntry(_) => "npm-lock-entry",
            Self::CargoLockEntry(_) => "cargo-lock-entry",
        }
    }

    fn merge(&mut self, incoming: PackageMetadata) -> Vec<FieldConflict> {
        let mut conflicts = Vec::new();
        match (self, incoming) {
            (Self::NugetLockEntry(ours), Self::NugetLockEntry(theirs)) => {
                merge_scalar(&mut ours.content_hash, theirs.content_hash, "content_hash", &mut conflicts);
                fill_if_absent(&mut ours.requested, theirs.requested);
            }
            (Self::NpmLockEntry(ours), Self::NpmLockEntry(theirs)) => {
                merge_scalar(&mut ours.integrity, theirs.integrity, "integrity", &mut conflicts);
                merge_scalar(&mut ours.resolved, theirs.resolved, "resolved", &mut conflicts);
            }
            (Self::CargoLockEntry(ours), Self::CargoLockEntry(theirs)) => {
                merge_scalar(&mut ours.checksum, theirs.checksum, "checksum", &mut conflicts);
                merge_scalar(&mut ours.source, theirs.source, "source", &mut conflicts);
            }
            (ours, theirs) => conflicts.push(FieldConflict {
                field: "kind".to_owned(),
                kept: ours.kind().to_owned(),
                discarded: theirs.kind().to_owned(),
            }),
        }
        conflicts
    }
}

/// NuGet lock 항목의 의존성 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyType {
    Direct,
    Transitive,
    Project,
    CentralTransitive,
}

impl DependencyType {
    /// lockfile의 `type` 값을 파싱합니다.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Direct" => Some(Self::Direct),
            "Transitive" => Some(Self::Transitive),
            "Project" => Some(Self::Project),
            "CentralTransitive" => Some(Self::CentralTransitive),
            _ => None,
        }
    }
}

/// NuGet `packages.lock.json` 메타데이터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NugetLockEntry {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_type: Option<DependencyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested: Option<String>,
}

/// npm `package-lock.json` 메타데이터
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpmLockEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
}

/// `Cargo.lock` 메타데이터
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoLockEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// 병합 중 발견된 필드 값 충돌
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConflict {
    /// 필드 이름
    pub field: String,
    /// 유지된 값 (먼저 기록된 값)
    pub kept: String,
    /// 버려진 값
    pub discarded: String,
}

fn merge_scalar(
    ours: &mut Option<String>,
    theirs: Option<String>,
    field: &str,
    conflicts: &mut Vec<FieldConflict>,
) {
    match (ours.as_ref(), theirs) {
        (_, None) => {}
        (None, Some(value)) => *ours = Some(value),
        (Some(kept), Some(value)) if *kept != value => conflicts.push(FieldConflict {
            field: field.to_owned(),
            kept: kept.clone(),
            discarded: value,
        }),
        (Some(_), Some(_)) => {}
    }
}

fn fill_if_absent<T>(ours: &mut Option<T>, theirs: Option<T>) {
    if ours.is_none() {
        *ours = theirs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nuget(hash: Option<&str>, dep: DependencyType, path: &str) -> Package {
        Package::new(PackageType::Nuget, "AutoMapper", "13.0.1", Location::new(path)).with_metadata(
            PackageMetadata::NugetLockEntry(NugetLockEntry {
                name: "AutoMapper".to_owned(),
                version: "13.0.1".to_owned(),
                content_hash: hash.map(str::to_owned),
                dependency_type: Some(dep),
                requested: None,
            }),
        )
    }

    #[test]
    fn new_computes_purl_and_ecosystem() {
        let pkg = Package::new(PackageType::Nuget, "log4net", "2.0.5", Location::new("a"));
        assert_eq!(pkg.purl(), "pkg:nuget/log4net@2.0.5");
        assert_eq!(pkg.ecosystem(), Ecosystem::Dotnet);
        assert_eq!(pkg.package_type(), PackageType::Nuget);
        assert_eq!(pkg.name(), "log4net");
        assert_eq!(pkg.version(), "2.0.5");
        assert_eq!(pkg.locations.len(), 1);
    }

    #[test]
    fn merge_unions_locations() {
        let mut a = nuget(Some("h1"), DependencyType::Direct, "a/packages.lock.json");
        let b = nuget(Some("h1"), DependencyType::Direct, "b/packages.lock.json");
        let conflicts = a.merge(b);
        assert!(conflicts.is_empty());
        let paths: Vec<&str> = a.locations.iter().map(Location::path).collect();
        assert_eq!(paths, vec!["a/packages.lock.json", "b/packages.lock.json"]);
    }

    #[test]
    fn merge_conflicting_hash_keeps_first() {
        let mut a = nuget(Some("first"), DependencyType::Direct, "a");
        let b = nuget(Some("second"), DependencyType::Direct, "b");
        let conflicts = a.merge(b);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].field, "content_hash");
        assert_eq!(conflicts[0].kept, "first");
        assert_eq!(conflicts[0].discarded, "second");
        assert_eq!(a.checksum(), Some("first"));
    }

    #[test]
    fn merge_fills_missing_hash_without_conflict() {
        let mut a = nuget(None, DependencyType::Direct, "a");
        let b = nuget(Some("h"), DependencyType::Direct, "b");
        assert!(a.merge(b).is_empty());
        assert_eq!(a.checksum(), Some("h"));
    }

    #[test]
    fn merge_dependency_type_is_per_manifest() {
        // 한 프로젝트에서는 Direct, 다른 프로젝트에서는 Transitive일 수 있음
        let mut a = nuget(Some("h"), DependencyType::Direct, "a");
        let b = nuget(Some("h"), DependencyType::Transitive, "b");
        assert!(a.merge(b).is_empty());
        match &a.metadata {
            Some(PackageMetadata::NugetLockEntry(m)) => {
                assert_eq!(m.dependency_type, Some(DependencyType::Direct));
            }
            other => panic!("unexpected metadata: {other:?}"),
        }
    }

    #[test]
    fn merge_richer_side_wins() {
        let mut bare = Package::new(PackageType::Nuget, "AutoMapper", "13.0.1", Location::new("x"));
        let rich = nuget(Some("h"), DependencyType::Direct, "y");
        assert!(bare.merge(rich).is_empty());
        assert!(bare.metadata.is_some());

        let mut rich = nuget(Some("h"), DependencyType::Direct, "y");
        let bare = Package::new(PackageType::Nuget, "AutoMapper", "13.0.1", Location::new("x"));
        assert!(rich.merge(bare).is_empty());
        assert_eq!(rich.checksum(), Some("h"));
    }

    #[test]
    fn merge_mismatched_metadata_kind_reports_conflict() {
        let mut a = Package::new(PackageType::Npm, "x", "1.0.0", Location::new("a"))
            .with_metadata(PackageMetadata::NpmLockEntry(NpmLockEntry::default()));
        let b = Package::new(PackageType::Npm, "x", "1.0.0", Location::new("b"))
            .with_metadata(PackageMetadata::CargoLockEntry(CargoLockEntry::default()));
        let conflicts = a.merge(b);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].field, "kind");
        assert!(matches!(a.metadata, Some(PackageMetadata::NpmLockEntry(_))));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut a = nuget(Some("h"), DependencyType::Direct, "a");
        let snapshot = a.clone();
        assert!(a.merge(snapshot.clone()).is_empty());
        assert_eq!(a, snapshot);
    }

    #[test]
    fn metadata_serializes_with_kind_tag() {
        let meta = PackageMetadata::CargoLockEntry(CargoLockEntry {
            source: Some("registry+https://github.com/rust-lang/crates.io-index".to_owned()),
            checksum: None,
        });
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["kind"], "cargo-lock-entry");
        assert!(json.get("checksum").is_none());
    }

    #[test]
    fn dependency_type_parse() {
        assert_eq!(DependencyType::parse("Direct"), Some(DependencyType::Direct));
        assert_eq!(
            DependencyType::parse("CentralTransitive"),
            Some(DependencyType::CentralTransitive)
        );
        assert_eq!(DependencyType::parse("direct"), None);
    }

    #[test]
    fn merge_never_touches_identity_or_purl() {
        let mut ours = nuget(Some("abc=="), DependencyType::Direct, "a/packages.lock.json");
        let before = (ours.identity(), ours.purl().to_owned());
        ours.merge(nuget(Some("xyz=="), DependencyType::Transitive, "b/packages.lock.json"));
        assert_eq!((ours.identity(), ours.purl().to_owned()), before);
        assert_eq!(ours.locations.len(), 2);
    }
}
