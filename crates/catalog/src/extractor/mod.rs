//! 매니페스트 추출기 -- packages.lock.json, package-lock.json, Cargo.lock
//!
//! [`Extractor`] trait은 각 매니페스트 형식의 추출기가 구현해야 하는 인터페이스입니다.
//! 추출기는 순수 함수입니다: 파일 내용과 위치만으로 결과가 결정되며,
//! 파일 시스템이나 이미 조립된 카탈로그 상태에 접근하지 않습니다.
//!
//! [`ExtractorRegistry`]는 파일 이름으로 추출기를 찾는 매핑이며, 시작 시 한 번 구성됩니다.
//!
//! # 지원 형식
//!
//! - `packages.lock.json` (NuGet) -- [`NugetLockExtractor`]
//! - `package-lock.json` (npm v2/v3) -- [`NpmLockExtractor`]
//! - `Cargo.lock` (TOML) -- [`CargoLockExtractor`]
//!
//! # 확장
//!
//! 새로운 형식을 지원하려면 `Extractor` trait을 구현하고
//! [`ExtractorRegistry::register`]로 등록합니다.

pub mod cargo;
pub mod npm;
pub mod nuget;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use crate::error::CatalogError;
use crate::identity::IdentityKey;
use crate::location::Location;
use crate::package::Package;
use crate::relationship::RawReference;
use crate::types::PackageType;

pub use cargo::CargoLockExtractor;
pub use npm::NpmLockExtractor;
pub use nuget::NugetLockExtractor;

/// 추출기 한 번의 호출 결과
///
/// `references`는 이 호출 범위 안에서만 의미가 있으며, 리졸버가 엣지로 해석합니다.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// 발견된 패키지 (입력 순서, 호출 내 식별 키 중복 없음)
    pub packages: Vec<Package>,
    /// 해석되지 않은 의존성 참조 (완전히 같은 참조는 한 번만)
    pub references: Vec<RawReference>,
    seen: HashSet<IdentityKey>,
    seen_references: HashSet<RawReference>,
}

impl Extraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// 패키지를 추가합니다.
    ///
    /// 이 호출에서 이미 같은 식별 키가 나왔다면 버리고 `false`를 반환합니다.
    /// 반환값과 무관하게 추출기는 항목마다 선언된 의존성 참조를 모두 추가합니다.
    pub fn add_package(&mut self, package: Package) -> bool {
        if !self.seen.insert(package.identity()) {
            return false;
        }
        self.packages.push(package);
        true
    }

    /// 의존성 참조를 추가합니다. 이미 추가된 것과 완전히 같으면 무시합니다.
    pub fn add_reference(&mut self, reference: RawReference) {
        if self.seen_references.insert(reference.clone()) {
            self.references.push(reference);
        }
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// 매니페스트 추출기 trait
pub trait Extractor: Send + Sync {
    /// 추출기 이름 (로그/메트릭 레이블용, 예: "nuget-packages-lock")
    fn name(&self) -> &'static str;

    /// 이 추출기가 생성하는 패키지 타입
    fn package_type(&self) -> PackageType;

    /// 이 추출기가 처리하는 파일 이름 목록
    fn file_names(&self) -> &'static [&'static str];

    /// 주어진 경로의 파일을 이 추출기가 처리할 수 있는지 확인합니다.
    fn can_extract(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.file_names().contains(&name))
    }

    /// 매니페스트 내용에서 패키지와 의존성 참조를 추출합니다.
    ///
    /// 파싱할 수 없는 입력은 패닉 대신 [`CatalogError::MalformedManifest`]를 반환해야 합니다.
    fn extract(&self, content: &str, location: &Location) -> Result<Extraction, CatalogError>;
}

/// 파일 이름 → 추출기 매핑
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn Extractor>>,
    by_filename: HashMap<&'static str, usize>,
}

impl ExtractorRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기본 추출기가 모두 등록된 레지스트리를 생성합니다.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(NugetLockExtractor));
        registry.register(Box::new(NpmLockExtractor));
        registry.register(Box::new(CargoLockExtractor));
        registry
    }

    /// 추출기를 등록합니다. 같은 파일 이름을 가진 기존 등록은 덮어씁니다.
    pub fn register(&mut self, extractor: Box<dyn Extractor>) {
        let index = self.extractors.len();
        for &name in extractor.file_names() {
            self.by_filename.insert(name, index);
        }
        self.extractors.push(Arc::from(extractor));
    }

    /// 경로에 맞는 추출기를 찾습니다.
    pub fn find(&self, path: &Path) -> Option<Arc<dyn Extractor>> {
        let file_name = path.file_name().and_then(|n| n.to_str())?;
        self.by_filename
            .get(file_name)
            .map(|&i| Arc::clone(&self.extractors[i]))
    }

    /// 경로가 알려진 매니페스트인지 확인합니다.
    pub fn is_manifest(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.by_filename.contains_key(name))
    }

    /// 알려진 매니페스트 파일 이름 목록 (정렬됨)
    pub fn known_filenames(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.by_filename.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// 등록된 추출기 수
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("known_filenames", &self.known_filenames())
            .finish()
    }
}
