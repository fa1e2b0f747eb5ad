//! 비치명적 진단 이벤트
//!
//! 카탈로그 실행 중 발생하는 데이터 문제는 실행을 중단하지 않고 [`Diagnostic`]으로 기록됩니다.
//! 진단은 카탈로그 데이터와 별도로 호출자에게 전달되며,
//! 호출자는 CI 게이트 등에서 경고를 실패로 처리할지 결정할 수 있습니다.
//!
//! [`Diagnostics::push`]는 각 진단을 한 번씩 `tracing`으로 로깅하고 메트릭 카운터를 증가시킵니다.

use std::fmt;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use lockgraph_core::metrics as m;

use crate::identity::IdentityKey;
use crate::relationship::Relationship;

/// 진단 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 정보성 (결과 정확도에 영향 없음)
    Low,
    /// 결과 일부가 누락되거나 임의로 결정됨
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// 진단 종류 (레이블/집계용)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MalformedManifest,
    UnresolvedDependency,
    AmbiguousDependency,
    MetadataConflict,
    DanglingRelationship,
    DuplicateRelationship,
}

impl DiagnosticKind {
    /// 모든 진단 종류
    pub const ALL: [DiagnosticKind; 6] = [
        Self::MalformedManifest,
        Self::UnresolvedDependency,
        Self::AmbiguousDependency,
        Self::MetadataConflict,
        Self::DanglingRelationship,
        Self::DuplicateRelationship,
    ];

    /// 메트릭 레이블/로그에 사용하는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedManifest => "malformed_manifest",
            Self::UnresolvedDependency => "unresolved_dependency",
            Self::AmbiguousDependency => "ambiguous_dependency",
            Self::MetadataConflict => "metadata_conflict",
            Self::DanglingRelationship => "dangling_relationship",
            Self::DuplicateRelationship => "duplicate_relationship",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 구조화된 진단 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// 매니페스트를 파싱할 수 없어 건너뜀
    MalformedManifest { path: String, reason: String },
    /// 같은 매니페스트 안에서 의존 대상을 찾지 못해 엣지를 버림
    UnresolvedDependency {
        path: String,
        dependent: IdentityKey,
        dependency_name: String,
        version_constraint: String,
    },
    /// 후보가 여러 개인데 제약으로 하나를 고를 수 없어 첫 후보를 선택함
    AmbiguousDependency {
        path: String,
        dependent: IdentityKey,
        dependency_name: String,
        version_constraint: String,
        chosen: IdentityKey,
        candidates: usize,
    },
    /// 병합 중 필드 값이 서로 달라 먼저 기록된 값을 유지함
    MetadataConflict {
        identity: IdentityKey,
        field: String,
        kept: String,
        discarded: String,
    },
    /// 검증 단계에서 끝점이 카탈로그에 없는 엣지를 버림
    DanglingRelationship {
        relationship: Relationship,
        missing: IdentityKey,
    },
    /// 검증 단계에서 중복 엣지를 하나로 합침
    DuplicateRelationship {
        relationship: Relationship,
        occurrences: usize,
    },
}

impl Diagnostic {
    /// 진단 종류
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::MalformedManifest { .. } => DiagnosticKind::MalformedManifest,
            Self::UnresolvedDependency { .. } => DiagnosticKind::UnresolvedDependency,
            Self::AmbiguousDependency { .. } => DiagnosticKind::AmbiguousDependency,
            Self::MetadataConflict { .. } => DiagnosticKind::MetadataConflict,
            Self::DanglingRelationship { .. } => DiagnosticKind::DanglingRelationship,
            Self::DuplicateRelationship { .. } => DiagnosticKind::DuplicateRelationship,
        }
    }

    /// 진단 심각도
    pub fn severity(&self) -> Severity {
        match self.kind() {
            DiagnosticKind::AmbiguousDependency | DiagnosticKind::DuplicateRelationship => {
                Severity::Low
            }
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedManifest { path, reason } => {
                write!(f, "malformed manifest {path}: {reason}")
            }
            Self::UnresolvedDependency {
                path,
                dependent,
                dependency_name,
                version_constraint,
            } => write!(
                f,
                "{path}: {dependent} depends on {dependency_name} {version_constraint}, which is not listed in the same manifest"
            ),
            Self::AmbiguousDependency {
                path,
                dependent,
                dependency_name,
                version_constraint,
                chosen,
                candidates,
            } => write!(
                f,
                "{path}: {dependent} -> {dependency_name} {version_constraint} matched {candidates} candidates, chose {chosen}"
            ),
            Self::MetadataConflict {
                identity,
                field,
                kept,
                discarded,
            } => write!(
                f,
                "{identity}: conflicting {field} (kept {kept:?}, discarded {discarded:?})"
            ),
            Self::DanglingRelationship {
                relationship,
                missing,
            } => write!(f, "dropped {relationship}: {missing} is not in the catalog"),
            Self::DuplicateRelationship {
                relationship,
                occurrences,
            } => write!(f, "collapsed {occurrences} copies of {relationship}"),
        }
    }
}

/// 진단 수집기
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 진단을 기록합니다. 로그와 메트릭은 여기서 한 번만 남깁니다.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let kind = diagnostic.kind();
        match diagnostic.severity() {
            Severity::Warning => warn!(kind = kind.as_str(), "{diagnostic}"),
            Severity::Low => debug!(kind = kind.as_str(), "{diagnostic}"),
        }
        counter!(m::CATALOG_DIAGNOSTICS_TOTAL, m::LABEL_DIAGNOSTIC_KIND => kind.as_str())
            .increment(1);
        self.items.push(diagnostic);
    }

    /// 이미 기록된(로깅된) 진단을 옮겨 담습니다.
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// 특정 종류의 진단 수
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind() == kind).count()
    }

    /// 경고 수준 진단만 순회합니다.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackageType;

    fn key(name: &str) -> IdentityKey {
        IdentityKey::new(PackageType::Nuget, name, "1.0.0")
    }

    #[test]
    fn severity_by_kind() {
        let ambiguous = Diagnostic::AmbiguousDependency {
            path: "p".to_owned(),
            dependent: key("a"),
            dependency_name: "b".to_owned(),
            version_constraint: "*".to_owned(),
            chosen: key("b"),
            candidates: 2,
        };
        assert_eq!(ambiguous.severity(), Severity::Low);

        let malformed = Diagnostic::MalformedManifest {
            path: "p".to_owned(),
            reason: "eof".to_owned(),
        };
        assert_eq!(malformed.severity(), Severity::Warning);
    }

    #[test]
    fn collector_counts_by_kind() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::MalformedManifest {
            path: "a".to_owned(),
            reason: "x".to_owned(),
        });
        diags.push(Diagnostic::MalformedManifest {
            path: "b".to_owned(),
            reason: "y".to_owned(),
        });
        diags.push(Diagnostic::DuplicateRelationship {
            relationship: Relationship::depends_on(key("a"), key("b")),
            occurrences: 2,
        });

        assert_eq!(diags.len(), 3);
        assert_eq!(diags.count(DiagnosticKind::MalformedManifest), 2);
        assert_eq!(diags.count(DiagnosticKind::DuplicateRelationship), 1);
        assert_eq!(diags.count(DiagnosticKind::MetadataConflict), 0);
        assert_eq!(diags.warnings().count(), 2);
        assert!(diags.has_warnings());
    }

    #[test]
    fn low_only_has_no_warnings() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::DuplicateRelationship {
            relationship: Relationship::depends_on(key("a"), key("b")),
            occurrences: 3,
        });
        assert!(!diags.has_warnings());
        assert!(!diags.is_empty());
    }

    #[test]
    fn extend_preserves_order() {
        let mut a = Diagnostics::new();
        a.push(Diagnostic::MalformedManifest {
            path: "1".to_owned(),
            reason: String::new(),
        });
        let mut b = Diagnostics::new();
        b.push(Diagnostic::MalformedManifest {
            path: "2".to_owned(),
            reason: String::new(),
        });
        a.extend(b);
        let paths: Vec<String> = a
            .iter()
            .map(|d| match d {
                Diagnostic::MalformedManifest { path, .. } => path.clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(paths, vec!["1", "2"]);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let d = Diagnostic::MetadataConflict {
            identity: key("AutoMapper"),
            field: "content_hash".to_owned(),
            kept: "a".to_owned(),
            discarded: "b".to_owned(),
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "metadata_conflict");
        assert_eq!(json["field"], "content_hash");
    }

    #[test]
    fn kind_names_are_unique() {
        let mut names: Vec<&str> = DiagnosticKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DiagnosticKind::ALL.len());
    }

    #[test]
    fn display_mentions_identity() {
        let d = Diagnostic::UnresolvedDependency {
            path: "packages.lock.json".to_owned(),
            dependent: key("AutoMapper"),
            dependency_name: "Missing.Package".to_owned(),
            version_constraint: "1.0.0".to_owned(),
        };
        let msg = d.to_string();
        assert!(msg.contains("AutoMapper@1.0.0"));
        assert!(msg.contains("Missing.Package"));
    }
}
