//! 패키지 간 관계 (의존성 그래프 엣지)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::IdentityKey;

/// 관계 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    /// `from` 패키지가 `to` 패키지를 필요로 함
    DependsOn,
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DependsOn => write!(f, "depends-on"),
        }
    }
}

/// 방향성 있는 관계 엣지
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relationship {
    pub from: IdentityKey,
    pub to: IdentityKey,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
}

impl Relationship {
    /// `DependsOn` 관계를 생성합니다.
    pub fn depends_on(from: IdentityKey, to: IdentityKey) -> Self {
        Self {
            from,
            to,
            kind: RelationshipType::DependsOn,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.from, self.kind, self.to)
    }
}

/// 아직 식별 키로 해석되지 않은 의존성 참조
///
/// 추출기 한 번의 호출 범위 안에서만 의미가 있으며,
/// 리졸버가 같은 호출에서 나온 패키지와 매칭하여 [`Relationship`]으로 바꿉니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawReference {
    /// 의존하는 쪽 (이번 호출에서 생성된 패키지)
    pub dependent: IdentityKey,
    /// 의존 대상 이름
    pub dependency_name: String,
    /// 버전 제약 문자열 (예: `6.0.0`, `[1.0,2.0)`, `^1.2`)
    pub version_constraint: String,
}

impl RawReference {
    pub fn new(
        dependent: IdentityKey,
        dependency_name: impl Into<String>,
        version_constraint: impl Into<String>,
    ) -> Self {
        Self {
            dependent,
            dependency_name: dependency_name.into(),
            version_constraint: version_constraint.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackageType;

    #[test]
    fn display_edge() {
        let rel = Relationship::depends_on(
            IdentityKey::new(PackageType::Nuget, "AutoMapper", "13.0.1"),
            IdentityKey::new(PackageType::Nuget, "Microsoft.Extensions.Options", "6.0.0"),
        );
        assert_eq!(
            rel.to_string(),
            "AutoMapper@13.0.1 (nuget) -[depends-on]-> Microsoft.Extensions.Options@6.0.0 (nuget)"
        );
    }

    #[test]
    fn identical_edges_are_equal() {
        let a = IdentityKey::new(PackageType::Cargo, "a", "1.0.0");
        let b = IdentityKey::new(PackageType::Cargo, "b", "1.0.0");
        assert_eq!(
            Relationship::depends_on(a.clone(), b.clone()),
            Relationship::depends_on(a.clone(), b.clone())
        );
        assert_ne!(
            Relationship::depends_on(a.clone(), b.clone()),
            Relationship::depends_on(b, a)
        );
    }

    #[test]
    fn serializes_type_field() {
        let rel = Relationship::depends_on(
            IdentityKey::new(PackageType::Npm, "a", "1.0.0"),
            IdentityKey::new(PackageType::Npm, "b", "2.0.0"),
        );
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["type"], "depends-on");
        assert_eq!(json["to"]["name"], "b");
    }
}
