//! 패키지 식별 키
//!
//! 서로 다른 추출기가 발견한 패키지가 "같은 논리적 패키지"인지 판단하는 키입니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Ecosystem, PackageType};

/// (생태계, 이름, 버전, 타입) 튜플
///
/// 필드 순서대로 정렬되므로 카탈로그 순회 순서가 결정적입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey {
    pub ecosystem: Ecosystem,
    pub name: String,
    pub version: String,
    pub package_type: PackageType,
}

impl IdentityKey {
    pub fn new(
        package_type: PackageType,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            ecosystem: package_type.ecosystem(),
            name: name.into(),
            version: version.into(),
            package_type,
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.version, self.package_type)
    }
}
