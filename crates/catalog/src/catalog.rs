//! 카탈로그 -- 병합된 패키지와 관계 그래프
//!
//! [`Catalog`]는 어셈블러가 완료된 뒤 동결되어 하위 소비자(인코더 등)에게 전달되는 순수 데이터입니다.
//! 외부에서는 읽기 전용 접근자만 제공됩니다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::IdentityKey;
use crate::package::Package;
use crate::relationship::Relationship;

/// 동결된 카탈로그
///
/// 패키지는 식별 키 순서로 순회됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "CatalogRepr", from = "CatalogRepr")]
pub struct Catalog {
    pub(crate) packages: BTreeMap<IdentityKey, Package>,
    pub(crate) relationships: Vec<Relationship>,
}

impl Catalog {
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// 식별 키로 패키지를 조회합니다.
    pub fn package(&self, key: &IdentityKey) -> Option<&Package> {
        self.packages.get(key)
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.packages.contains_key(key)
    }

    /// 식별 키 순서로 패키지를 순회합니다.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// 이름이 같은 모든 패키지를 반환합니다 (버전/타입 무관).
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Package> + 'a {
        self.packages.values().filter(move |p| p.name() == name)
    }

    pub fn find_by_purl(&self, purl: &str) -> Option<&Package> {
        self.packages.values().find(|p| p.purl() == purl)
    }

    /// 패키지가 의존하는 패키지의 식별 키 목록
    pub fn dependencies_of<'a>(
        &'a self,
        key: &'a IdentityKey,
    ) -> impl Iterator<Item = &'a IdentityKey> + 'a {
        self.relationships
            .iter()
            .filter(move |r| &r.from == key)
            .map(|r| &r.to)
    }
}

#[derive(Serialize, Deserialize)]
struct CatalogRepr {
    packages: Vec<Package>,
    relationships: Vec<Relationship>,
}

impl From<Catalog> for CatalogRepr {
    fn from(catalog: Catalog) -> Self {
        Self {
            packages: catalog.packages.into_values().collect(),
            relationships: catalog.relationships,
        }
    }
}

impl From<CatalogRepr> for Catalog {
    fn from(repr: CatalogRepr) -> Self {
        let mut packages = BTreeMap::new();
        for pkg in repr.packages {
            packages.entry(pkg.identity()).or_insert(pkg);
        }
        Self {
            packages,
            relationships: repr.relationships,
        }
    }
}
