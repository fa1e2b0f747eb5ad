//! 카탈로그 검증기
//!
//! `finalize()` 이후 한 번 실행되어 모든 관계 엣지를 검사합니다.
//!
//! - 끝점(from/to) 중 하나라도 카탈로그에 없으면 엣지를 버리고 `DanglingRelationship` 기록
//! - 동일한 엣지(from, to, type)가 여러 번 나오면 첫 번째만 남기고 `DuplicateRelationship` 기록
//!
//! 검증 실패로 실행 전체가 중단되지는 않습니다. 부분 결과도 유용하기 때문입니다.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::relationship::Relationship;

/// 카탈로그를 검증하고 정리된 카탈로그를 반환합니다.
pub fn validate(catalog: Catalog, diagnostics: &mut Diagnostics) -> Catalog {
    let Catalog {
        packages,
        relationships,
    } = catalog;

    let mut occurrences: HashMap<Relationship, usize> = HashMap::new();
    let mut kept = Vec::with_capacity(relationships.len());

    for rel in relationships {
        let missing = [&rel.from, &rel.to]
            .into_iter()
            .find(|key| !packages.contains_key(*key))
            .cloned();
        if let Some(missing) = missing {
            diagnostics.push(Diagnostic::DanglingRelationship {
                relationship: rel,
                missing,
            });
            continue;
        }

        let count = occurrences.entry(rel.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            kept.push(rel);
        }
    }

    for rel in &kept {
        if let Some(&n) = occurrences.get(rel)
            && n > 1
        {
            diagnostics.push(Diagnostic::DuplicateRelationship {
                relationship: rel.clone(),
                occurrences: n,
            });
        }
    }

    Catalog {
        packages,
        relationships: kept,
    }
}

/// 모든 엣지의 끝점이 카탈로그에 있는지 확인합니다.
pub fn is_consistent(catalog: &Catalog) -> bool {
    catalog
        .relationships()
        .iter()
        .all(|r| catalog.contains(&r.from) && catalog.contains(&r.to))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::identity::IdentityKey;
    use crate::location::Location;
    use crate::package::Package;
    use crate::types::PackageType;

    fn key(name: &str) -> IdentityKey {
        IdentityKey::new(PackageType::Nuget, name, "1.0.0")
    }

    fn catalog(names: &[&str], relationships: Vec<Relationship>) -> Catalog {
        let packages: BTreeMap<_, _> = names
            .iter()
            .map(|n| {
                let p = Package::new(PackageType::Nuget, *n, "1.0.0", Location::new("p"));
                (p.identity(), p)
            })
            .collect();
        Catalog {
            packages,
            relationships,
        }
    }

    #[test]
    fn keeps_valid_edges() {
        let rel = Relationship::depends_on(key("a"), key("b"));
        let mut diags = Diagnostics::new();
        let out = validate(catalog(&["a", "b"], vec![rel.clone()]), &mut diags);
        assert_eq!(out.relationships(), &[rel]);
        assert!(diags.is_empty());
        assert!(is_consistent(&out));
    }

    #[test]
    fn drops_dangling_edges() {
        let good = Relationship::depends_on(key("a"), key("b"));
        let bad_to = Relationship::depends_on(key("a"), key("ghost"));
        let bad_from = Relationship::depends_on(key("ghost"), key("b"));
        let input = catalog(&["a", "b"], vec![good.clone(), bad_to, bad_from]);
        assert!(!is_consistent(&input));

        let mut diags = Diagnostics::new();
        let out = validate(input, &mut diags);
        assert_eq!(out.relationships(), &[good]);
        assert_eq!(diags.count(DiagnosticKind::DanglingRelationship), 2);
        assert!(is_consistent(&out));
    }

    #[test]
    fn collapses_duplicates_with_one_diagnostic() {
        let rel = Relationship::depends_on(key("a"), key("b"));
        let mut diags = Diagnostics::new();
        let out = validate(
            catalog(&["a", "b"], vec![rel.clone(), rel.clone(), rel.clone()]),
            &mut diags,
        );
        assert_eq!(out.relationship_count(), 1);
        assert_eq!(diags.count(DiagnosticKind::DuplicateRelationship), 1);
        match diags.iter().next() {
            Some(Diagnostic::DuplicateRelationship { occurrences, .. }) => {
                assert_eq!(*occurrences, 3)
            }
            other => panic!("unexpected diagnostic: {other:?}"),
        }
    }

    #[test]
    fn preserves_first_seen_edge_order() {
        let ab = Relationship::depends_on(key("a"), key("b"));
        let bc = Relationship::depends_on(key("b"), key("c"));
        let mut diags = Diagnostics::new();
        let out = validate(
            catalog(&["a", "b", "c"], vec![bc.clone(), ab.clone(), bc.clone()]),
            &mut diags,
        );
        assert_eq!(out.relationships(), &[bc, ab]);
    }

    #[test]
    fn empty_catalog_is_consistent() {
        let mut diags = Diagnostics::new();
        let out = validate(Catalog::default(), &mut diags);
        assert!(out.is_empty());
        assert!(is_consistent(&out));
    }
}
