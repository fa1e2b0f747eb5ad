//! 관계 리졸버 -- 추출기 호출 범위 안에서 참조를 엣지로 해석
//!
//! 하나의 lockfile은 자체적으로 일관된 해석 스냅샷이므로,
//! 참조는 같은 추출기 호출에서 나온 패키지(형제)에 대해서만 해석합니다.
//! 카탈로그 전체나 다른 매니페스트의 패키지는 절대 후보가 되지 않습니다.
//!
//! # 해석 규칙
//!
//! 1. 같은 호출의 패키지 중 이름이 일치하는 후보를 찾습니다.
//! 2. 후보가 하나면 그대로 사용합니다.
//! 3. 후보가 여럿이면 버전 제약으로 고릅니다 (정확 일치 우선, 그 다음 제약을 만족하는 첫 후보).
//!    제약을 파싱할 수 없거나 만족하는 후보가 없으면 첫 후보를 고르고
//!    [`Diagnostic::AmbiguousDependency`]를 기록합니다.
//! 4. 후보가 없으면 참조를 버리고 [`Diagnostic::UnresolvedDependency`]를 기록합니다.
//!
//! 리졸버는 공유 상태를 사용하지 않으므로 동기화가 필요 없습니다.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::extractor::Extraction;
use crate::identity::IdentityKey;
use crate::location::Location;
use crate::package::Package;
use crate::relationship::{RawReference, Relationship};
use crate::version::VersionConstraint;

/// 해석이 끝난 추출 결과 (어셈블러 제출 단위)
#[derive(Debug, Clone, Default)]
pub struct ResolvedExtraction {
    pub packages: Vec<Package>,
    pub relationships: Vec<Relationship>,
    pub diagnostics: Diagnostics,
}

/// 추출 결과의 참조를 같은 호출의 패키지에 대해 해석합니다.
pub fn resolve(extraction: Extraction, location: &Location) -> ResolvedExtraction {
    let mut diagnostics = Diagnostics::new();
    let relationships = resolve_references(
        &extraction.packages,
        &extraction.references,
        location,
        &mut diagnostics,
    );
    ResolvedExtraction {
        packages: extraction.packages,
        relationships,
        diagnostics,
    }
}

fn resolve_references(
    packages: &[Package],
    references: &[RawReference],
    location: &Location,
    diagnostics: &mut Diagnostics,
) -> Vec<Relationship> {
    let mut by_name: HashMap<&str, Vec<&Package>> = HashMap::new();
    for pkg in packages {
        by_name.entry(pkg.name()).or_default().push(pkg);
    }
    let local: HashSet<IdentityKey> = packages.iter().map(Package::identity).collect();

    let mut relationships = Vec::with_capacity(references.len());
    for reference in references {
        if !local.contains(&reference.dependent) {
            // 이번 호출에서 생성되지 않은 패키지를 가리키는 참조
            diagnostics.push(unresolved(reference, location));
            continue;
        }

        let candidates = by_name
            .get(reference.dependency_name.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let target = match candidates {
            [] => {
                diagnostics.push(unresolved(reference, location));
                continue;
            }
            [only] => *only,
            many => select_candidate(many, reference, location, diagnostics),
        };

        let to = target.identity();
        if to == reference.dependent {
            debug!(path = location.path(), package = %to, "skipping self dependency");
            continue;
        }
        relationships.push(Relationship::depends_on(reference.dependent.clone(), to));
    }
    relationships
}

fn select_candidate<'a>(
    candidates: &[&'a Package],
    reference: &RawReference,
    location: &Location,
    diagnostics: &mut Diagnostics,
) -> &'a Package {
    let first = candidates[0];
    if let Some(constraint) = VersionConstraint::parse(&reference.version_constraint) {
        let chosen = candidates
            .iter()
            .find(|p| constraint.is_pinned_to(p.version()))
            .or_else(|| candidates.iter().find(|p| constraint.matches(p.version())));
        if let Some(&pkg) = chosen {
            return pkg;
        }
    }

    diagnostics.push(Diagnostic::AmbiguousDependency {
        path: location.path().to_owned(),
        dependent: reference.dependent.clone(),
        dependency_name: reference.dependency_name.clone(),
        version_constraint: reference.version_constraint.clone(),
        chosen: first.identity(),
        candidates: candidates.len(),
    });
    first
}

fn unresolved(reference: &RawReference, location: &Location) -> Diagnostic {
    Diagnostic::UnresolvedDependency {
        path: location.path().to_owned(),
        dependent: reference.dependent.clone(),
        dependency_name: reference.dependency_name.clone(),
        version_constraint: reference.version_constraint.clone(),
    }
}
