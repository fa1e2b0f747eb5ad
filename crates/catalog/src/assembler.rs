//! 카탈로그 어셈블러 -- 동시 제출 병합 지점
//!
//! 여러 추출기 작업이 동시에 [`CatalogAssembler::submit`]을 호출합니다.
//! 병합은 하나의 `tokio::sync::Mutex` 안에서만 일어나므로
//! 같은 식별 키에 대한 두 제출이 서로의 갱신을 잃어버리지 않습니다.
//!
//! # 생명주기
//!
//! ```text
//! new() --> submit()* --> finalize() --> (Catalog, Diagnostics)
//!                              |
//!                              +--> submit()   => Err(SubmitAfterFinalize)
//!                              +--> finalize() => Err(AlreadyFinalized)
//! ```
//!
//! 한 번의 제출이 원자적 단위입니다. 여러 제출에 걸친 트랜잭션이나 롤백은 없습니다.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use metrics::counter;
use tokio::sync::Mutex;
use tracing::debug;

use lockgraph_core::metrics as m;

use crate::catalog::Catalog;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::CatalogError;
use crate::identity::IdentityKey;
use crate::package::Package;
use crate::relationship::Relationship;
use crate::resolver::ResolvedExtraction;

/// 한 추출기 호출의 제출 단위
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub packages: Vec<Package>,
    pub relationships: Vec<Relationship>,
    /// 제출 전에 이미 기록된 진단 (리졸버, 파싱 실패 등)
    pub diagnostics: Diagnostics,
}

impl Submission {
    pub fn new(packages: Vec<Package>, relationships: Vec<Relationship>) -> Self {
        Self {
            packages,
            relationships,
            diagnostics: Diagnostics::new(),
        }
    }

    /// 패키지 없이 진단만 담은 제출 (파싱 실패한 매니페스트용)
    pub fn diagnostics_only(diagnostics: Diagnostics) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }
}

impl From<ResolvedExtraction> for Submission {
    fn from(resolved: ResolvedExtraction) -> Self {
        Self {
            packages: resolved.packages,
            relationships: resolved.relationships,
            diagnostics: resolved.diagnostics,
        }
    }
}

/// 뮤텍스 안의 병합 상태
#[derive(Debug, Default)]
struct AssemblyState {
    packages: BTreeMap<IdentityKey, Package>,
    relationships: Vec<Relationship>,
    diagnostics: Diagnostics,
    submissions: usize,
    finalized: bool,
}

impl AssemblyState {
    fn merge(&mut self, submission: Submission) {
        self.submissions += 1;
        self.diagnostics.extend(submission.diagnostics);

        let submitted = submission.packages.len();
        let mut merged = 0usize;
        for package in submission.packages {
            match self.packages.entry(package.identity()) {
                Entry::Vacant(slot) => {
                    slot.insert(package);
                }
                Entry::Occupied(mut slot) => {
                    merged += 1;
                    let identity = slot.key().clone();
                    for conflict in slot.get_mut().merge(package) {
                        self.diagnostics.push(Diagnostic::MetadataConflict {
                            identity: identity.clone(),
                            field: conflict.field,
                            kept: conflict.kept,
                            discarded: conflict.discarded,
                        });
                    }
                }
            }
        }

        // 중복 엣지는 검증 단계에서 합침
        let edges = submission.relationships.len();
        self.relationships.extend(submission.relationships);

        counter!(m::CATALOG_PACKAGES_SUBMITTED_TOTAL).increment(submitted as u64);
        counter!(m::CATALOG_PACKAGES_MERGED_TOTAL).increment(merged as u64);
        counter!(m::CATALOG_RELATIONSHIPS_TOTAL).increment(edges as u64);
        debug!(
            packages = submitted,
            merged,
            relationships = edges,
            total_packages = self.packages.len(),
            "submission merged"
        );
    }
}

/// 카탈로그 어셈블러
///
/// `Arc`로 감싸 여러 작업에서 공유합니다. 카탈로그 변경은 오직 `submit`을 통해서만 일어납니다.
#[derive(Debug, Default)]
pub struct CatalogAssembler {
    state: Mutex<AssemblyState>,
}

impl CatalogAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 한 추출기 호출의 결과를 원자적으로 병합합니다.
    ///
    /// # Errors
    ///
    /// `finalize()` 이후 호출되면 [`CatalogError::SubmitAfterFinalize`].
    pub async fn submit(&self, submission: Submission) -> Result<(), CatalogError> {
        let mut state = self.state.lock().await;
        if state.finalized {
            return Err(CatalogError::SubmitAfterFinalize);
        }
        state.merge(submission);
        Ok(())
    }

    /// 카탈로그를 동결하여 반환합니다.
    ///
    /// 반환된 카탈로그는 아직 검증 전입니다. [`crate::validator::validate`]를 거쳐야 합니다.
    ///
    /// # Errors
    ///
    /// 두 번째 호출부터 [`CatalogError::AlreadyFinalized`].
    pub async fn finalize(&self) -> Result<(Catalog, Diagnostics), CatalogError> {
        let mut state = self.state.lock().await;
        if state.finalized {
            return Err(CatalogError::AlreadyFinalized);
        }
        state.finalized = true;
        let catalog = Catalog {
            packages: std::mem::take(&mut state.packages),
            relationships: std::mem::take(&mut state.relationships),
        };
        let diagnostics = std::mem::take(&mut state.diagnostics);
        debug!(
            submissions = state.submissions,
            packages = catalog.package_count(),
            relationships = catalog.relationship_count(),
            "assembler finalized"
        );
        Ok((catalog, diagnostics))
    }

    pub async fn is_finalized(&self) -> bool {
        self.state.lock().await.finalized
    }

    /// 지금까지 받은 제출 수
    pub async fn submission_count(&self) -> usize {
        self.state.lock().await.submissions
    }
}
