//! 카탈로거 오케스트레이터 -- 전체 카탈로그 실행 흐름 관리
//!
//! [`Cataloger`]는 매니페스트마다 작업 하나를 `JoinSet`에 띄우고,
//! `Semaphore`로 동시 실행 수를 `workers`개로 제한합니다.
//! 추출과 참조 해석은 CPU 작업이므로 `spawn_blocking`에서 실행합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! scan_dirs --> discover_manifests --> ManifestSource*
//!                                          |
//!                       JoinSet + Semaphore(workers)
//!                                          |
//!                 Extractor::extract --> resolver::resolve     (작업마다, 공유 상태 없음)
//!                                          |
//!                              CatalogAssembler::submit        (Mutex 안에서 병합)
//!                                          |
//!                   finalize --> validator::validate --> CatalogOutcome
//! ```
//!
//! # 취소
//!
//! 호출자의 `CancellationToken`이 취소되거나 `timeout_secs`가 지나면,
//! 아직 시작하지 않은 작업은 추출 전에 중단됩니다.
//! 이미 제출된 결과는 유지되며 [`Completeness::Partial`]로 표시됩니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lockgraph_core::metrics as m;

use crate::assembler::{CatalogAssembler, Submission};
use crate::catalog::Catalog;
use crate::config::CatalogConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::CatalogError;
use crate::extractor::{Extractor, ExtractorRegistry};
use crate::resolver;
use crate::source::{self, Discovery, DiscoveryLimits, ManifestSource};
use crate::validator;

/// 실행 결과의 완결성
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    /// 모든 매니페스트가 처리됨
    Complete,
    /// 취소/시간 초과로 일부 매니페스트가 처리되지 않음
    Partial {
        /// 처리하지 못한 매니페스트 수
        skipped: usize,
    },
}

impl Completeness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partial { .. } => "partial",
        }
    }
}

/// 실행 통계
#[derive(Debug, Clone, Default)]
pub struct CatalogStats {
    /// 카탈로거에 전달된 매니페스트 수
    pub manifests: usize,
    /// 추출에 성공한 매니페스트 수
    pub processed: usize,
    /// 파싱 실패로 건너뛴 매니페스트 수
    pub malformed: usize,
    /// 맞는 추출기가 없는 매니페스트 수
    pub unsupported: usize,
    /// 취소되어 처리하지 못한 매니페스트 수
    pub cancelled: usize,
    /// 소요 시간
    pub elapsed: Duration,
}

/// 카탈로그 실행 결과
#[derive(Debug, Clone)]
pub struct CatalogOutcome {
    /// 검증된 동결 카탈로그
    pub catalog: Catalog,
    /// 비치명적 진단
    pub diagnostics: Diagnostics,
    pub completeness: Completeness,
    pub stats: CatalogStats,
}

impl CatalogOutcome {
    pub fn is_complete(&self) -> bool {
        self.completeness == Completeness::Complete
    }
}

/// 작업 하나의 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Processed,
    Malformed,
    Cancelled,
}

/// 카탈로거
///
/// 한 인스턴스로 여러 번 실행할 수 있으며, 실행마다 새 어셈블러를 사용합니다.
pub struct Cataloger {
    config: CatalogConfig,
    registry: Arc<ExtractorRegistry>,
}

impl Cataloger {
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// 주어진 `(내용, 위치)` 쌍을 카탈로그로 만듭니다.
    ///
    /// # Errors
    ///
    /// 계약 위반이나 워커 실패 같은 치명적 에러만 반환합니다.
    /// 파싱 실패 등 데이터 문제는 진단으로 기록됩니다.
    pub async fn catalog_sources(
        &self,
        sources: Vec<ManifestSource>,
        cancel: CancellationToken,
    ) -> Result<CatalogOutcome, CatalogError> {
        let started = Instant::now();
        let token = cancel.child_token();
        let timer = self.config.timeout().map(|t| spawn_timeout(t, token.clone()));

        let assembler = Arc::new(CatalogAssembler::new());
        let semaphore = Arc::new(Semaphore::new(self.config.effective_workers()));
        let mut tasks: JoinSet<Result<TaskOutcome, CatalogError>> = JoinSet::new();
        let mut stats = CatalogStats {
            manifests: sources.len(),
            ..Default::default()
        };

        for source in sources {
            let Some(extractor) = self.registry.find(Path::new(source.location.path())) else {
                debug!(path = source.location.path(), "no extractor found, skipping");
                stats.unsupported += 1;
                continue;
            };

            tasks.spawn(run_task(
                extractor,
                source,
                Arc::clone(&semaphore),
                Arc::clone(&assembler),
                token.clone(),
                self.config.max_packages,
            ));
        }

        let mut fatal: Option<CatalogError> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(TaskOutcome::Processed)) => stats.processed += 1,
                Ok(Ok(TaskOutcome::Malformed)) => stats.malformed += 1,
                Ok(Ok(TaskOutcome::Cancelled)) => stats.cancelled += 1,
                Ok(Err(e)) => {
                    warn!(error = %e, "cataloging task failed, aborting run");
                    token.cancel();
                    fatal.get_or_insert(e);
                }
                Err(e) => {
                    warn!(error = %e, "cataloging task panicked, aborting run");
                    token.cancel();
                    fatal.get_or_insert(CatalogError::Worker(e.to_string()));
                }
            }
        }

        if let Some(timer) = timer {
            timer.abort();
        }
        if let Some(e) = fatal {
            return Err(e);
        }

        let (catalog, mut diagnostics) = assembler.finalize().await?;
        let catalog = validator::validate(catalog, &mut diagnostics);

        let completeness = if stats.cancelled > 0 {
            Completeness::Partial {
                skipped: stats.cancelled,
            }
        } else {
            Completeness::Complete
        };
        stats.elapsed = started.elapsed();

        counter!(m::CATALOG_RUNS_TOTAL, m::LABEL_RESULT => completeness.as_str()).increment(1);
        histogram!(m::CATALOG_RUN_DURATION_SECONDS).record(stats.elapsed.as_secs_f64());
        info!(
            manifests = stats.manifests,
            processed = stats.processed,
            malformed = stats.malformed,
            cancelled = stats.cancelled,
            packages = catalog.package_count(),
            relationships = catalog.relationship_count(),
            diagnostics = diagnostics.len(),
            result = completeness.as_str(),
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "cataloging run completed"
        );

        Ok(CatalogOutcome {
            catalog,
            diagnostics,
            completeness,
            stats,
        })
    }

    /// 경로(디렉토리 또는 파일)를 탐색한 뒤 카탈로그로 만듭니다.
    ///
    /// # Errors
    ///
    /// 후보 매니페스트가 있었지만 하나도 읽지 못하면 [`CatalogError::InputExhausted`].
    pub async fn catalog_paths(
        &self,
        paths: &[PathBuf],
        cancel: CancellationToken,
    ) -> Result<CatalogOutcome, CatalogError> {
        let mut discovery = Discovery::default();
        // 탐색은 취소와 무관하게 끝까지 수행해 건너뛴 매니페스트 수를 정확히 보고
        for path in paths {
            let root = path.clone();
            let registry = Arc::clone(&self.registry);
            let limits = DiscoveryLimits::from_config(&self.config);
            let found = tokio::task::spawn_blocking(move || {
                source::discover_manifests(&root, &registry, &limits)
            })
            .await
            .map_err(|e| CatalogError::Worker(format!("spawn_blocking failed: {e}")))?;
            discovery.merge(found);
        }

        if discovery.is_exhausted() {
            return Err(CatalogError::InputExhausted {
                attempted: discovery.candidates,
            });
        }

        let Discovery {
            sources, skipped, ..
        } = discovery;
        let mut outcome = self.catalog_sources(sources, cancel).await?;

        // 읽지 못한 후보도 호출자에게 보고
        let mut unread = Diagnostics::new();
        for file in skipped {
            unread.push(Diagnostic::MalformedManifest {
                path: file.path,
                reason: file.reason,
            });
        }
        outcome.diagnostics.extend(unread);
        Ok(outcome)
    }

    /// 설정의 `scan_dirs`를 카탈로그로 만듭니다.
    pub async fn catalog_dirs(&self, cancel: CancellationToken) -> Result<CatalogOutcome, CatalogError> {
        let dirs: Vec<PathBuf> = self.config.scan_dirs.iter().map(PathBuf::from).collect();
        self.catalog_paths(&dirs, cancel).await
    }
}

/// 매니페스트 하나를 처리하는 작업
async fn run_task(
    extractor: Arc<dyn Extractor>,
    source: ManifestSource,
    semaphore: Arc<Semaphore>,
    assembler: Arc<CatalogAssembler>,
    token: CancellationToken,
    max_packages: usize,
) -> Result<TaskOutcome, CatalogError> {
    let _permit = tokio::select! {
        permit = semaphore.acquire_owned() => permit
            .map_err(|e| CatalogError::Worker(format!("semaphore closed: {e}")))?,
        () = token.cancelled() => return Ok(TaskOutcome::Cancelled),
    };
    if token.is_cancelled() {
        return Ok(TaskOutcome::Cancelled);
    }

    let path = source.location.path().to_owned();
    let name = extractor.name();
    let blocking = {
        let extractor = Arc::clone(&extractor);
        tokio::task::spawn_blocking(move || extract_one(extractor.as_ref(), &source, max_packages))
    };

    let (submission, outcome) = match blocking.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => {
            // 추출기 패닉은 해당 매니페스트만 실패로 처리
            let mut diagnostics = Diagnostics::new();
            diagnostics.push(Diagnostic::MalformedManifest {
                path: path.clone(),
                reason: format!("extractor {name} panicked"),
            });
            (Submission::diagnostics_only(diagnostics), TaskOutcome::Malformed)
        }
        Err(e) => return Err(CatalogError::Worker(format!("{path}: {e}"))),
    };

    counter!(m::CATALOG_MANIFESTS_PROCESSED_TOTAL, m::LABEL_EXTRACTOR => name).increment(1);
    if outcome == TaskOutcome::Malformed {
        counter!(m::CATALOG_MANIFESTS_MALFORMED_TOTAL, m::LABEL_EXTRACTOR => name).increment(1);
    }
    debug!(
        path = %path,
        extractor = name,
        packages = submission.packages.len(),
        relationships = submission.relationships.len(),
        "manifest extracted"
    );

    assembler.submit(submission).await?;
    Ok(outcome)
}

/// 추출 + 범위 내 참조 해석 (동기, 공유 상태 없음)
fn extract_one(
    extractor: &dyn Extractor,
    source: &ManifestSource,
    max_packages: usize,
) -> (Submission, TaskOutcome) {
    let reason = match extractor.extract(&source.content, &source.location) {
        Ok(extraction) if extraction.package_count() > max_packages => format!(
            "too many packages: {} (max: {max_packages})",
            extraction.package_count()
        ),
        Ok(extraction) => {
            let resolved = resolver::resolve(extraction, &source.location);
            return (Submission::from(resolved), TaskOutcome::Processed);
        }
        Err(CatalogError::MalformedManifest { reason, .. }) => reason,
        Err(other) => other.to_string(),
    };

    let mut diagnostics = Diagnostics::new();
    diagnostics.push(Diagnostic::MalformedManifest {
        path: source.location.path().to_owned(),
        reason,
    });
    (Submission::diagnostics_only(diagnostics), TaskOutcome::Malformed)
}

fn spawn_timeout(timeout: Duration, token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(timeout) => {
                warn!(timeout_secs = timeout.as_secs(), "cataloging run timed out, cancelling");
                token.cancel();
            }
            () = token.cancelled() => {}
        }
    })
}

/// [`Cataloger`] 빌더
pub struct CatalogerBuilder {
    config: CatalogConfig,
    registry: Option<ExtractorRegistry>,
}

impl CatalogerBuilder {
    pub fn new() -> Self {
        Self {
            config: CatalogConfig::default(),
            registry: None,
        }
    }

    /// 카탈로거 설정을 지정합니다.
    pub fn config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    /// 추출기 레지스트리를 지정합니다.
    ///
    /// 지정하지 않으면 [`ExtractorRegistry::with_defaults`]를 사용합니다.
    pub fn registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 설정을 검증하고 카탈로거를 빌드합니다.
    pub fn build(self) -> Result<Cataloger, CatalogError> {
        self.config.validate()?;
        Ok(Cataloger {
            config: self.config,
            registry: Arc::new(self.registry.unwrap_or_else(ExtractorRegistry::with_defaults)),
        })
    }
}

impl Default for CatalogerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfigBuilder;
    use crate::diagnostics::DiagnosticKind;
    use crate::extractor::Extraction;
    use crate::location::Location;
    use crate::types::PackageType;

    const CARGO_LOCK: &str = r#"
version = 3

[[package]]
name = "app"
version = "0.1.0"
dependencies = ["serde"]

[[package]]
name = "serde"
version = "1.0.204"
"#;

    fn source(path: &str, content: &str) -> ManifestSource {
        ManifestSource::new(Location::new(path), content)
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = CatalogerBuilder::new()
            .config(CatalogConfig {
                max_file_size: 0,
                ..Default::default()
            })
            .build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn catalog_single_source() {
        let cataloger = CatalogerBuilder::new().build().unwrap();
        let outcome = cataloger
            .catalog_sources(vec![source("Cargo.lock", CARGO_LOCK)], CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.catalog.package_count(), 2);
        assert_eq!(outcome.catalog.relationship_count(), 1);
        assert_eq!(outcome.stats.processed, 1);
        assert!(outcome.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn malformed_source_is_diagnostic_not_error() {
        let cataloger = CatalogerBuilder::new().build().unwrap();
        let outcome = cataloger
            .catalog_sources(
                vec![
                    source("a/Cargo.lock", CARGO_LOCK),
                    source("b/Cargo.lock", "[[package]\nbroken"),
                ],
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.catalog.package_count(), 2);
        assert_eq!(outcome.stats.malformed, 1);
        assert_eq!(outcome.diagnostics.count(DiagnosticKind::MalformedManifest), 1);
    }

    #[tokio::test]
    async fn unsupported_source_is_ignored() {
        let cataloger = CatalogerBuilder::new().build().unwrap();
        let outcome = cataloger
            .catalog_sources(vec![source("README.md", "# hi")], CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.stats.unsupported, 1);
        assert!(outcome.catalog.is_empty());
    }

    #[tokio::test]
    async fn too_many_packages_is_malformed() {
        let config = CatalogConfigBuilder::new().max_packages(1).build().unwrap();
        let cataloger = CatalogerBuilder::new().config(config).build().unwrap();
        let outcome = cataloger
            .catalog_sources(vec![source("Cargo.lock", CARGO_LOCK)], CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.catalog.is_empty());
        assert_eq!(outcome.diagnostics.count(DiagnosticKind::MalformedManifest), 1);
    }

    #[tokio::test]
    async fn cancelled_before_start_is_partial() {
        let cataloger = CatalogerBuilder::new().build().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = cataloger
            .catalog_sources(
                vec![source("a/Cargo.lock", CARGO_LOCK), source("b/Cargo.lock", CARGO_LOCK)],
                cancel,
            )
            .await
            .unwrap();

        assert_eq!(outcome.completeness, Completeness::Partial { skipped: 2 });
        assert!(outcome.catalog.is_empty());
    }

    #[tokio::test]
    async fn empty_input_is_complete_and_empty() {
        let cataloger = CatalogerBuilder::new().build().unwrap();
        let outcome = cataloger
            .catalog_sources(Vec::new(), CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.is_complete());
        assert!(outcome.catalog.is_empty());
    }

    struct PanickingExtractor;

    impl Extractor for PanickingExtractor {
        fn name(&self) -> &'static str {
            "panicking"
        }
        fn package_type(&self) -> PackageType {
            PackageType::Cargo
        }
        fn file_names(&self) -> &'static [&'static str] {
            &["boom.lock"]
        }
        fn extract(&self, _: &str, _: &Location) -> Result<Extraction, CatalogError> {
            panic!("extractor bug");
        }
    }

    #[tokio::test]
    async fn panicking_extractor_becomes_malformed() {
        let mut registry = ExtractorRegistry::with_defaults();
        registry.register(Box::new(PanickingExtractor));
        let cataloger = CatalogerBuilder::new().registry(registry).build().unwrap();
        let outcome = cataloger
            .catalog_sources(
                vec![source("boom.lock", ""), source("Cargo.lock", CARGO_LOCK)],
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.catalog.package_count(), 2);
        assert_eq!(outcome.stats.malformed, 1);
    }

    #[tokio::test]
    async fn catalog_dirs_missing_dir_is_empty() {
        let config = CatalogConfigBuilder::new()
            .scan_dirs(vec!["/nonexistent/path/for/test".to_owned()])
            .build()
            .unwrap();
        let cataloger = CatalogerBuilder::new().config(config).build().unwrap();
        let outcome = cataloger.catalog_dirs(CancellationToken::new()).await.unwrap();
        assert!(outcome.catalog.is_empty());
        assert!(outcome.is_complete());
    }

    #[tokio::test]
    async fn unreadable_candidates_exhaust_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.lock"), CARGO_LOCK).unwrap();
        let config = CatalogConfigBuilder::new().max_file_size(8).build().unwrap();
        let cataloger = CatalogerBuilder::new().config(config).build().unwrap();

        let err = cataloger
            .catalog_paths(&[dir.path().to_path_buf()], CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InputExhausted { attempted: 1 }));
    }
}
