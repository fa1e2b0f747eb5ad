//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 카탈로그 크레이트는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않은 경우 매크로 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `lockgraph_catalog_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(lockgraph_core::metrics::CATALOG_MANIFESTS_PROCESSED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 추출기 레이블 키 (nuget-packages-lock, npm-package-lock, cargo-lock)
pub const LABEL_EXTRACTOR: &str = "extractor";

/// 진단 종류 레이블 키 (malformed_manifest, unresolved_dependency, ...)
pub const LABEL_DIAGNOSTIC_KIND: &str = "kind";

/// 결과 레이블 키 (complete, partial)
pub const LABEL_RESULT: &str = "result";

// ─── Catalog 메트릭 ────────────────────────────────────────────────

/// 처리된 매니페스트 수 (counter, label: extractor)
pub const CATALOG_MANIFESTS_PROCESSED_TOTAL: &str = "lockgraph_catalog_manifests_processed_total";

/// 파싱 실패한 매니페스트 수 (counter, label: extractor)
pub const CATALOG_MANIFESTS_MALFORMED_TOTAL: &str = "lockgraph_catalog_manifests_malformed_total";

/// 어셈블러에 제출된 패키지 수 (counter)
pub const CATALOG_PACKAGES_SUBMITTED_TOTAL: &str = "lockgraph_catalog_packages_submitted_total";

/// 병합된(중복 발견된) 패키지 수 (counter)
pub const CATALOG_PACKAGES_MERGED_TOTAL: &str = "lockgraph_catalog_packages_merged_total";

/// 생성된 관계 수 (counter)
pub const CATALOG_RELATIONSHIPS_TOTAL: &str = "lockgraph_catalog_relationships_total";

/// 기록된 진단 수 (counter, label: kind)
pub const CATALOG_DIAGNOSTICS_TOTAL: &str = "lockgraph_catalog_diagnostics_total";

/// 카탈로그 실행 수 (counter, label: result)
pub const CATALOG_RUNS_TOTAL: &str = "lockgraph_catalog_runs_total";

/// 카탈로그 실행 소요 시간 (histogram, 초)
pub const CATALOG_RUN_DURATION_SECONDS: &str = "lockgraph_catalog_run_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        CATALOG_MANIFESTS_PROCESSED_TOTAL,
        "Total number of manifests handed to an extractor"
    );
    describe_counter!(
        CATALOG_MANIFESTS_MALFORMED_TOTAL,
        "Total number of manifests skipped because they could not be parsed"
    );
    describe_counter!(
        CATALOG_PACKAGES_SUBMITTED_TOTAL,
        "Total number of packages submitted to the catalog assembler"
    );
    describe_counter!(
        CATALOG_PACKAGES_MERGED_TOTAL,
        "Total number of submitted packages merged into an existing identity"
    );
    describe_counter!(
        CATALOG_RELATIONSHIPS_TOTAL,
        "Total number of dependency relationships created by the resolver"
    );
    describe_counter!(
        CATALOG_DIAGNOSTICS_TOTAL,
        "Total number of non-fatal diagnostics recorded, by kind"
    );
    describe_counter!(
        CATALOG_RUNS_TOTAL,
        "Total number of cataloging runs, by completeness"
    );
    describe_histogram!(
        CATALOG_RUN_DURATION_SECONDS,
        "Time to complete a cataloging run in seconds"
    );
}
