//! 카탈로거 설정
//!
//! [`CatalogConfig`]는 core의 [`CatalogSection`](lockgraph_core::config::CatalogSection)에서
//! 파생되며, 문자열 값을 타입으로 바꾸고 범위를 검증합니다.
//!
//! # 사용 예시
//!
//! ```
//! use lockgraph_catalog::CatalogConfig;
//!
//! // 기본값으로 생성
//! let config = CatalogConfig::default();
//! config.validate().unwrap();
//!
//! // 빌더로 생성
//! use lockgraph_catalog::CatalogConfigBuilder;
//!
//! let config = CatalogConfigBuilder::new()
//!     .workers(4)
//!     .timeout_secs(120)
//!     .build()
//!     .unwrap();
//! ```

use std::path::{Component, Path};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use lockgraph_core::config::CatalogSection;

use crate::error::CatalogError;
use crate::types::DocumentFormat;

/// 카탈로거 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// 스캔 대상 디렉토리 목록
    pub scan_dirs: Vec<String>,
    /// 매니페스트 최대 허용 크기 (바이트)
    pub max_file_size: usize,
    /// 매니페스트 하나당 최대 패키지 수
    pub max_packages: usize,
    /// 디렉토리 탐색 최대 깊이
    pub max_depth: usize,
    /// 동시 추출 작업 수 (0이면 사용 가능한 CPU 코어 수)
    pub workers: usize,
    /// 전체 실행 제한 시간 (초, 0이면 제한 없음)
    pub timeout_secs: u64,
    /// 탐색에서 제외할 디렉토리 이름
    pub exclude_dirs: Vec<String>,
    /// 출력 문서 형식
    pub output_format: DocumentFormat,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::from_core(&CatalogSection::default())
    }
}

/// 설정 상한값 상수
const MAX_FILE_SIZE: usize = 100 * 1024 * 1024; // 100 MB
const MAX_PACKAGES_LIMIT: usize = 500_000;
const MAX_DEPTH_LIMIT: usize = 64;
const MAX_WORKERS: usize = 256;
const MAX_TIMEOUT_SECS: u64 = 86_400; // 24 hours
const MAX_PATH_LEN: usize = 4096;

impl CatalogConfig {
    /// core의 `[catalog]` 섹션에서 설정을 생성합니다.
    ///
    /// 알 수 없는 출력 형식은 CycloneDX로 대체합니다.
    pub fn from_core(core: &CatalogSection) -> Self {
        Self {
            scan_dirs: core.scan_dirs.clone(),
            max_file_size: core.max_file_size,
            max_packages: core.max_packages,
            max_depth: core.max_depth,
            workers: core.workers,
            timeout_secs: core.timeout_secs,
            exclude_dirs: core.exclude_dirs.clone(),
            output_format: DocumentFormat::from_str_loose(&core.output_format)
                .unwrap_or(DocumentFormat::CycloneDx),
        }
    }

    /// 실제로 사용할 워커 수
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// 실행 제한 시간 (없으면 `None`)
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `max_file_size`: 1-104857600 (100MB)
    /// - `max_packages`: 1-500000
    /// - `max_depth`: 1-64
    /// - `workers`: 0-256
    /// - `timeout_secs`: 0-86400
    /// - `scan_dirs`: 빈 경로, `..` 컴포넌트, 4096자 초과 금지
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.max_file_size == 0 || self.max_file_size > MAX_FILE_SIZE {
            return Err(config_error(
                "max_file_size",
                format!("must be 1-{MAX_FILE_SIZE}"),
            ));
        }

        if self.max_packages == 0 || self.max_packages > MAX_PACKAGES_LIMIT {
            return Err(config_error(
                "max_packages",
                format!("must be 1-{MAX_PACKAGES_LIMIT}"),
            ));
        }

        if self.max_depth == 0 || self.max_depth > MAX_DEPTH_LIMIT {
            return Err(config_error(
                "max_depth",
                format!("must be 1-{MAX_DEPTH_LIMIT}"),
            ));
        }

        if self.workers > MAX_WORKERS {
            return Err(config_error(
                "workers",
                format!("must be 0 (auto) or 1-{MAX_WORKERS}"),
            ));
        }

        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(config_error(
                "timeout_secs",
                format!("must be 0 (none) or 1-{MAX_TIMEOUT_SECS}"),
            ));
        }

        for scan_dir in &self.scan_dirs {
            validate_scan_dir(scan_dir)?;
        }

        Ok(())
    }
}

/// 스캔 경로 하나를 검증합니다 (CLI 인자에도 사용).
pub fn validate_scan_dir(scan_dir: &str) -> Result<(), CatalogError> {
    if scan_dir.is_empty() {
        return Err(config_error(
            "scan_dirs",
            "scan directory path must not be empty".to_owned(),
        ));
    }

    if Path::new(scan_dir)
        .components()
        .any(|c| c == Component::ParentDir)
    {
        return Err(config_error(
            "scan_dirs",
            format!("scan directory '{scan_dir}' contains path traversal pattern '..'"),
        ));
    }

    if scan_dir.len() > MAX_PATH_LEN {
        return Err(config_error(
            "scan_dirs",
            format!("scan directory path exceeds maximum length {MAX_PATH_LEN}"),
        ));
    }

    Ok(())
}

fn config_error(field: &str, reason: String) -> CatalogError {
    CatalogError::Config {
        field: field.to_owned(),
        reason,
    }
}

/// [`CatalogConfig`] 빌더
#[derive(Default)]
pub struct CatalogConfigBuilder {
    config: CatalogConfig,
}

impl CatalogConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan_dirs(mut self, dirs: Vec<String>) -> Self {
        self.config.scan_dirs = dirs;
        self
    }

    pub fn max_file_size(mut self, size: usize) -> Self {
        self.config.max_file_size = size;
        self
    }

    pub fn max_packages(mut self, max: usize) -> Self {
        self.config.max_packages = max;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.config.exclude_dirs = dirs;
        self
    }

    pub fn output_format(mut self, format: DocumentFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `CatalogError::Config` 반환
    pub fn build(self) -> Result<CatalogConfig, CatalogError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CatalogConfig::default();
        config.validate().unwrap();
        assert_eq!(config.output_format, DocumentFormat::CycloneDx);
        assert_eq!(config.max_depth, 16);
    }

    #[test]
    fn from_core_preserves_values() {
        let core = CatalogSection {
            scan_dirs: vec!["/app".to_owned(), "/opt".to_owned()],
            workers: 8,
            timeout_secs: 60,
            output_format: "spdx".to_owned(),
            ..Default::default()
        };
        let config = CatalogConfig::from_core(&core);
        assert_eq!(config.scan_dirs, vec!["/app", "/opt"]);
        assert_eq!(config.workers, 8);
        assert_eq!(config.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.output_format, DocumentFormat::Spdx);
    }

    #[test]
    fn from_core_with_unknown_format_falls_back() {
        let core = CatalogSection {
            output_format: "xml".to_owned(),
            ..Default::default()
        };
        assert_eq!(
            CatalogConfig::from_core(&core).output_format,
            DocumentFormat::CycloneDx
        );
    }

    #[test]
    fn effective_workers_auto_is_positive() {
        let config = CatalogConfig::default();
        assert_eq!(config.workers, 0);
        assert!(config.effective_workers() >= 1);

        let config = CatalogConfigBuilder::new().workers(3).build().unwrap();
        assert_eq!(config.effective_workers(), 3);
    }

    #[test]
    fn zero_timeout_means_none() {
        assert_eq!(CatalogConfig::default().timeout(), None);
    }

    #[test]
    fn validate_rejects_zero_max_file_size() {
        let config = CatalogConfig {
            max_file_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_too_large_max_file_size() {
        let config = CatalogConfig {
            max_file_size: 200 * 1024 * 1024,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_max_packages() {
        let config = CatalogConfig {
            max_packages: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_too_many_workers() {
        let err = CatalogConfigBuilder::new().workers(1000).build().unwrap_err();
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn validate_rejects_zero_depth() {
        assert!(CatalogConfigBuilder::new().max_depth(0).build().is_err());
    }

    #[test]
    fn validate_rejects_long_timeout() {
        assert!(CatalogConfigBuilder::new().timeout_secs(100_000).build().is_err());
    }

    #[test]
    fn validate_rejects_parent_dir_component() {
        let err = CatalogConfigBuilder::new()
            .scan_dirs(vec!["/srv/../etc".to_owned()])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains(".."));
    }

    #[test]
    fn validate_accepts_dotdot_inside_name() {
        // 이름에 ".."가 포함된 것은 경로 순회가 아님
        CatalogConfigBuilder::new()
            .scan_dirs(vec!["/srv/app..v2".to_owned()])
            .build()
            .unwrap();
    }

    #[test]
    fn validate_rejects_empty_and_long_paths() {
        assert!(validate_scan_dir("").is_err());
        assert!(validate_scan_dir(&"a".repeat(MAX_PATH_LEN + 1)).is_err());
    }

    #[test]
    fn builder_all_setters() {
        let config = CatalogConfigBuilder::new()
            .scan_dirs(vec!["/app".to_owned()])
            .max_file_size(5 * 1024 * 1024)
            .max_packages(10_000)
            .max_depth(4)
            .workers(2)
            .timeout_secs(30)
            .exclude_dirs(vec!["vendor".to_owned()])
            .output_format(DocumentFormat::Json)
            .build()
            .unwrap();

        assert_eq!(config.scan_dirs, vec!["/app"]);
        assert_eq!(config.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.max_packages, 10_000);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.workers, 2);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.exclude_dirs, vec!["vendor"]);
        assert_eq!(config.output_format, DocumentFormat::Json);
    }
}
