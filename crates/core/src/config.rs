//! 설정 관리: lockgraph.toml 파싱 및 런타임 설정
//!
//! [`LockgraphConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOCKGRAPH_CATALOG_WORKERS=8` 형식)
//! 3. 설정 파일 (`lockgraph.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), lockgraph_core::error::LockgraphError> {
//! use lockgraph_core::config::LockgraphConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LockgraphConfig::load("lockgraph.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LockgraphConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LockgraphError};

/// lockgraph 통합 설정
///
/// `lockgraph.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockgraphConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 카탈로그 설정
    #[serde(default)]
    pub catalog: CatalogSection,
}

impl LockgraphConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LockgraphError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 기본값에 환경변수 오버라이드만 적용한 설정을 반환합니다.
    ///
    /// 설정 파일이 없을 때 CLI가 사용합니다.
    pub fn from_env() -> Result<Self, LockgraphError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LockgraphError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LockgraphError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LockgraphError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LockgraphError> {
        toml::from_str(toml_str).map_err(|e| {
            LockgraphError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 설정을 TOML 문자열로 직렬화합니다.
    pub fn to_toml(&self) -> Result<String, LockgraphError> {
        toml::to_string_pretty(self).map_err(|e| {
            LockgraphError::Config(ConfigError::ParseFailed {
                reason: format!("serialize failed: {e}"),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOCKGRAPH_{SECTION}_{FIELD}`
    /// 예: `LOCKGRAPH_CATALOG_WORKERS=8`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOCKGRAPH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOCKGRAPH_GENERAL_LOG_FORMAT");

        // Catalog
        override_csv(&mut self.catalog.scan_dirs, "LOCKGRAPH_CATALOG_SCAN_DIRS");
        override_usize(
            &mut self.catalog.max_file_size,
            "LOCKGRAPH_CATALOG_MAX_FILE_SIZE",
        );
        override_usize(
            &mut self.catalog.max_packages,
            "LOCKGRAPH_CATALOG_MAX_PACKAGES",
        );
        override_usize(&mut self.catalog.max_depth, "LOCKGRAPH_CATALOG_MAX_DEPTH");
        override_usize(&mut self.catalog.workers, "LOCKGRAPH_CATALOG_WORKERS");
        override_u64(
            &mut self.catalog.timeout_secs,
            "LOCKGRAPH_CATALOG_TIMEOUT_SECS",
        );
        override_csv(
            &mut self.catalog.exclude_dirs,
            "LOCKGRAPH_CATALOG_EXCLUDE_DIRS",
        );
        override_string(
            &mut self.catalog.output_format,
            "LOCKGRAPH_CATALOG_OUTPUT_FORMAT",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 수치 범위는 카탈로그 크레이트의 `CatalogConfig::validate()`가 검사하며,
    /// 여기서는 문자열 열거 값만 확인합니다.
    pub fn validate(&self) -> Result<(), LockgraphError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        let valid_outputs = ["cyclonedx", "spdx", "json"];
        if !valid_outputs.contains(&self.catalog.output_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "catalog.output_format".to_owned(),
                reason: format!("must be one of: {}", valid_outputs.join(", ")),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 카탈로그 설정 (`[catalog]` 섹션)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// 스캔 대상 디렉토리
    pub scan_dirs: Vec<String>,
    /// 매니페스트 최대 크기 (바이트)
    pub max_file_size: usize,
    /// 매니페스트 하나당 최대 패키지 수
    pub max_packages: usize,
    /// 디렉토리 탐색 최대 깊이
    pub max_depth: usize,
    /// 동시 추출 작업 수 (0이면 CPU 코어 수)
    pub workers: usize,
    /// 전체 실행 제한 시간 (초, 0이면 제한 없음)
    pub timeout_secs: u64,
    /// 탐색에서 제외할 디렉토리 이름
    pub exclude_dirs: Vec<String>,
    /// 출력 형식 (cyclonedx, spdx, json)
    pub output_format: String,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            scan_dirs: vec![".".to_owned()],
            max_file_size: 10 * 1024 * 1024, // 10 MB
            max_packages: 50_000,
            max_depth: 16,
            workers: 0,
            timeout_secs: 0,
            exclude_dirs: vec![
                "node_modules".to_owned(),
                ".git".to_owned(),
                "target".to_owned(),
            ],
            output_format: "cyclonedx".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
