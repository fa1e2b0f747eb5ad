//! lockgraph 공통 크레이트
//!
//! 모든 lockgraph 크레이트가 공유하는 최상위 에러, 설정, 메트릭 이름을 정의합니다.
//!
//! - [`error`]: 최상위 에러 타입 (`LockgraphError`, `ConfigError`, `CatalogFailure`)
//! - [`config`]: `lockgraph.toml` 파싱 및 환경변수 오버라이드 (`LockgraphConfig`)
//! - [`metrics`]: `metrics` 크레이트용 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;

// --- 주요 타입 re-export ---

// 에러
pub use error::{CatalogFailure, ConfigError, LockgraphError};

// 설정
pub use config::{CatalogSection, GeneralConfig, LockgraphConfig};
