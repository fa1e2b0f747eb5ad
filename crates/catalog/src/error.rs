//! 카탈로그 에러 타입
//!
//! [`CatalogError`]는 카탈로그 크레이트 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<CatalogError> for LockgraphError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **복구 가능 (진단으로 변환)**: `MalformedManifest`
//! - **계약 위반 (치명적)**: `SubmitAfterFinalize`, `AlreadyFinalized`
//! - **입력 소진 (치명적)**: `InputExhausted`
//! - **파일 I/O**: `Io`, `FileTooBig`
//! - **설정**: `Config`
//! - **출력 인코딩**: `Encode`
//! - **워커 태스크**: `Worker`

use lockgraph_core::error::{CatalogFailure, ConfigError, LockgraphError};

/// 카탈로그 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// 매니페스트 파싱 실패
    ///
    /// 추출기가 반환하며, 카탈로거는 이 에러를 진단으로 기록하고 다음 파일로 넘어갑니다.
    #[error("malformed manifest: {path}: {reason}")]
    MalformedManifest {
        /// 매니페스트 경로
        path: String,
        /// 파싱 실패 사유
        reason: String,
    },

    /// `finalize()` 이후 `submit()` 호출
    #[error("submit called after finalize")]
    SubmitAfterFinalize,

    /// `finalize()` 중복 호출
    #[error("catalog already finalized")]
    AlreadyFinalized,

    /// 후보 매니페스트를 하나도 읽지 못함
    #[error("input exhausted: none of {attempted} candidate manifests could be read")]
    InputExhausted {
        /// 읽기를 시도한 후보 수
        attempted: usize,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 파일 크기 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 파일 경로
        path: String,
        /// 실제 파일 크기 (바이트)
        size: usize,
        /// 최대 허용 크기 (바이트)
        max: usize,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 출력 문서 인코딩 실패
    #[error("encode error: {0}")]
    Encode(String),

    /// 워커 태스크 실행 실패
    #[error("worker error: {0}")]
    Worker(String),
}

impl CatalogError {
    /// 매니페스트 파싱 실패 에러를 생성합니다.
    pub fn malformed(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedManifest {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// 실행 전체를 중단해야 하는 에러인지 반환합니다.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::MalformedManifest { .. } | Self::FileTooBig { .. }
        )
    }
}

impl From<CatalogError> for LockgraphError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::MalformedManifest { path, reason } => LockgraphError::Catalog(
                CatalogFailure::Extraction(format!("malformed manifest: {path}: {reason}")),
            ),
            CatalogError::SubmitAfterFinalize => LockgraphError::Catalog(
                CatalogFailure::Contract("submit called after finalize".to_owned()),
            ),
            CatalogError::AlreadyFinalized => LockgraphError::Catalog(CatalogFailure::Contract(
                "catalog already finalized".to_owned(),
            )),
            CatalogError::InputExhausted { attempted } => {
                LockgraphError::Catalog(CatalogFailure::InputExhausted(format!(
                    "none of {attempted} candidate manifests could be read"
                )))
            }
            CatalogError::Io { source, .. } => LockgraphError::Io(source),
            CatalogError::FileTooBig { path, size, max } => {
                LockgraphError::Catalog(CatalogFailure::Extraction(format!(
                    "file too large: {path}: {size} bytes (max: {max})"
                )))
            }
            CatalogError::Config { field, reason } => {
                LockgraphError::Config(ConfigError::InvalidValue { field, reason })
            }
            CatalogError::Encode(msg) => LockgraphError::Catalog(CatalogFailure::Encode(msg)),
            CatalogError::Worker(msg) => {
                LockgraphError::Catalog(CatalogFailure::Extraction(format!("worker: {msg}")))
            }
        }
    }
}
