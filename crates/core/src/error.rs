//! 에러 타입: 도메인별 에러 정의

/// lockgraph 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LockgraphError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 카탈로그 구성 에러
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogFailure),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 카탈로그 구성 중 실행 전체를 중단시키는 에러
///
/// 매니페스트 하나의 파싱 실패처럼 복구 가능한 문제는 진단(diagnostic)으로
/// 기록되며 이 타입으로 올라오지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum CatalogFailure {
    /// 입력 소스에서 읽을 수 있는 파일이 전혀 없음
    #[error("input exhausted: {0}")]
    InputExhausted(String),

    /// 계약 위반 (예: finalize 이후 submit)
    #[error("contract violation: {0}")]
    Contract(String),

    /// 추출 단계 실패
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// 출력 문서 인코딩 실패
    #[error("encode failed: {0}")]
    Encode(String),
}
