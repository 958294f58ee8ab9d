//! 파이프라인의 에러 타입.
//!
//! 이 모듈은 호출자에게 노출되는 와이어 에러 코드 체계를 정의합니다.
//! 모든 단계별 에러는 최종적으로 이 타입으로 변환되어 단일 JSON
//! 페이로드로 보고됩니다.

use thiserror::Error;

/// 파이프라인 에러.
///
/// `Display`는 와이어 형식 `"<CODE>: <detail>"`을 그대로 렌더링합니다.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 데이터 수집 실패 (모든 소스/전략 소진)
    #[error("ERROR_DATA_FETCH: {0}")]
    DataFetch(String),

    /// 입력 데이터 파싱 실패
    #[error("ERROR_DATA_PARSE: {0}")]
    DataParse(String),

    /// 잘못된 호출 인자
    #[error("ERROR_INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// 데이터 검증 실패 (형상, NaN/Infinity 등)
    #[error("ERROR_DATA_VALIDATION: {0}")]
    DataValidation(String),

    /// 예기치 않은 실행 에러
    #[error("ERROR_RUNTIME: {0}")]
    Runtime(String),
}

/// 파이프라인 작업을 위한 Result 타입.
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// 와이어 에러 코드 반환.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::DataFetch(_) => "ERROR_DATA_FETCH",
            PipelineError::DataParse(_) => "ERROR_DATA_PARSE",
            PipelineError::InvalidInput(_) => "ERROR_INVALID_INPUT",
            PipelineError::DataValidation(_) => "ERROR_DATA_VALIDATION",
            PipelineError::Runtime(_) => "ERROR_RUNTIME",
        }
    }

    /// 수집 단계 내부에서 재시도로 복구 가능했던 에러인지 확인.
    ///
    /// 수집 에러만 내부 재시도 대상이며, 나머지는 즉시 보고됩니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::DataFetch(_))
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::DataParse(err.to_string())
    }
}
