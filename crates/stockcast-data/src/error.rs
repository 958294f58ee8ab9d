//! 데이터 소스 에러 타입.

use thiserror::Error;

/// 데이터 소스 관련 에러.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 업스트림 API 에러 응답
    #[error("API error {code}: {message}")]
    ApiError { code: u16, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 응답에 행이 하나도 없음
    #[error("Empty result for '{0}'")]
    EmptyResult(String),

    /// 응답에 종가 컬럼이 없음
    #[error("No closing price data for '{0}'")]
    MissingCloses(String),

    /// 소스가 지원하지 않는 티커
    #[error("Ticker not supported: {0}")]
    UnsupportedTicker(String),

    /// 모든 수집 전략 소진
    #[error("Failed to fetch data for '{ticker}'. Last error: {last_error}")]
    Exhausted { ticker: String, last_error: String },

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// 데이터 소스 작업을 위한 Result 타입.
pub type DataSourceResult<T> = Result<T, DataSourceError>;

impl DataSourceError {
    /// 다음 전략 시도로 복구 가능한 일시적 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DataSourceError::Network(_)
                | DataSourceError::Timeout(_)
                | DataSourceError::EmptyResult(_)
        )
    }

    /// 수집 캐스케이드 전체가 실패했는지 확인.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, DataSourceError::Exhausted { .. })
    }
}

impl From<reqwest::Error> for DataSourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataSourceError::Timeout(err.to_string())
        } else if err.is_connect() {
            DataSourceError::Network(err.to_string())
        } else if err.is_decode() {
            DataSourceError::ParseError(err.to_string())
        } else {
            DataSourceError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataSourceError {
    fn from(err: serde_json::Error) -> Self {
        DataSourceError::ParseError(err.to_string())
    }
}
