//! 라이브 소스용 네트워크 클라이언트 설정.
//!
//! 업스트림 시세 API는 기본 HTTP 클라이언트 시그니처를 차단하는 경우가
//! 있어, 브라우저와 유사한 요청 헤더를 명시적으로 구성합니다. 전역
//! 설정이 아니라 값으로 전달되는 설정입니다.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};

use crate::error::DataSourceError;

/// 라이브 시세 소스의 HTTP 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// User-Agent 헤더 값.
    pub user_agent: String,
    /// Accept 헤더 값.
    pub accept: String,
    /// Accept-Language 헤더 값.
    pub accept_language: String,
    /// 요청당 타임아웃.
    pub timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,\
                     image/apng,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl NetworkConfig {
    /// 타임아웃을 설정합니다.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 설정된 헤더와 타임아웃으로 reqwest 클라이언트를 생성합니다.
    pub fn build_client(&self) -> Result<reqwest::Client, DataSourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| DataSourceError::Unknown(format!("invalid user agent: {}", e)))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&self.accept)
                .map_err(|e| DataSourceError::Unknown(format!("invalid accept header: {}", e)))?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&self.accept_language)
                .map_err(|e| DataSourceError::Unknown(format!("invalid accept language: {}", e)))?,
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("DNT", HeaderValue::from_static("1"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(|e| DataSourceError::Network(format!("failed to build HTTP client: {}", e)))
    }
}
