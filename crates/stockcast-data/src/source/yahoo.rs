//! Yahoo Finance 시세 소스.
//!
//! Yahoo Finance v8 차트 API를 사용하여 일별 종가를 조회합니다.
//!
//! # 심볼 형식
//!
//! 모든 심볼은 Yahoo Finance 형식으로 전달되어야 합니다:
//! - 미국 주식: "AAPL", "GOOGL"
//! - 한국 주식: "005930.KS" (코스피) 또는 "124560.KQ" (코스닥)
//! - ETF: "SPY", "QQQ"
//!
//! # 조회 구간
//!
//! [`FetchWindow::Range`]는 `range` 쿼리 파라미터로, [`FetchWindow::Lookback`]은
//! `period1`/`period2` 유닉스 타임스탬프 경계로 변환됩니다. 업스트림이
//! 종가를 제공하지 못한 일자는 결측(`None`)으로 보존되어 클리닝 단계에서
//! 제거됩니다.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::NetworkConfig;
use crate::error::DataSourceError;
use crate::source::{FetchWindow, SeriesSource};
use stockcast_core::{DailyQuote, PriceSeries};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Lookback 윈도우가 지정되지 않았을 때 사용하는 기본 상대 구간.
const DEFAULT_RANGE: &str = "180d";

/// Yahoo Finance 차트 API 시세 소스.
pub struct YahooQuoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl YahooQuoteSource {
    /// 주어진 네트워크 설정으로 새 소스 생성.
    pub fn new(config: &NetworkConfig) -> Result<Self, DataSourceError> {
        Ok(Self {
            client: config.build_client()?,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// 기본 URL을 재정의하여 생성 (테스트용).
    pub fn with_base_url(
        config: &NetworkConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, DataSourceError> {
        Ok(Self {
            client: config.build_client()?,
            base_url: base_url.into(),
        })
    }

    /// 윈도우를 차트 API 쿼리 파라미터로 변환.
    fn window_to_query(window: FetchWindow) -> Vec<(String, String)> {
        match window {
            FetchWindow::Recent => vec![("range".to_string(), DEFAULT_RANGE.to_string())],
            FetchWindow::Range(range) => vec![("range".to_string(), range.to_string())],
            FetchWindow::Lookback { days } => {
                let end = Utc::now();
                let start = end - Duration::days(days);
                vec![
                    ("period1".to_string(), start.timestamp().to_string()),
                    ("period2".to_string(), end.timestamp().to_string()),
                ]
            }
        }
    }

    /// 차트 응답을 PriceSeries로 변환.
    fn parse_chart(ticker: &str, body: ChartResponse) -> Result<PriceSeries, DataSourceError> {
        if let Some(err) = body.chart.error {
            return Err(DataSourceError::ApiError {
                code: 0,
                message: format!("{}: {}", err.code, err.description),
            });
        }

        let result = body
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| DataSourceError::EmptyResult(ticker.to_string()))?;

        let timestamps = result
            .timestamp
            .ok_or_else(|| DataSourceError::EmptyResult(ticker.to_string()))?;

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .and_then(|q| q.close)
            .ok_or_else(|| DataSourceError::MissingCloses(ticker.to_string()))?;

        if timestamps.is_empty() {
            return Err(DataSourceError::EmptyResult(ticker.to_string()));
        }

        let rows: Vec<DailyQuote> = timestamps
            .iter()
            .zip(closes.iter())
            .filter_map(|(&ts, &close)| {
                DateTime::from_timestamp(ts, 0).map(|dt| DailyQuote::new(dt.date_naive(), close))
            })
            .collect();

        debug!("Yahoo Finance: {} 캔들 {} 개 수신", ticker, rows.len());

        // 생성자가 시간순 정렬과 중복 일자 제거를 보장한다
        Ok(PriceSeries::new(ticker, rows))
    }
}

#[async_trait]
impl SeriesSource for YahooQuoteSource {
    fn name(&self) -> &'static str {
        "yahoo-finance"
    }

    fn supports(&self, _ticker: &str) -> bool {
        true
    }

    async fn fetch_daily(
        &self,
        ticker: &str,
        window: FetchWindow,
    ) -> Result<PriceSeries, DataSourceError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let mut query = vec![("interval".to_string(), "1d".to_string())];
        query.extend(Self::window_to_query(window));

        debug!("Yahoo Finance: fetching {} ({:?})", ticker, window);

        let response = self.client.get(&url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Yahoo Finance: {} 요청 실패 (HTTP {})", ticker, status);
            return Err(DataSourceError::ApiError {
                code: status.as_u16(),
                message: format!("chart request for '{}' failed", ticker),
            });
        }

        let body: ChartResponse = response.json().await?;
        Self::parse_chart(ticker, body)
    }
}

// ==================== 차트 API 응답 형식 ====================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    close: Option<Vec<Option<f64>>>,
}
