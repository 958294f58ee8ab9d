//! 수집 전략.
//!
//! 최소 60개의 클린 종가 관측치를 보장하거나 모든 옵션을 소진하고
//! 명시적으로 실패합니다. 허용 목록 티커는 mock 소스를 우선하고, 그 외
//! (또는 mock 실패/부족 시)에는 라이브 소스를 윈도우를 넓혀가며
//! 시도합니다.
//!
//! 업스트림 API는 불안정하고 요청 제한이 있으므로, 항상 최대 구간을
//! 먼저 요청하는 대신 점진적으로 윈도우를 넓히는 편이 최소 이력 요건을
//! 만족시킬 확률을 높입니다.

use tracing::{debug, info, warn};

use crate::client::NetworkConfig;
use crate::error::DataSourceError;
use crate::source::{FetchWindow, MockSheetSource, SeriesSource, YahooQuoteSource};
use stockcast_core::{PriceSeries, MIN_OBSERVATIONS};

/// 라이브 소스의 상대 구간 시도 순서.
pub const RANGE_ATTEMPTS: [FetchWindow; 3] = [
    FetchWindow::Range("180d"),
    FetchWindow::Range("365d"),
    FetchWindow::Range("max"),
];

/// 라이브 소스의 절대 구간(과거 일수) 시도 순서.
pub const LOOKBACK_ATTEMPTS: [FetchWindow; 5] = [
    FetchWindow::Lookback { days: 180 },
    FetchWindow::Lookback { days: 270 },
    FetchWindow::Lookback { days: 365 },
    FetchWindow::Lookback { days: 540 },
    FetchWindow::Lookback { days: 720 },
];

/// 다중 소스 수집 전략.
///
/// 결정적이고 순서가 있으며, 충분한 길이의 첫 성공이 이기고, 아니면
/// 지금까지 본 가장 큰 후보를 유지합니다. 라이브 소스용으로 열린 전송
/// 세션은 전략 값이 소유하므로 모든 종료 경로에서 함께 해제됩니다.
pub struct AcquisitionStrategy {
    mock: Box<dyn SeriesSource>,
    live: Box<dyn SeriesSource>,
}

impl AcquisitionStrategy {
    /// 기본 소스 구성 (mock 시트 + Yahoo Finance)으로 전략 생성.
    pub fn new(config: &NetworkConfig) -> Result<Self, DataSourceError> {
        Ok(Self {
            mock: Box::new(MockSheetSource::new()),
            live: Box::new(YahooQuoteSource::new(config)?),
        })
    }

    /// 소스를 직접 주입하여 전략 생성 (테스트용).
    pub fn with_sources(mock: Box<dyn SeriesSource>, live: Box<dyn SeriesSource>) -> Self {
        Self { mock, live }
    }

    /// 티커에 대해 클린 관측치 60개 이상의 시계열을 수집.
    ///
    /// 티커는 표준화(트림 + 대문자) 후 사용됩니다. 모든 시도가 실패하면
    /// 티커와 마지막 에러를 담은 [`DataSourceError::Exhausted`]를
    /// 반환합니다.
    pub async fn acquire(&self, ticker: &str) -> Result<PriceSeries, DataSourceError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(DataSourceError::UnsupportedTicker(
                "empty ticker".to_string(),
            ));
        }

        let mut best: Option<PriceSeries> = None;
        let mut last_error: Option<DataSourceError> = None;

        // 1. 허용 목록 티커는 mock 소스 우선
        if self.mock.supports(&ticker) {
            match self.mock.fetch_daily(&ticker, FetchWindow::Recent).await {
                Ok(series) if series.clean_len() >= MIN_OBSERVATIONS => {
                    info!(
                        "acquisition: {} satisfied by {} ({} clean rows)",
                        ticker,
                        self.mock.name(),
                        series.clean_len()
                    );
                    return Ok(series);
                }
                Ok(series) => {
                    debug!(
                        "acquisition: {} returned only {} clean rows, falling through",
                        self.mock.name(),
                        series.clean_len()
                    );
                    Self::keep_largest(&mut best, series);
                }
                Err(err) => {
                    debug!("acquisition: {} failed: {}", self.mock.name(), err);
                    last_error = Some(err);
                }
            }
        }

        // 2. 상대 구간 → 3. 절대 구간 순서로 라이브 소스 시도
        let attempts = RANGE_ATTEMPTS.iter().chain(LOOKBACK_ATTEMPTS.iter());
        for &window in attempts {
            match self.live.fetch_daily(&ticker, window).await {
                Ok(series) if series.clean_len() >= MIN_OBSERVATIONS => {
                    info!(
                        "acquisition: {} satisfied by {} {:?} ({} clean rows)",
                        ticker,
                        self.live.name(),
                        window,
                        series.clean_len()
                    );
                    return Ok(series);
                }
                Ok(series) => {
                    debug!(
                        "acquisition: {:?} yielded {} clean rows, keeping as fallback",
                        window,
                        series.clean_len()
                    );
                    Self::keep_largest(&mut best, series);
                }
                Err(err) => {
                    debug!("acquisition: {:?} failed: {}", window, err);
                    last_error = Some(err);
                }
            }
        }

        // 4. 어떤 시도도 60개에 도달하지 못함 → 명시적 실패
        let best_len = best.map(|s| s.clean_len()).unwrap_or(0);
        warn!(
            "acquisition: all strategies exhausted for {} (best candidate: {} rows)",
            ticker, best_len
        );
        Err(DataSourceError::Exhausted {
            ticker,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("insufficient history ({} clean rows)", best_len)),
        })
    }

    /// 더 많은 클린 행을 가진 후보를 유지.
    fn keep_largest(best: &mut Option<PriceSeries>, candidate: PriceSeries) {
        let replace = best
            .as_ref()
            .map(|b| candidate.clean_len() > b.clean_len())
            .unwrap_or(true);
        if replace {
            *best = Some(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use stockcast_core::DailyQuote;

    /// 항상 실패하는 소스.
    struct FailingSource {
        calls: Arc<AtomicUsize>,
    }

    impl FailingSource {
        fn new() -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl SeriesSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn supports(&self, _ticker: &str) -> bool {
            true
        }

        async fn fetch_daily(
            &self,
            _ticker: &str,
            _window: FetchWindow,
        ) -> Result<PriceSeries, DataSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DataSourceError::Network("connection refused".to_string()))
        }
    }

    /// 호출 순서대로 지정된 행 수를 반환하는 소스.
    struct ScriptedSource {
        lengths: Vec<usize>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(lengths: Vec<usize>) -> Self {
            Self {
                lengths,
                calls: AtomicUsize::new(0),
            }
        }

        fn series_of(len: usize) -> PriceSeries {
            let today = Utc::now().date_naive();
            let rows: Vec<DailyQuote> = (0..len)
                .map(|i| {
                    DailyQuote::new(
                        today - Duration::days((len - 1 - i) as i64),
                        Some(100.0 + i as f64),
                    )
                })
                .collect();
            PriceSeries::new("TEST", rows)
        }
    }

    #[async_trait]
    impl SeriesSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn supports(&self, _ticker: &str) -> bool {
            true
        }

        async fn fetch_daily(
            &self,
            _ticker: &str,
            _window: FetchWindow,
        ) -> Result<PriceSeries, DataSourceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let len = self.lengths.get(call).copied().unwrap_or(0);
            if len == 0 {
                Err(DataSourceError::EmptyResult("TEST".to_string()))
            } else {
                Ok(Self::series_of(len))
            }
        }
    }

    /// 호출되면 안 되는 소스.
    struct UnreachableSource;

    #[async_trait]
    impl SeriesSource for UnreachableSource {
        fn name(&self) -> &'static str {
            "unreachable"
        }

        fn supports(&self, _ticker: &str) -> bool {
            false
        }

        async fn fetch_daily(
            &self,
            _ticker: &str,
            _window: FetchWindow,
        ) -> Result<PriceSeries, DataSourceError> {
            panic!("source must not be called");
        }
    }

    #[tokio::test]
    async fn test_allowlisted_ticker_served_by_mock() {
        let strategy = AcquisitionStrategy::with_sources(
            Box::new(MockSheetSource::new()),
            Box::new(UnreachableSource),
        );

        let series = strategy.acquire("aapl").await.unwrap();
        assert_eq!(series.ticker, "AAPL");
        assert!(series.clean_len() >= MIN_OBSERVATIONS);
    }

    #[tokio::test]
    async fn test_unsupported_ticker_with_failing_live_terminates() {
        let live = Box::new(FailingSource::new());
        let strategy =
            AcquisitionStrategy::with_sources(Box::new(MockSheetSource::new()), live);

        let err = strategy.acquire("TSLA").await.unwrap_err();
        match err {
            DataSourceError::Exhausted { ticker, last_error } => {
                assert_eq!(ticker, "TSLA");
                assert!(last_error.contains("connection refused"));
            }
            other => panic!("expected Exhausted, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_failing_live_tries_every_window_once() {
        let live = FailingSource::new();
        let calls = Arc::clone(&live.calls);
        let expected = RANGE_ATTEMPTS.len() + LOOKBACK_ATTEMPTS.len();
        let strategy =
            AcquisitionStrategy::with_sources(Box::new(MockSheetSource::new()), Box::new(live));

        let _ = strategy.acquire("TSLA").await;
        assert_eq!(calls.load(Ordering::SeqCst), expected);
    }

    #[tokio::test]
    async fn test_short_candidate_then_sufficient_candidate() {
        let live = Box::new(ScriptedSource::new(vec![40, 70]));
        let strategy =
            AcquisitionStrategy::with_sources(Box::new(MockSheetSource::new()), live);

        let series = strategy.acquire("TSLA").await.unwrap();
        assert_eq!(series.clean_len(), 70);
    }

    #[tokio::test]
    async fn test_all_short_candidates_fail_closed() {
        // 가장 큰 후보(55)도 60 미만이면 패딩 없이 실패해야 한다
        let live = Box::new(ScriptedSource::new(vec![40, 55, 50, 30, 20, 10, 5, 1]));
        let strategy =
            AcquisitionStrategy::with_sources(Box::new(MockSheetSource::new()), live);

        let err = strategy.acquire("TSLA").await.unwrap_err();
        assert!(err.is_exhausted());
    }

    #[tokio::test]
    async fn test_empty_ticker_rejected() {
        let strategy = AcquisitionStrategy::with_sources(
            Box::new(MockSheetSource::new()),
            Box::new(FailingSource::new()),
        );

        let err = strategy.acquire("   ").await.unwrap_err();
        assert!(matches!(err, DataSourceError::UnsupportedTicker(_)));
    }
}
