//! 오프라인/데모 티커용 mock 시계열 소스.
//!
//! 외부 시트 데이터 소스를 대체하는 합성 시계열을 생성합니다. 허용
//! 목록에 있는 티커에 대해서만 동작하며, 선형 추세에 소폭의 곱셈형
//! 가우시안 노이즈를 더한 결정적 시계열을 반환합니다.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Normal;
use tracing::debug;

use crate::error::DataSourceError;
use crate::source::{FetchWindow, SeriesSource};
use stockcast_core::{DailyQuote, PriceSeries};

/// mock 소스가 생성하는 최근 달력일 수.
pub const MOCK_DAYS: usize = 65;

/// 노이즈 표준편차 (곱셈형, 1%).
const NOISE_SIGMA: f64 = 0.01;

/// 허용 목록: (티커, 시작가, 종료가).
const SUPPORTED: &[(&str, f64, f64)] = &[("AAPL", 150.0, 170.0), ("MSFT", 310.0, 330.0)];

/// 데모/오프라인 티커용 mock 시트 소스.
///
/// 같은 티커에 대해 항상 같은 시계열을 반환합니다 (티커로부터 시드 유도).
#[derive(Debug, Default)]
pub struct MockSheetSource;

impl MockSheetSource {
    /// 새 mock 소스 생성.
    pub fn new() -> Self {
        Self
    }

    /// 허용 목록에서 티커의 추세 구간 조회.
    fn trend_for(ticker: &str) -> Option<(f64, f64)> {
        SUPPORTED
            .iter()
            .find(|(t, _, _)| *t == ticker)
            .map(|(_, start, end)| (*start, *end))
    }

    /// 티커로부터 결정적 RNG 시드 유도.
    fn seed_for(ticker: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        ticker.hash(&mut hasher);
        hasher.finish()
    }

    /// 선형 추세 + 곱셈형 가우시안 노이즈로 가격 생성.
    ///
    /// 가격은 추세 경계의 ±5% 범위로 클리핑됩니다.
    fn generate_prices(ticker: &str, start: f64, end: f64, days: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(Self::seed_for(ticker));
        let noise = Normal::new(0.0, NOISE_SIGMA).expect("valid sigma");

        let lower = start * 0.95;
        let upper = end * 1.05;
        let step = (end - start) / (days - 1) as f64;

        (0..days)
            .map(|i| {
                let trend = start + step * i as f64;
                let price = trend * (1.0 + rng.sample(noise));
                price.clamp(lower, upper)
            })
            .collect()
    }
}

#[async_trait]
impl SeriesSource for MockSheetSource {
    fn name(&self) -> &'static str {
        "mock-sheet"
    }

    fn supports(&self, ticker: &str) -> bool {
        Self::trend_for(ticker).is_some()
    }

    async fn fetch_daily(
        &self,
        ticker: &str,
        _window: FetchWindow,
    ) -> Result<PriceSeries, DataSourceError> {
        let (start, end) = Self::trend_for(ticker)
            .ok_or_else(|| DataSourceError::UnsupportedTicker(ticker.to_string()))?;

        let prices = Self::generate_prices(ticker, start, end, MOCK_DAYS);

        // 오늘로 끝나는 최근 MOCK_DAYS개의 달력일, 오름차순
        let today = Utc::now().date_naive();
        let rows: Vec<DailyQuote> = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| {
                let date = today - Duration::days((MOCK_DAYS - 1 - i) as i64);
                DailyQuote::new(date, Some(price))
            })
            .collect();

        debug!("mock source: {} rows generated for {}", rows.len(), ticker);

        Ok(PriceSeries::new(ticker, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_supported_ticker_yields_requested_day_count() {
        let source = MockSheetSource::new();
        let series = source.fetch_daily("AAPL", FetchWindow::Recent).await.unwrap();

        assert_eq!(series.len(), MOCK_DAYS);
        assert_eq!(series.clean_len(), MOCK_DAYS);
    }

    #[tokio::test]
    async fn test_dates_strictly_ascending() {
        let source = MockSheetSource::new();
        let series = source.fetch_daily("MSFT", FetchWindow::Recent).await.unwrap();

        for pair in series.rows().windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[tokio::test]
    async fn test_prices_within_clipped_trend_bounds() {
        let source = MockSheetSource::new();
        let series = source.fetch_daily("AAPL", FetchWindow::Recent).await.unwrap();

        for close in series.clean_closes() {
            assert!(close >= 150.0 * 0.95);
            assert!(close <= 170.0 * 1.05);
        }
    }

    #[tokio::test]
    async fn test_deterministic_for_fixed_ticker() {
        let source = MockSheetSource::new();
        let a = source.fetch_daily("AAPL", FetchWindow::Recent).await.unwrap();
        let b = source.fetch_daily("AAPL", FetchWindow::Recent).await.unwrap();

        assert_eq!(a.clean_closes(), b.clean_closes());
    }

    #[tokio::test]
    async fn test_unsupported_ticker_fails() {
        let source = MockSheetSource::new();
        assert!(!source.supports("TSLA"));

        let result = source.fetch_daily("TSLA", FetchWindow::Recent).await;
        assert!(matches!(
            result,
            Err(DataSourceError::UnsupportedTicker(_))
        ));
    }
}
