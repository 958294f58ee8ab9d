//! 시계열 소스 어댑터.
//!
//! 티커 하나에 대해 날짜 오름차순 종가 시계열을 반환하는 소스들의 통합
//! 인터페이스를 제공합니다. 소스는 성공/실패만 신호하며 지표 로직은
//! 포함하지 않습니다.

pub mod mock;
pub mod yahoo;

use async_trait::async_trait;

use crate::error::DataSourceError;
use stockcast_core::PriceSeries;

pub use mock::MockSheetSource;
pub use yahoo::YahooQuoteSource;

/// 한 번의 조회 시도를 기술하는 윈도우.
///
/// 수집 전략은 이 디스크립터들의 정적 순서 목록을 소비합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchWindow {
    /// 소스의 기본 최근 구간.
    Recent,
    /// 상대 구간 파라미터 (예: "180d", "365d", "max").
    Range(&'static str),
    /// 오늘로부터 과거 `days`일의 절대 구간.
    Lookback { days: i64 },
}

/// 시계열 소스 어댑터 trait.
///
/// 구현체는 날짜 오름차순이 보장된 [`PriceSeries`]를 반환하거나 타입이
/// 있는 실패를 반환합니다. 실패는 호출자를 중단시키지 않고 위로 보고되어
/// 수집 전략이 다음 옵션을 시도할 수 있게 합니다.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// 로깅용 소스 이름.
    fn name(&self) -> &'static str;

    /// 이 소스가 해당 티커를 처리할 수 있는지 확인.
    fn supports(&self, ticker: &str) -> bool;

    /// 일별 종가 시계열 조회.
    async fn fetch_daily(
        &self,
        ticker: &str,
        window: FetchWindow,
    ) -> Result<PriceSeries, DataSourceError>;
}
