//! 기술적 지표 모듈.
//!
//! 모델 입력에 사용되는 두 지표를 제공합니다:
//!
//! - **RSI**: 상대강도지수 (Relative Strength Index, Wilder smoothing, 기간 14)
//! - **MACD**: 이동평균 수렴/확산 라인 (EMA 12 − EMA 26, 시그널 라인은 하류에서
//!   사용하지 않음)
//!
//! 같은 계산이 두 가지 상호 교환 가능한 모드로 구현됩니다:
//! 긴 이력 전체를 처리하는 [`BulkIndicators`]와 정확히 60개의 종가를
//! 받는 [`ManualIndicators`]. 두 구현은 겹치는 구간에서 수치적으로
//! 일치해야 하며, 이는 테스트로 검증됩니다.
//!
//! # 사용 예시
//!
//! ```ignore
//! use stockcast_analytics::indicators::{BulkIndicators, IndicatorAlgorithm, RsiParams};
//!
//! let engine = BulkIndicators::new();
//! let rsi = engine.rsi(&closes, RsiParams::default())?;
//! ```

pub mod bulk;
pub mod incremental;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bulk::BulkIndicators;
pub use incremental::ManualIndicators;

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("Insufficient data: required {required}, provided {provided}")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9). MACD 라인만 소비되지만 표준
    /// 파라미터 집합의 일부로 유지됩니다.
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl MacdParams {
    /// 파라미터 불변식 검증.
    pub fn validate(&self) -> IndicatorResult<()> {
        if self.fast_period == 0 || self.slow_period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "EMA period must be greater than zero".to_string(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(IndicatorError::InvalidParameter(format!(
                "fast period ({}) must be shorter than slow period ({})",
                self.fast_period, self.slow_period
            )));
        }
        Ok(())
    }
}

/// 지표 알고리즘 capability.
///
/// 입력 행마다 하나의 값을 내는 RSI/MACD 계산의 단일 인터페이스입니다.
/// 워밍업 구간처럼 아직 정의되지 않은 행은 `None`으로 표시되며, 채움
/// 정책은 [`crate::series::IndicatorSeries`]가 적용합니다.
pub trait IndicatorAlgorithm {
    /// RSI 계산. 결과 길이는 입력 길이와 같습니다.
    fn rsi(&self, closes: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>>;

    /// MACD 라인 계산. 결과 길이는 입력 길이와 같습니다.
    fn macd(&self, closes: &[f64], params: MacdParams) -> IndicatorResult<Vec<Option<f64>>>;
}

/// 평균 상승/하락폭에서 RSI 값 하나를 계산.
///
/// 평균 하락폭이 0이면 분모가 사라지므로 정책으로 값을 정의한다:
/// 상승폭도 0인 평탄 구간은 중립값 50, 순수 상승 구간은 포화값 100.
pub(crate) fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// 가격 벡터에서 상승폭/하락폭 벡터 계산.
pub(crate) fn gains_losses(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut gains = Vec::with_capacity(closes.len().saturating_sub(1));
    let mut losses = Vec::with_capacity(closes.len().saturating_sub(1));
    for pair in closes.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gains.push(delta);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-delta);
        }
    }
    (gains, losses)
}
