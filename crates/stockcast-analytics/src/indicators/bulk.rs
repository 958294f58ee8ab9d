//! Bulk(라이브러리) 모드 지표 계산.
//!
//! 수집 단계가 확보한 긴 이력 전체에 대해 지표를 계산합니다.
//!
//! - **RSI**: Wilder smoothing. 첫 `period`개 상승/하락폭의 단순 평균으로
//!   시드를 만들고, 이후 `(prev × (period−1) + cur) / period` 점화식으로
//!   갱신합니다. 워밍업 구간(인덱스 `period` 미만)은 `None`입니다.
//! - **MACD**: ta-rs의 MACD 구현 (span smoothing `k = 2/(n+1)`, 첫 종가로
//!   시드된 EMA). 라인 값만 취하며, 장기 EMA 기간 이전 행은 `None`으로
//!   표시해 워밍업 채움 정책에 맡깁니다.
//!
//! ta-rs의 RSI는 span smoothing을 사용하므로 Wilder 정의와 수치가
//! 달라, RSI는 직접 계산합니다.

use ta::indicators::MovingAverageConvergenceDivergence;
use ta::Next;

use super::{
    gains_losses, rsi_from_averages, IndicatorAlgorithm, IndicatorError, IndicatorResult,
    MacdParams, RsiParams,
};

/// 전체 이력에 대한 지표 계산기.
#[derive(Debug, Default)]
pub struct BulkIndicators;

impl BulkIndicators {
    /// 새로운 bulk 계산기 생성.
    pub fn new() -> Self {
        Self
    }
}

impl IndicatorAlgorithm for BulkIndicators {
    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 − (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
    ///
    /// # 반환
    /// 입력과 같은 길이. 처음 `period`개는 `None`, 이후 0−100 사이 값.
    fn rsi(&self, closes: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "RSI period must be greater than zero".to_string(),
            ));
        }
        if closes.len() < period + 1 {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: closes.len(),
            });
        }

        let (gains, losses) = gains_losses(closes);

        let mut result = vec![None; closes.len()];

        // 시드: 첫 period개 델타의 단순 평균
        let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
        let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
        result[period] = Some(rsi_from_averages(avg_gain, avg_loss));

        // Wilder 점화식
        let p = period as f64;
        for i in period + 1..closes.len() {
            avg_gain = (avg_gain * (p - 1.0) + gains[i - 1]) / p;
            avg_loss = (avg_loss * (p - 1.0) + losses[i - 1]) / p;
            result[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        }

        Ok(result)
    }

    /// MACD 라인 계산 (단기 EMA − 장기 EMA).
    ///
    /// # 반환
    /// 입력과 같은 길이. 처음 `slow_period − 1`개는 `None`.
    fn macd(&self, closes: &[f64], params: MacdParams) -> IndicatorResult<Vec<Option<f64>>> {
        params.validate()?;

        if closes.len() < params.slow_period {
            return Err(IndicatorError::InsufficientData {
                required: params.slow_period,
                provided: closes.len(),
            });
        }

        let mut macd = MovingAverageConvergenceDivergence::new(
            params.fast_period,
            params.slow_period,
            params.signal_period,
        )
        .map_err(|e| IndicatorError::InvalidParameter(e.to_string()))?;

        let warmup = params.slow_period - 1;
        let result = closes
            .iter()
            .enumerate()
            .map(|(i, &price)| {
                let out = macd.next(price);
                if i < warmup {
                    None
                } else {
                    Some(out.macd)
                }
            })
            .collect();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rising_prices(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_rsi_warmup_head_is_none() {
        let engine = BulkIndicators::new();
        let rsi = engine.rsi(&rising_prices(30), RsiParams::default()).unwrap();

        assert_eq!(rsi.len(), 30);
        assert!(rsi[..14].iter().all(|v| v.is_none()));
        assert!(rsi[14..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_rsi_saturates_on_pure_uptrend() {
        let engine = BulkIndicators::new();
        let rsi = engine.rsi(&rising_prices(40), RsiParams::default()).unwrap();

        // 하락폭이 전혀 없으므로 모든 정의된 값이 100
        for value in rsi.iter().flatten() {
            assert_eq!(*value, 100.0);
        }
    }

    #[test]
    fn test_rsi_flat_series_is_neutral() {
        let engine = BulkIndicators::new();
        let flat = vec![100.0; 40];
        let rsi = engine.rsi(&flat, RsiParams::default()).unwrap();

        for value in rsi.iter().flatten() {
            assert_eq!(*value, 50.0);
        }
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let engine = BulkIndicators::new();
        let result = engine.rsi(&rising_prices(10), RsiParams::default());
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 15, .. })
        ));
    }

    #[test]
    fn test_macd_warmup_and_uptrend_sign() {
        let engine = BulkIndicators::new();
        let macd = engine
            .macd(&rising_prices(60), MacdParams::default())
            .unwrap();

        assert_eq!(macd.len(), 60);
        assert!(macd[..25].iter().all(|v| v.is_none()));
        // 상승 추세에서는 단기 EMA가 장기 EMA보다 크거나 같다
        for value in macd.iter().flatten() {
            assert!(*value >= 0.0);
        }
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let engine = BulkIndicators::new();
        let flat = vec![100.0; 60];
        let macd = engine.macd(&flat, MacdParams::default()).unwrap();

        for value in macd.iter().flatten() {
            assert!(value.abs() < 1e-12);
        }
    }

    proptest! {
        /// 임의의 유한한 가격 시계열에서 RSI는 항상 [0, 100] 안에 있다.
        #[test]
        fn prop_rsi_bounded(prices in proptest::collection::vec(1.0f64..1000.0, 20..120)) {
            let engine = BulkIndicators::new();
            let rsi = engine.rsi(&prices, RsiParams::default()).unwrap();
            for value in rsi.iter().flatten() {
                prop_assert!(*value >= 0.0);
                prop_assert!(*value <= 100.0);
            }
        }
    }
}
