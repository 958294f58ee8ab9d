//! Manual(incremental) 모드 지표 계산.
//!
//! 기존 지표 컬럼 없이 정확히 60개의 종가만 주어졌을 때 사용하는
//! 구현입니다. bulk 모드와 겹치는 구간에서 수치적으로 호환되어야
//! 합니다.
//!
//! - **RSI**: 첫 `period`개 델타에서 평균 상승/하락폭을 시드하고, 첫
//!   `period`개 항목은 정확히 50.0으로 둔 뒤 Wilder 점화식으로
//!   갱신합니다.
//! - **MACD**: 첫 종가로 시드된 span EMA (`k = 2/(n+1)`) 두 개의 차.
//!   시그널 라인은 하류에서 필요 없으므로 계산하지 않습니다.
//!
//! 모든 행이 값을 가지므로 워밍업 채움이 필요 없습니다.

use super::{
    gains_losses, rsi_from_averages, IndicatorAlgorithm, IndicatorError, IndicatorResult,
    MacdParams, RsiParams,
};

/// 60포인트 윈도우용 수동 지표 계산기.
#[derive(Debug, Default)]
pub struct ManualIndicators;

impl ManualIndicators {
    /// 새로운 manual 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 첫 값으로 시드된 span EMA.
    ///
    /// EMA = (현재가 × k) + (이전 EMA × (1 − k)), k = 2 / (period + 1)
    fn ema_span(closes: &[f64], period: usize) -> Vec<f64> {
        let k = 2.0 / (period as f64 + 1.0);
        let mut result = Vec::with_capacity(closes.len());
        let mut prev = closes[0];
        result.push(prev);
        for &price in &closes[1..] {
            prev = price * k + prev * (1.0 - k);
            result.push(prev);
        }
        result
    }
}

impl IndicatorAlgorithm for ManualIndicators {
    /// RSI 계산 (점화식 방식).
    ///
    /// # 반환
    /// 입력과 같은 길이. 처음 `period`개는 정확히 50.0, 이후 0−100 사이 값.
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

        // 워밍업 구간 기본값은 중립 50.0
        let mut result = vec![Some(50.0); closes.len()];

        let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
        let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
        result[period] = Some(rsi_from_averages(avg_gain, avg_loss));

        let p = period as f64;
        for i in period + 1..closes.len() {
            avg_gain = (avg_gain * (p - 1.0) + gains[i - 1]) / p;
            avg_loss = (avg_loss * (p - 1.0) + losses[i - 1]) / p;
            result[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        }

        Ok(result)
    }

    /// MACD 라인 계산 (EMA(fast) − EMA(slow)).
    ///
    /// # 반환
    /// 입력과 같은 길이, 모든 행에 값이 있음.
    fn macd(&self, closes: &[f64], params: MacdParams) -> IndicatorResult<Vec<Option<f64>>> {
        params.validate()?;

        if closes.is_empty() {
            return Err(IndicatorError::InsufficientData {
                required: 1,
                provided: 0,
            });
        }

        let fast = Self::ema_span(closes, params.fast_period);
        let slow = Self::ema_span(closes, params.slow_period);

        Ok(fast
            .iter()
            .zip(slow.iter())
            .map(|(f, s)| Some(f - s))
            .collect())
    }
}
