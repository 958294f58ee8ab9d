//! 지표 컬럼이 붙은 시계열.
//!
//! 클린 종가 시계열에 행 단위로 RSI/MACD 컬럼을 정렬해 붙이고, 워밍업
//! 구간의 결측을 채우는 정책을 적용합니다: 앞쪽으로 채운 뒤(ffill)
//! 뒤쪽으로 채웁니다(bfill). 즉 선행 결측은 뒤따르는 첫 유효값을
//! 받습니다. 채움 후에도 결측이 남은 행은 제거됩니다.

use crate::indicators::{IndicatorError, IndicatorResult};

/// 종가 + RSI + MACD 컬럼을 가진 시계열.
///
/// 불변식: 세 컬럼의 길이는 항상 같습니다.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    close: Vec<f64>,
    rsi: Vec<Option<f64>>,
    macd: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// 컬럼들로부터 시계열 생성. 길이가 다르면 실패합니다.
    pub fn new(
        close: Vec<f64>,
        rsi: Vec<Option<f64>>,
        macd: Vec<Option<f64>>,
    ) -> IndicatorResult<Self> {
        if rsi.len() != close.len() || macd.len() != close.len() {
            return Err(IndicatorError::CalculationError(format!(
                "column length mismatch: close={}, rsi={}, macd={}",
                close.len(),
                rsi.len(),
                macd.len()
            )));
        }
        Ok(Self { close, rsi, macd })
    }

    /// 행 수.
    pub fn len(&self) -> usize {
        self.close.len()
    }

    /// 행이 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// 종가 컬럼.
    pub fn close(&self) -> &[f64] {
        &self.close
    }

    /// RSI 컬럼.
    pub fn rsi(&self) -> &[Option<f64>] {
        &self.rsi
    }

    /// MACD 컬럼.
    pub fn macd(&self) -> &[Option<f64>] {
        &self.macd
    }

    /// 워밍업 결측 채움: 컬럼별로 ffill 후 bfill.
    pub fn fill_warmup(&mut self) {
        fill_forward_then_backward(&mut self.rsi);
        fill_forward_then_backward(&mut self.macd);
    }

    /// 채움 후에도 지표가 결측인 행 제거.
    pub fn drop_missing(self) -> Self {
        let mut close = Vec::with_capacity(self.close.len());
        let mut rsi = Vec::with_capacity(self.rsi.len());
        let mut macd = Vec::with_capacity(self.macd.len());

        for i in 0..self.close.len() {
            if self.rsi[i].is_some() && self.macd[i].is_some() {
                close.push(self.close[i]);
                rsi.push(self.rsi[i]);
                macd.push(self.macd[i]);
            }
        }

        Self { close, rsi, macd }
    }

    /// 모든 행에 지표 값이 있는지 확인.
    pub fn is_complete(&self) -> bool {
        self.rsi.iter().all(|v| v.is_some()) && self.macd.iter().all(|v| v.is_some())
    }
}

/// 앞쪽으로 채운 뒤 뒤쪽으로 채움.
fn fill_forward_then_backward(column: &mut [Option<f64>]) {
    let mut last = None;
    for value in column.iter_mut() {
        match value {
            Some(v) => last = Some(*v),
            None => *value = last,
        }
    }

    let mut next = None;
    for value in column.iter_mut().rev() {
        match value {
            Some(v) => next = Some(*v),
            None => *value = next,
        }
    }
}
