//! 고정 형상 피처 윈도우.
//!
//! 지표 시계열의 마지막 60행을 (Close, RSI, MACD) 3채널 행렬로
//! 패키징합니다. 180개 스칼라 전부가 유한해야 하며, 정규화 전의 원본
//! 윈도우는 시각화 에코를 위해 그대로 유지됩니다.

use thiserror::Error;

use crate::series::IndicatorSeries;
use stockcast_core::MODEL_TIMESTEPS;

/// 피처 윈도우 구성/검증 오류.
#[derive(Debug, Error)]
pub enum WindowError {
    /// 행 수 부족/불일치
    #[error("Expected {expected} rows, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// 채움 후에도 남은 결측 지표
    #[error("Missing indicator value at row {row}")]
    Missing { row: usize },

    /// NaN/Infinity 검출
    #[error("Non-finite value in {column} column at row {row}")]
    NonFinite { column: &'static str, row: usize },
}

/// 마지막 60행의 (Close, RSI, MACD) 피처 윈도우.
///
/// 모델과 정규화기가 소비하는 단위이며, 생성 시점에 모든 값의 유한성이
/// 검증됩니다.
#[derive(Debug, Clone)]
pub struct FeatureWindow {
    close: Vec<f64>,
    rsi: Vec<f64>,
    macd: Vec<f64>,
}

impl FeatureWindow {
    /// 지표 시계열의 마지막 60행으로 윈도우 생성.
    pub fn from_series(series: &IndicatorSeries) -> Result<Self, WindowError> {
        if series.len() < MODEL_TIMESTEPS {
            return Err(WindowError::WrongLength {
                expected: MODEL_TIMESTEPS,
                actual: series.len(),
            });
        }

        let start = series.len() - MODEL_TIMESTEPS;
        let close = series.close()[start..].to_vec();

        let mut rsi = Vec::with_capacity(MODEL_TIMESTEPS);
        let mut macd = Vec::with_capacity(MODEL_TIMESTEPS);
        for (offset, i) in (start..series.len()).enumerate() {
            rsi.push(
                series.rsi()[i].ok_or(WindowError::Missing { row: offset })?,
            );
            macd.push(
                series.macd()[i].ok_or(WindowError::Missing { row: offset })?,
            );
        }

        Self::from_columns(close, rsi, macd)
    }

    /// 정확히 60개짜리 컬럼들로 윈도우 생성 (직접 입력 경로).
    ///
    /// 모든 값의 유한성을 검증합니다.
    pub fn from_columns(
        close: Vec<f64>,
        rsi: Vec<f64>,
        macd: Vec<f64>,
    ) -> Result<Self, WindowError> {
        for column in [&close, &rsi, &macd] {
            if column.len() != MODEL_TIMESTEPS {
                return Err(WindowError::WrongLength {
                    expected: MODEL_TIMESTEPS,
                    actual: column.len(),
                });
            }
        }

        for (name, column) in [("close", &close), ("rsi", &rsi), ("macd", &macd)] {
            if let Some(row) = column.iter().position(|v| !v.is_finite()) {
                return Err(WindowError::NonFinite { column: name, row });
            }
        }

        Ok(Self { close, rsi, macd })
    }

    /// 종가 채널.
    pub fn close(&self) -> &[f64] {
        &self.close
    }

    /// RSI 채널.
    pub fn rsi(&self) -> &[f64] {
        &self.rsi
    }

    /// MACD 채널.
    pub fn macd(&self) -> &[f64] {
        &self.macd
    }

    /// 마지막 관측 종가.
    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }
}
