//! 가격 시계열 도메인 타입.
//!
//! 파이프라인이 주고받는 값 객체를 정의합니다:
//! - [`DailyQuote`]: 일별 종가 한 행 (결측 가능)
//! - [`PriceSeries`]: 날짜 오름차순 시계열 (RawSeries)
//! - [`ScalerParams`]: 학습 시점의 종가 min/max 스케일러

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 모델 입력 윈도우의 타임스텝 수.
pub const MODEL_TIMESTEPS: usize = 60;

/// 피처 채널 수 (Close, RSI, MACD).
pub const FEATURE_CHANNELS: usize = 3;

/// 지표 계산 전 요구되는 최소 관측치 수.
pub const MIN_OBSERVATIONS: usize = 60;

/// 일별 종가 한 행.
///
/// 업스트림 소스가 해당 일자의 종가를 제공하지 못하면 `close`는 `None`이며,
/// 클리닝 단계에서 제거됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyQuote {
    /// 거래일.
    pub date: NaiveDate,
    /// 종가. 결측이면 `None`.
    pub close: Option<f64>,
}

impl DailyQuote {
    /// 새 행 생성.
    pub fn new(date: NaiveDate, close: Option<f64>) -> Self {
        Self { date, close }
    }

    /// 유한한 양수 종가가 존재하는지 확인.
    pub fn has_clean_close(&self) -> bool {
        matches!(self.close, Some(c) if c.is_finite() && c > 0.0)
    }
}

/// 티커 하나의 일별 종가 시계열.
///
/// 생성자에서 날짜 오름차순 정렬과 중복 일자 제거를 보장하며, 반환된
/// 이후에는 불변으로 취급됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// 티커 심볼 (표준화된 형태).
    pub ticker: String,
    rows: Vec<DailyQuote>,
}

impl PriceSeries {
    /// 행들로부터 시계열 생성.
    ///
    /// 날짜 오름차순으로 정렬하고, 같은 일자가 여러 번 나타나면 먼저
    /// 나타난 행만 유지합니다.
    pub fn new(ticker: impl Into<String>, mut rows: Vec<DailyQuote>) -> Self {
        rows.sort_by_key(|r| r.date);
        rows.dedup_by_key(|r| r.date);
        Self {
            ticker: ticker.into(),
            rows,
        }
    }

    /// 전체 행 수 (결측 포함).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 행이 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 행 슬라이스 반환.
    pub fn rows(&self) -> &[DailyQuote] {
        &self.rows
    }

    /// 결측/비유한 값을 제거한 종가 벡터 (CleanSeries 뷰).
    pub fn clean_closes(&self) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.has_clean_close())
            .map(|r| r.close.unwrap_or_default())
            .collect()
    }

    /// 클린 종가 개수.
    pub fn clean_len(&self) -> usize {
        self.rows.iter().filter(|r| r.has_clean_close()).count()
    }
}

/// 학습 시점에 사용된 종가 Min-Max 스케일러 파라미터.
///
/// 추론 시 동일한 정규화를 재현하기 위해 호출자가 공급합니다.
/// 불변식: 두 값 모두 유한하고 `max > min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// 학습 데이터의 최소 종가.
    pub min: f64,
    /// 학습 데이터의 최대 종가.
    pub max: f64,
}

impl ScalerParams {
    /// 검증된 스케일러 파라미터 생성.
    pub fn new(min: f64, max: f64) -> Result<Self, String> {
        if !min.is_finite() || !max.is_finite() {
            return Err(format!(
                "scaler bounds must be finite, got min={}, max={}",
                min, max
            ));
        }
        if max <= min {
            return Err(format!(
                "scaler max must be greater than min, got min={}, max={}",
                min, max
            ));
        }
        Ok(Self { min, max })
    }

    /// 정규화 분모 `max - min`.
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}
