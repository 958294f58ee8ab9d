//! 정규화/역정규화 계약.
//!
//! 피처 윈도우를 모델이 기대하는 스케일로 매핑하고, 모델의 스칼라
//! 출력을 실제 가격으로 되돌립니다. 컬럼별로 독립적으로 변환합니다:
//!
//! - **Close**: `(close − min) / (max − min)` — 학습 시점과 동일한 고정
//!   스케일러 경계 사용. 역변환이 정확히 원복되어야 하는 유일한 채널.
//! - **RSI**: `rsi / 100` — 구성상 이미 [0, 100]에 갇혀 있음.
//! - **MACD**: 현재 윈도우의 최대 절대값 `m`으로 `v/(2m) + 0.5` 센터링.
//!   `m == 0`(전부 0)이면 그대로 둠. MACD의 자연 범위는 티커와 기간마다
//!   다르므로 영속 통계 없이 값을 가두는 유일한 방법이 윈도우 상대
//!   스케일링이다. 같은 절대값이 윈도우마다 다르게 정규화되므로 티커 간
//!   비교에는 쓸 수 없다.

use crate::window::{FeatureWindow, WindowError};
use stockcast_core::ScalerParams;

/// 피처 윈도우 정규화기.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    scaler: ScalerParams,
}

impl Normalizer {
    /// 호출자가 공급한 스케일러 경계로 정규화기 생성.
    pub fn new(scaler: ScalerParams) -> Self {
        Self { scaler }
    }

    /// 정방향 변환.
    ///
    /// 변환 후 비유한 값이 나타나면 검증 오류로 실패합니다 (조용한
    /// 보정 없음).
    pub fn normalize(&self, window: &FeatureWindow) -> Result<NormalizedWindow, WindowError> {
        let range = self.scaler.range();

        let close: Vec<f64> = window
            .close()
            .iter()
            .map(|c| (c - self.scaler.min) / range)
            .collect();

        let rsi: Vec<f64> = window.rsi().iter().map(|r| r / 100.0).collect();

        // 윈도우 상대 MACD 스케일: m = max(|min|, |max|)
        let m = window
            .macd()
            .iter()
            .fold(0.0f64, |acc, v| acc.max(v.abs()));
        let macd: Vec<f64> = if m == 0.0 {
            window.macd().to_vec()
        } else {
            window.macd().iter().map(|v| v / (2.0 * m) + 0.5).collect()
        };

        for (name, column) in [("close", &close), ("rsi", &rsi), ("macd", &macd)] {
            if let Some(row) = column.iter().position(|v| !v.is_finite()) {
                return Err(WindowError::NonFinite { column: name, row });
            }
        }

        Ok(NormalizedWindow { close, rsi, macd })
    }

    /// 역변환 (Close 채널 전용).
    ///
    /// 모델의 정규화된 스칼라 예측을 실제 가격으로 되돌립니다.
    pub fn denormalize_close(&self, normalized: f64) -> f64 {
        normalized * self.scaler.range() + self.scaler.min
    }
}

/// 정규화된 피처 윈도우.
///
/// 형상 불변식은 [`FeatureWindow`]와 같습니다. 정상 입력에서 Close와
/// RSI는 [0, 1], MACD는 `m > 0`일 때 [0, 1]에 들어갑니다. 범위를
/// 벗어난 값은 오류가 아니라 비정상 입력의 신호일 뿐입니다.
#[derive(Debug, Clone)]
pub struct NormalizedWindow {
    close: Vec<f64>,
    rsi: Vec<f64>,
    macd: Vec<f64>,
}

impl NormalizedWindow {
    /// 정규화된 종가 채널.
    pub fn close(&self) -> &[f64] {
        &self.close
    }

    /// 정규화된 RSI 채널.
    pub fn rsi(&self) -> &[f64] {
        &self.rsi
    }

    /// 정규화된 MACD 채널.
    pub fn macd(&self) -> &[f64] {
        &self.macd
    }

    /// 행 수.
    pub fn len(&self) -> usize {
        self.close.len()
    }

    /// 행이 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// 모델 입력용 행 우선(f32) 평탄화: [c₀, r₀, m₀, c₁, r₁, m₁, …].
    pub fn to_input(&self) -> Vec<f32> {
        let mut input = Vec::with_capacity(self.close.len() * 3);
        for i in 0..self.close.len() {
            input.push(self.close[i] as f32);
            input.push(self.rsi[i] as f32);
            input.push(self.macd[i] as f32);
        }
        input
    }
}
