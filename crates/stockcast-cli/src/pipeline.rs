//! 추론 오케스트레이터.
//!
//! 수집 → 지표 → 윈도우 → 정규화 → 추론 → 보고의 단계를 연결합니다.
//! 입력은 둘 중 하나입니다:
//!
//! - 티커 심볼: 전체 수집 파이프라인을 구동하고 bulk 모드로 지표 계산
//! - 60개 숫자의 배열: 60개 종가(manual 지표 모드) 또는 60개
//!   [close, rsi, macd] 트리플(지표 계산 생략)
//!
//! 모든 단계 실패는 와이어 에러 코드를 가진 [`PipelineError`]로
//! 변환되어 호출자에게 한 번만 보고됩니다.

use serde_json::Value;
use tracing::debug;

use crate::output::{PredictionPayload, SeriesPayload};
use stockcast_analytics::indicators::{
    BulkIndicators, IndicatorAlgorithm, MacdParams, ManualIndicators, RsiParams,
};
use stockcast_analytics::ml::{MlResult, OnnxPredictor, PredictorConfig, PricePredictor};
use stockcast_analytics::normalize::{NormalizedWindow, Normalizer};
use stockcast_analytics::series::IndicatorSeries;
use stockcast_analytics::window::FeatureWindow;
use stockcast_core::{PipelineError, PipelineResult, ScalerParams, MODEL_TIMESTEPS};
use stockcast_data::AcquisitionStrategy;

/// 한 번의 추론 요청.
#[derive(Debug, Clone)]
pub struct PredictionRequest {
    /// 입력 (티커 또는 직접 데이터).
    pub input: RequestInput,
    /// 학습 시점 종가 스케일러 경계.
    pub scaler: ScalerParams,
}

/// 추론 입력.
#[derive(Debug, Clone)]
pub enum RequestInput {
    /// 티커 심볼. 수집 파이프라인을 구동합니다.
    Ticker(String),
    /// 60개 숫자(또는 60×3 트리플)의 원시 JSON 배열.
    Data(String),
}

/// 파이프라인 실행.
///
/// 성공하면 결과 페이로드를, 실패하면 와이어 코드를 가진 에러를
/// 반환합니다. ACQUIRE 이후의 어떤 단계도 재시도되지 않습니다.
pub async fn run(
    request: PredictionRequest,
    strategy: &AcquisitionStrategy,
    predictor: &mut dyn PricePredictor,
) -> PipelineResult<PredictionPayload> {
    // ACQUIRE + INDICATE + WINDOW
    let window = match &request.input {
        RequestInput::Ticker(ticker) => acquire_and_indicate(ticker, strategy).await?,
        RequestInput::Data(raw) => window_from_data(raw)?,
    };

    // NORMALIZE
    let normalizer = Normalizer::new(request.scaler);
    let normalized = normalizer
        .normalize(&window)
        .map_err(|e| PipelineError::DataValidation(e.to_string()))?;

    // INFER: 외부 모델과의 유일한 접점
    let normalized_pred = predictor
        .predict(&normalized)
        .map_err(|e| PipelineError::Runtime(format!("Model inference failed: {}", e)))?;
    let predicted = normalizer.denormalize_close(normalized_pred as f64);

    debug!(
        "inference complete: normalized={:.6}, predicted={:.4}",
        normalized_pred, predicted
    );

    // REPORT: 원본(비정규화) 윈도우를 그대로 에코
    Ok(PredictionPayload {
        predicted,
        normalized_pred: normalized_pred as f64,
        timesteps: MODEL_TIMESTEPS,
        last_close: window.last_close(),
        series: SeriesPayload {
            close: window.close().to_vec(),
            rsi: window.rsi().to_vec(),
            macd: window.macd().to_vec(),
        },
    })
}

/// 티커 경로: 수집 캐스케이드 후 bulk 모드로 지표 계산.
async fn acquire_and_indicate(
    ticker: &str,
    strategy: &AcquisitionStrategy,
) -> PipelineResult<FeatureWindow> {
    if ticker.trim().is_empty() {
        return Err(PipelineError::DataFetch(
            "Invalid ticker symbol provided.".to_string(),
        ));
    }
    let ticker = ticker.trim().to_uppercase();

    let series = strategy
        .acquire(&ticker)
        .await
        .map_err(|e| PipelineError::DataFetch(e.to_string()))?;

    let closes = series.clean_closes();
    debug!("acquired {} clean closes for {}", closes.len(), ticker);

    let engine = BulkIndicators::new();
    let rsi = engine.rsi(&closes, RsiParams::default()).map_err(|e| {
        PipelineError::DataFetch(format!(
            "Failed to calculate indicators for '{}': {}",
            ticker, e
        ))
    })?;
    let macd = engine.macd(&closes, MacdParams::default()).map_err(|e| {
        PipelineError::DataFetch(format!(
            "Failed to calculate indicators for '{}': {}",
            ticker, e
        ))
    })?;

    let mut series = IndicatorSeries::new(closes, rsi, macd).map_err(|e| {
        PipelineError::DataFetch(format!(
            "Failed to calculate indicators for '{}': {}",
            ticker, e
        ))
    })?;
    series.fill_warmup();
    let series = series.drop_missing();

    if series.len() < MODEL_TIMESTEPS {
        return Err(PipelineError::DataFetch(format!(
            "Insufficient clean data for '{}' after indicator calculation. \
             Need at least {} days, got {}",
            ticker,
            MODEL_TIMESTEPS,
            series.len()
        )));
    }

    FeatureWindow::from_series(&series).map_err(|e| {
        PipelineError::DataFetch(format!("Invalid data found for '{}': {}", ticker, e))
    })
}

/// 직접 입력 경로: 원시 JSON을 60행 윈도우로 변환.
fn window_from_data(raw: &str) -> PipelineResult<FeatureWindow> {
    let value: Value = serde_json::from_str(raw).map_err(|_| {
        PipelineError::DataParse("Invalid JSON format for input data.".to_string())
    })?;

    let rows = value.as_array().ok_or_else(|| {
        PipelineError::DataValidation(format!(
            "Input must be a list of {} numbers",
            MODEL_TIMESTEPS
        ))
    })?;

    if rows.len() != MODEL_TIMESTEPS {
        return Err(PipelineError::DataValidation(format!(
            "Input must be a list of {} numbers, got {}",
            MODEL_TIMESTEPS,
            rows.len()
        )));
    }

    if rows.first().map(|v| v.is_array()).unwrap_or(false) {
        window_from_triples(rows)
    } else {
        window_from_closes(rows)
    }
}

/// JSON 값 하나를 f64로. 숫자가 아니면 NaN으로 두어 유한성 검증에
/// 걸리게 한다 (JSON에는 NaN 리터럴이 없으므로 null 등이 그 역할).
fn value_to_f64(value: &Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

/// 60×3 트리플 입력: 지표 계산을 완전히 생략.
fn window_from_triples(rows: &[Value]) -> PipelineResult<FeatureWindow> {
    let mut close = Vec::with_capacity(MODEL_TIMESTEPS);
    let mut rsi = Vec::with_capacity(MODEL_TIMESTEPS);
    let mut macd = Vec::with_capacity(MODEL_TIMESTEPS);

    for row in rows {
        let triple = row.as_array().filter(|t| t.len() == 3).ok_or_else(|| {
            PipelineError::DataValidation(format!(
                "Multivariate input must be shape [{},3]",
                MODEL_TIMESTEPS
            ))
        })?;
        close.push(value_to_f64(&triple[0]));
        rsi.push(value_to_f64(&triple[1]));
        macd.push(value_to_f64(&triple[2]));
    }

    FeatureWindow::from_columns(close, rsi, macd).map_err(|_| {
        PipelineError::DataValidation(
            "Input contains invalid numbers (NaN or infinity)".to_string(),
        )
    })
}

/// 60개 종가 입력: manual 모드로 지표 계산.
fn window_from_closes(rows: &[Value]) -> PipelineResult<FeatureWindow> {
    let closes: Vec<f64> = rows.iter().map(value_to_f64).collect();

    if closes.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::DataValidation(
            "Input contains invalid numbers (NaN or infinity)".to_string(),
        ));
    }

    let engine = ManualIndicators::new();
    let rsi = engine.rsi(&closes, RsiParams::default()).map_err(|e| {
        PipelineError::DataValidation(format!("Failed to calculate indicators: {}", e))
    })?;
    let macd = engine.macd(&closes, MacdParams::default()).map_err(|e| {
        PipelineError::DataValidation(format!("Failed to calculate indicators: {}", e))
    })?;

    // manual 모드는 모든 행에 값을 낸다
    let rsi: Vec<f64> = rsi.into_iter().flatten().collect();
    let macd: Vec<f64> = macd.into_iter().flatten().collect();
    if rsi.len() != closes.len() || macd.len() != closes.len() {
        return Err(PipelineError::DataValidation(format!(
            "Need {} points for manual input after indicator calculation.",
            MODEL_TIMESTEPS
        )));
    }

    FeatureWindow::from_columns(closes, rsi, macd).map_err(|_| {
        PipelineError::DataValidation(
            "Input contains invalid numbers (NaN or infinity)".to_string(),
        )
    })
}

/// 첫 추론 시점에 모델을 로드하는 predictor.
///
/// 데이터 검증이 모델 로드보다 먼저 실패할 수 있도록, INFER 단계에
/// 도달하기 전에는 모델 파일을 건드리지 않습니다.
pub struct LazyOnnxPredictor {
    config: PredictorConfig,
    inner: Option<OnnxPredictor>,
}

impl LazyOnnxPredictor {
    /// 주어진 설정으로 lazy predictor 생성.
    pub fn new(config: PredictorConfig) -> Self {
        Self {
            config,
            inner: None,
        }
    }
}

impl PricePredictor for LazyOnnxPredictor {
    fn predict(&mut self, window: &NormalizedWindow) -> MlResult<f32> {
        if self.inner.is_none() {
            let loaded = OnnxPredictor::load(self.config.clone())?;
            self.inner = Some(loaded);
        }
        match self.inner.as_mut() {
            Some(predictor) => predictor.predict(window),
            None => Err(stockcast_analytics::ml::MlError::ModelLoad(
                "predictor unavailable".to_string(),
            )),
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
