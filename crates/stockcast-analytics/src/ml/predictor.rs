//! ONNX 모델을 사용한 가격 예측.
//!
//! 이 모듈은 ONNX Runtime 기반 가격 prediction을 제공합니다. 모델은
//! 별도로 학습되어야 하며 (예: Python/Keras 사용) ONNX 형식으로
//! 내보내야 합니다.

use crate::ml::{MlError, MlResult};
use crate::normalize::NormalizedWindow;
use ort::session::Session;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use stockcast_core::{FEATURE_CHANNELS, MODEL_TIMESTEPS};

/// ONNX predictor 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// ONNX 모델 파일 경로
    pub model_path: PathBuf,
    /// 예상 입력 타임스텝 수
    pub timesteps: usize,
    /// 예상 입력 채널 수
    pub channels: usize,
    /// 로깅/식별을 위한 모델 이름
    pub model_name: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/price_lstm.onnx"),
            timesteps: MODEL_TIMESTEPS,
            channels: FEATURE_CHANNELS,
            model_name: "price_lstm".to_string(),
        }
    }
}

impl PredictorConfig {
    /// 주어진 모델 경로로 새 predictor 설정 생성.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    /// 모델 이름 설정.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }
}

/// 다형성을 가능하게 하는 predictor trait.
pub trait PricePredictor: Send {
    /// 정규화 윈도우에서 정규화된 스칼라 예측.
    fn predict(&mut self, window: &NormalizedWindow) -> MlResult<f32>;

    /// 모델 이름 반환.
    fn model_name(&self) -> &str;
}

/// ONNX 기반 가격 predictor.
///
/// ONNX 모델을 로드하고 추론을 수행합니다. 모델은 다음을 가져야 합니다:
/// - 입력: [batch_size, timesteps, channels] 형태의 float32 텐서
/// - 출력: [batch_size, 1] 형태의 float32 텐서 (정규화된 예측)
pub struct OnnxPredictor {
    session: Session,
    config: PredictorConfig,
}

impl OnnxPredictor {
    /// 지정된 경로에서 ONNX 모델 로드.
    pub fn load(config: PredictorConfig) -> MlResult<Self> {
        let path = &config.model_path;

        if !path.exists() {
            return Err(MlError::ModelLoad(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        info!("Loading ONNX model from: {}", path.display());

        let session = Session::builder()
            .map_err(|e| MlError::ModelLoad(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| MlError::ModelLoad(format!("Failed to set optimization level: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| MlError::ModelLoad(format!("Failed to load model: {}", e)))?;

        info!("ONNX model loaded successfully: {}", config.model_name);

        Ok(Self { session, config })
    }

    /// 기본 설정으로 파일 경로에서 모델 로드.
    pub fn from_file(path: impl AsRef<Path>) -> MlResult<Self> {
        let config = PredictorConfig::new(path.as_ref());
        Self::load(config)
    }

    /// predictor 설정 반환.
    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// 정규화 윈도우에서 정규화된 스칼라 예측.
    pub fn predict(&mut self, window: &NormalizedWindow) -> MlResult<f32> {
        // 입력 형상 검증
        if window.len() != self.config.timesteps {
            return Err(MlError::InvalidInput(format!(
                "Expected {} timesteps, got {}",
                self.config.timesteps,
                window.len()
            )));
        }

        // 입력 텐서 생성 [1, timesteps, channels]
        let input_data = window.to_input();
        let input_shape = [
            1i64,
            self.config.timesteps as i64,
            self.config.channels as i64,
        ];

        let input_tensor =
            ort::value::Tensor::from_array((input_shape, input_data.into_boxed_slice()))
                .map_err(|e| MlError::Inference(format!("Failed to create input tensor: {}", e)))?;

        // 입력으로 추론 실행
        let outputs = self
            .session
            .run(ort::inputs!["input" => input_tensor])
            .map_err(|e| MlError::Inference(format!("Inference failed: {}", e)))?;

        // 첫 번째 출력 가져오기 ("output" 이름 또는 첫 번째 사용 가능한 것)
        let output_name = outputs
            .iter()
            .next()
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| MlError::Inference("No output tensor found".to_string()))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| MlError::Inference("Failed to get output by name".to_string()))?;

        // 텐서 데이터 추출 - (&Shape, &[f32]) 반환
        let (_, output_slice) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| MlError::Inference(format!("Failed to extract output tensor: {}", e)))?;

        let normalized_pred = *output_slice
            .first()
            .ok_or_else(|| MlError::Inference("Empty output tensor".to_string()))?;

        // session에 대한 가변 차용을 해제하기 위해 출력 드롭
        drop(outputs);

        debug!(
            "Prediction: {:.6} (model: {})",
            normalized_pred, self.config.model_name
        );

        Ok(normalized_pred)
    }
}

/// 실제 모델 파일 없이 테스트하기 위한 mock predictor.
pub struct MockPredictor {
    /// 반환할 고정 예측값
    pub fixed_prediction: Option<f32>,
    /// 지금까지의 predict 호출 수
    pub calls: usize,
}

impl MockPredictor {
    /// 새 mock predictor 생성.
    pub fn new() -> Self {
        Self {
            fixed_prediction: None,
            calls: 0,
        }
    }

    /// 항상 반환할 고정 예측값 설정.
    pub fn with_fixed_prediction(mut self, prediction: f32) -> Self {
        self.fixed_prediction = Some(prediction);
        self
    }

    /// mock 로직으로 예측.
    pub fn predict(&mut self, window: &NormalizedWindow) -> MlResult<f32> {
        self.calls += 1;

        if let Some(pred) = self.fixed_prediction {
            return Ok(pred);
        }

        if window.is_empty() {
            return Err(MlError::InvalidInput("Empty window".to_string()));
        }

        // 간단한 휴리스틱: 정규화된 종가 채널의 평균
        let mean = window.close().iter().sum::<f64>() / window.close().len() as f64;
        Ok(mean as f32)
    }
}

impl Default for MockPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl PricePredictor for OnnxPredictor {
    fn predict(&mut self, window: &NormalizedWindow) -> MlResult<f32> {
        OnnxPredictor::predict(self, window)
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

impl PricePredictor for MockPredictor {
    fn predict(&mut self, window: &NormalizedWindow) -> MlResult<f32> {
        MockPredictor::predict(self, window)
    }

    fn model_name(&self) -> &str {
        "mock_predictor"
    }
}
