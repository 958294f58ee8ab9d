//! 파이프라인 end-to-end 시나리오 테스트.
//!
//! 실제 모델 파일과 네트워크 없이 mock predictor와 주입된 소스로
//! 전체 흐름을 검증합니다.

use async_trait::async_trait;

use stockcast_analytics::ml::MockPredictor;
use stockcast_cli::pipeline::{run, PredictionRequest, RequestInput};
use stockcast_core::{DailyQuote, PriceSeries, ScalerParams};
use stockcast_data::{
    AcquisitionStrategy, DataSourceError, FetchWindow, MockSheetSource, SeriesSource,
};

/// 항상 네트워크 에러를 내는 라이브 소스.
struct FailingLive;

#[async_trait]
impl SeriesSource for FailingLive {
    fn name(&self) -> &'static str {
        "failing-live"
    }

    fn supports(&self, _ticker: &str) -> bool {
        true
    }

    async fn fetch_daily(
        &self,
        _ticker: &str,
        _window: FetchWindow,
    ) -> Result<PriceSeries, DataSourceError> {
        Err(DataSourceError::Network("connection refused".to_string()))
    }
}

/// 호출되면 테스트를 실패시키는 소스.
struct PanickingSource;

#[async_trait]
impl SeriesSource for PanickingSource {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn supports(&self, _ticker: &str) -> bool {
        true
    }

    async fn fetch_daily(
        &self,
        _ticker: &str,
        _window: FetchWindow,
    ) -> Result<PriceSeries, DataSourceError> {
        panic!("no source access expected for this input");
    }
}

fn offline_strategy() -> AcquisitionStrategy {
    AcquisitionStrategy::with_sources(Box::new(MockSheetSource::new()), Box::new(FailingLive))
}

fn no_network_strategy() -> AcquisitionStrategy {
    AcquisitionStrategy::with_sources(Box::new(PanickingSource), Box::new(PanickingSource))
}

fn scaler_100_200() -> ScalerParams {
    ScalerParams::new(100.0, 200.0).unwrap()
}

fn straight_line_json() -> String {
    let values: Vec<String> = (0..60).map(|i| format!("{:.1}", 100.0 + i as f64)).collect();
    format!("[{}]", values.join(","))
}

#[tokio::test]
async fn test_offline_ticker_end_to_end() {
    let strategy = offline_strategy();
    let mut predictor = MockPredictor::new().with_fixed_prediction(0.5);

    let request = PredictionRequest {
        input: RequestInput::Ticker("AAPL".to_string()),
        scaler: scaler_100_200(),
    };

    let payload = run(request, &strategy, &mut predictor).await.unwrap();

    // 0.5 → 100 + 0.5 × 100 = 150, 느슨한 경계 [95, 205] 안
    assert!((payload.predicted - 150.0).abs() < 1e-9);
    assert!(payload.predicted >= 95.0 && payload.predicted <= 205.0);
    assert_eq!(payload.timesteps, 60);
    assert_eq!(payload.series.close.len(), 60);
    assert_eq!(payload.series.rsi.len(), 60);
    assert_eq!(payload.series.macd.len(), 60);

    // 150→170 추세의 꼬리이므로 마지막 종가는 170 ±5% 부근
    let last = payload.last_close.unwrap();
    assert!(last > 150.0 * 0.95 && last < 170.0 * 1.05);
    assert_eq!(last, *payload.series.close.last().unwrap());

    assert_eq!(predictor.calls, 1);
}

#[tokio::test]
async fn test_lowercase_ticker_standardized() {
    let strategy = offline_strategy();
    let mut predictor = MockPredictor::new().with_fixed_prediction(0.2);

    let request = PredictionRequest {
        input: RequestInput::Ticker("  aapl ".to_string()),
        scaler: scaler_100_200(),
    };

    let payload = run(request, &strategy, &mut predictor).await.unwrap();
    assert!((payload.predicted - 120.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_straight_line_closes_manual_indicators() {
    let strategy = no_network_strategy();
    let mut predictor = MockPredictor::new().with_fixed_prediction(0.4);

    let request = PredictionRequest {
        input: RequestInput::Data(straight_line_json()),
        scaler: scaler_100_200(),
    };

    let payload = run(request, &strategy, &mut predictor).await.unwrap();

    // 상승 직선: fast EMA ≥ slow EMA이므로 MACD는 전 구간 비음수
    for macd in &payload.series.macd {
        assert!(*macd >= 0.0, "MACD must be non-negative, got {}", macd);
    }

    // RSI는 워밍업 50.0 이후 100으로 포화
    for rsi in &payload.series.rsi[..14] {
        assert_eq!(*rsi, 50.0);
    }
    for rsi in &payload.series.rsi[14..] {
        assert_eq!(*rsi, 100.0);
    }

    assert_eq!(payload.last_close, Some(159.0));
}

#[tokio::test]
async fn test_length_59_fails_before_any_work() {
    let strategy = no_network_strategy();
    let mut predictor = MockPredictor::new();

    let values: Vec<String> = (0..59).map(|i| format!("{}", 100 + i)).collect();
    let request = PredictionRequest {
        input: RequestInput::Data(format!("[{}]", values.join(","))),
        scaler: scaler_100_200(),
    };

    let err = run(request, &strategy, &mut predictor).await.unwrap_err();
    assert_eq!(err.code(), "ERROR_DATA_VALIDATION");
    assert!(err.to_string().contains("got 59"));

    // 네트워크도 모델도 건드리지 않아야 한다 (소스는 호출 시 panic)
    assert_eq!(predictor.calls, 0);
}

#[tokio::test]
async fn test_nan_entry_halts_before_model() {
    let strategy = no_network_strategy();
    let mut predictor = MockPredictor::new();

    // JSON에는 NaN 리터럴이 없으므로 null이 결측/NaN 역할을 한다
    let mut rows: Vec<String> = (0..60).map(|i| format!("[{}, 50, 0.1]", 100 + i)).collect();
    rows[7] = "[107, null, 0.1]".to_string();
    let request = PredictionRequest {
        input: RequestInput::Data(format!("[{}]", rows.join(","))),
        scaler: scaler_100_200(),
    };

    let err = run(request, &strategy, &mut predictor).await.unwrap_err();
    assert_eq!(err.code(), "ERROR_DATA_VALIDATION");
    assert_eq!(predictor.calls, 0);
}

#[tokio::test]
async fn test_triples_echo_without_recomputation() {
    let strategy = no_network_strategy();
    let mut predictor = MockPredictor::new().with_fixed_prediction(0.0);

    let rows: Vec<String> = (0..60)
        .map(|i| format!("[{}, {}, {:.2}]", 100 + i, 30 + i % 40, i as f64 * 0.01))
        .collect();
    let request = PredictionRequest {
        input: RequestInput::Data(format!("[{}]", rows.join(","))),
        scaler: scaler_100_200(),
    };

    let payload = run(request, &strategy, &mut predictor).await.unwrap();

    // 지표 계산을 생략하고 공급된 값이 그대로 에코된다
    assert_eq!(payload.series.rsi[0], 30.0);
    assert_eq!(payload.series.macd[59], 0.59);
    // 고정 예측 0.0 → 정확히 스케일러 하한
    assert_eq!(payload.predicted, 100.0);
}

#[tokio::test]
async fn test_unsupported_ticker_with_failing_live_reports_fetch_error() {
    let strategy = offline_strategy();
    let mut predictor = MockPredictor::new();

    let request = PredictionRequest {
        input: RequestInput::Ticker("TSLA".to_string()),
        scaler: scaler_100_200(),
    };

    let err = run(request, &strategy, &mut predictor).await.unwrap_err();
    assert_eq!(err.code(), "ERROR_DATA_FETCH");
    assert!(err.to_string().contains("TSLA"));
    assert_eq!(predictor.calls, 0);
}

#[tokio::test]
async fn test_model_failure_is_runtime_error() {
    let strategy = offline_strategy();

    /// 항상 실패하는 predictor.
    struct BrokenPredictor;
    impl stockcast_analytics::ml::PricePredictor for BrokenPredictor {
        fn predict(
            &mut self,
            _window: &stockcast_analytics::normalize::NormalizedWindow,
        ) -> stockcast_analytics::ml::MlResult<f32> {
            Err(stockcast_analytics::ml::MlError::Inference(
                "session crashed".to_string(),
            ))
        }

        fn model_name(&self) -> &str {
            "broken"
        }
    }

    let request = PredictionRequest {
        input: RequestInput::Ticker("AAPL".to_string()),
        scaler: scaler_100_200(),
    };

    let err = run(request, &strategy, &mut BrokenPredictor)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ERROR_RUNTIME");
    assert!(err.to_string().contains("session crashed"));
}
