//! 가격 예측 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 티커로 전체 수집 파이프라인 구동
//! stockcast --ticker AAPL --min 100.0 --max 200.0
//!
//! # 60개 종가를 직접 공급 (manual 지표 모드)
//! stockcast --data '[150.1, 150.4, ...]' --min 100.0 --max 200.0
//!
//! # 모델 경로 재정의
//! stockcast --ticker MSFT --min 250.0 --max 400.0 --model models/custom.onnx
//! ```
//!
//! stdout에는 호출당 정확히 하나의 JSON 페이로드만 기록됩니다.
//! 진단 로그는 stderr로 갑니다 (`RUST_LOG`로 제어).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use stockcast_analytics::ml::PredictorConfig;
use stockcast_cli::output::{self, ErrorPayload, FatalPayload, PredictionPayload};
use stockcast_cli::pipeline::{self, LazyOnnxPredictor, PredictionRequest, RequestInput};
use stockcast_core::{init_logging, LogConfig, PipelineError, ScalerParams};
use stockcast_data::{AcquisitionStrategy, NetworkConfig};

#[derive(Parser)]
#[command(name = "stockcast")]
#[command(about = "Daily close price prediction pipeline", long_about = None)]
#[command(version)]
struct Cli {
    /// 주식 티커 심볼 (예: AAPL)
    #[arg(long)]
    ticker: Option<String>,

    /// 60개 숫자(또는 60개 [close,rsi,macd] 트리플)의 JSON 배열
    #[arg(long)]
    data: Option<String>,

    /// 학습 시점 최소 종가 (스케일러 하한)
    #[arg(long = "min")]
    scaler_min: f64,

    /// 학습 시점 최대 종가 (스케일러 상한)
    #[arg(long = "max")]
    scaler_max: f64,

    /// ONNX 모델 파일 경로
    #[arg(long, default_value = "models/price_lstm.onnx")]
    model: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _ = init_logging(LogConfig::from_env());

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // 예기치 않은 실패: 치명 페이로드를 방출하고 비정상 종료
            let payload = FatalPayload {
                error_code: "500_CRITICAL_RUNTIME_CRASH".to_string(),
                message: err.to_string(),
                traceback: format!("{:?}", err),
            };
            let _ = output::print_json(&payload);
            ExitCode::FAILURE
        }
    }
}

/// 파이프라인을 실행하고 결과 또는 처리된 에러 페이로드를 방출.
///
/// 처리된 에러는 정상 종료이며, 이 함수가 `Err`를 반환하는 경우는
/// 페이로드 방출 자체가 실패하는 등 예기치 않은 상황뿐입니다.
async fn run(cli: Cli) -> anyhow::Result<()> {
    match execute(cli).await {
        Ok(payload) => output::print_json(&payload)?,
        Err(err) => output::print_json(&ErrorPayload {
            error: err.to_string(),
        })?,
    }
    Ok(())
}

/// 인자를 요청으로 변환하고 파이프라인 실행.
async fn execute(cli: Cli) -> Result<PredictionPayload, PipelineError> {
    let scaler = ScalerParams::new(cli.scaler_min, cli.scaler_max)
        .map_err(PipelineError::InvalidInput)?;

    // 티커가 우선하고, 없으면 직접 데이터
    let input = if let Some(ticker) = cli.ticker {
        RequestInput::Ticker(ticker)
    } else if let Some(data) = cli.data {
        RequestInput::Data(data)
    } else {
        return Err(PipelineError::InvalidInput(
            "Either ticker or data must be provided.".to_string(),
        ));
    };

    let strategy = AcquisitionStrategy::new(&NetworkConfig::default())
        .map_err(|e| PipelineError::Runtime(format!("Failed to set up acquisition: {}", e)))?;

    let config = PredictorConfig::new(cli.model);
    let mut predictor = LazyOnnxPredictor::new(config);

    pipeline::run(
        PredictionRequest { input, scaler },
        &strategy,
        &mut predictor,
    )
    .await
}
