//! 결과 페이로드와 JSON 방출.
//!
//! 호출당 정확히 하나의 구조화된 페이로드가 stdout으로 방출되고 즉시
//! 플러시됩니다. 진단은 stderr로 갑니다 (로깅 인프라 참조).

use std::io::Write;

use serde::Serialize;

/// 성공 페이로드.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionPayload {
    /// 역정규화된 예측 가격.
    pub predicted: f64,
    /// 모델이 출력한 정규화된 예측값.
    pub normalized_pred: f64,
    /// 입력 윈도우의 타임스텝 수 (항상 60).
    pub timesteps: usize,
    /// 마지막 관측 종가. 시계열이 비어 있을 때만 null.
    pub last_close: Option<f64>,
    /// 시각화용으로 에코되는 원본(비정규화) 시계열.
    pub series: SeriesPayload,
}

/// 에코되는 피처 시계열.
#[derive(Debug, Serialize)]
pub struct SeriesPayload {
    pub close: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
}

/// 처리된 에러 페이로드.
///
/// `error` 문자열은 고정 코드 중 하나로 시작합니다
/// (`ERROR_DATA_FETCH`, `ERROR_DATA_PARSE`, `ERROR_INVALID_INPUT`,
/// `ERROR_DATA_VALIDATION`, `ERROR_RUNTIME`).
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub error: String,
}

/// 예기치 않은 치명적 실패 페이로드. 프로세스는 비정상 종료합니다.
#[derive(Debug, Serialize)]
pub struct FatalPayload {
    pub error_code: String,
    pub message: String,
    pub traceback: String,
}

/// 페이로드를 stdout에 한 줄로 쓰고 즉시 플러시.
pub fn print_json<T: Serialize>(payload: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
