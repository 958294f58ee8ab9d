//! # Stockcast Data
//!
//! 일별 종가 시계열의 수집 계층입니다.
//!
//! 두 종류의 소스 어댑터와 이를 순서대로 시도하는 수집 전략을 제공합니다:
//! - [`source::MockSheetSource`]: 데모/오프라인 티커용 합성 데이터
//! - [`source::YahooQuoteSource`]: Yahoo Finance 차트 API
//! - [`acquisition::AcquisitionStrategy`]: 윈도우를 넓혀가며 최소 60개의
//!   클린 관측치를 보장하는 폴백 캐스케이드

pub mod acquisition;
pub mod client;
pub mod error;
pub mod source;

pub use acquisition::AcquisitionStrategy;
pub use client::NetworkConfig;
pub use error::{DataSourceError, DataSourceResult};
pub use source::{FetchWindow, MockSheetSource, SeriesSource, YahooQuoteSource};
