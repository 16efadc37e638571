//! # Trader Core
//!
//! 시그널/리스크 엔진의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 분석 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 캔들(OHLCV) 시계열
//! - 주문 요청 및 포지션
//! - 공통 통계 계산 (평균, 표준편차, 상관계수)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
