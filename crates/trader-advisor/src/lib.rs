//! # Trader Advisor
//!
//! 분석 엔진과 리스크 엔진을 조합하는 계층입니다.
//!
//! - [`TradingAdvisor::analyze`]: 캔들 → 지표/시그널/예측/심리 + 매매 추천
//! - [`TradingAdvisor::plan_trade`]: 주문 → 리스크 게이트 + 포지션 사이징
//! - [`AdvisorConfig`]: 계층형 설정 (기본값 → TOML → 환경 변수)
//!
//! # 예제
//!
//! ```rust,ignore
//! use trader_advisor::{AdvisorConfig, TradingAdvisor};
//!
//! let config = AdvisorConfig::load_default()?;
//! trader_core::init_logging((&config.logging).into())?;
//!
//! let advisor = TradingAdvisor::new(&config)?;
//! let analysis = advisor.analyze("AAPL", &candles);
//! println!("{} ({:.0}%)", analysis.recommendation.action, analysis.recommendation.confidence);
//! ```

pub mod advisor;
pub mod config;

pub use advisor::{MarketAnalysis, Recommendation, TradeAction, TradePlan, TradingAdvisor};
pub use config::{AdviceConfig, AdvisorConfig};
