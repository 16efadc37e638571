//! 리스크 관리 시스템.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 리스크 한도에 대한 주문 검증 (리스크 게이트)
//! - 다섯 가지 방법의 포지션 사이징
//! - 포트폴리오 VaR/집중도 평가
//!
//! # 예제
//!
//! ```rust,ignore
//! use trader_risk::{check_trade_risk, NoMarketData, RiskLimits};
//!
//! let result = check_trade_risk(&order, &positions, portfolio_value, &RiskLimits::default(), &NoMarketData)?;
//! if result.passed {
//!     // 주문 진행
//! }
//! ```

pub mod config;
pub mod gate;
pub mod portfolio;
pub mod position_sizing;

// 주요 타입 재내보내기
pub use config::{
    ConfigValidationError, RiskLimitOverrides, RiskLimits, SizingMethod, SizingRule,
    DEFAULT_KELLY_FRACTION,
};
pub use gate::{
    check_trade_risk, MarketRiskData, NoMarketData, RiskCheckResult, RiskGate, RiskViolation,
    RiskWarning, Severity, StaticMarketData, ViolationType, WarningType,
};
pub use portfolio::{
    assess_portfolio_risk, PortfolioRiskAssessment, RiskLevel, DEFAULT_CONFIDENCE_LEVEL,
};
pub use position_sizing::{
    calculate_position_size, PositionSizer, PositionSizing, SizingInputs, DEFAULT_EXPECTED_RETURN,
    DEFAULT_STOP_LOSS_PCT,
};
