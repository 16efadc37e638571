//! 어드바이저 설정.
//!
//! 분석/리스크 각 단계의 설정을 하나의 TOML 문서로 묶습니다.
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [risk]
//! max_position_size = 15.0
//!
//! [sizing]
//! method = "KELLY_CRITERION"
//! kelly_fraction = 0.5
//! ```
//!
//! 환경 변수 `TRADER__RISK__MAX_POSITION_SIZE=12` 형식으로 덮어쓸 수 있습니다.

use std::path::Path;

use serde::{Deserialize, Serialize};
use trader_analytics::{ForecastParams, SignalWeights};
use trader_core::{load_from_toml_str, load_layered, LoggingConfig, TraderError, TraderResult};
use trader_risk::{RiskLimits, SizingRule, DEFAULT_STOP_LOSS_PCT};

/// 어드바이저 설정.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AdvisorConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 리스크 게이트 한도
    #[serde(default)]
    pub risk: RiskLimits,
    /// 포지션 사이징 규칙
    #[serde(default)]
    pub sizing: SizingRule,
    /// 가격 예측 파라미터
    #[serde(default)]
    pub forecast: ForecastParams,
    /// 시그널 가중치
    #[serde(default)]
    pub signal_weights: SignalWeights,
    /// 추천 손절 설정
    #[serde(default)]
    pub advice: AdviceConfig,
}

/// 추천 손절가 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AdviceConfig {
    /// ATR 기반 손절 배수 (기본값: 2.0)
    #[serde(default = "default_atr_stop_multiplier")]
    pub atr_stop_multiplier: f64,
    /// ATR이 없을 때의 손절 비율 (기본값: 0.02)
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,
}

fn default_atr_stop_multiplier() -> f64 {
    2.0
}

fn default_stop_loss_pct() -> f64 {
    DEFAULT_STOP_LOSS_PCT
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            atr_stop_multiplier: default_atr_stop_multiplier(),
            stop_loss_pct: default_stop_loss_pct(),
        }
    }
}

impl AdvisorConfig {
    /// 파일과 환경 변수에서 설정을 로드하고 검증합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> TraderResult<Self> {
        let config: Self = load_layered(path)?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> TraderResult<Self> {
        Self::load("config/default.toml")
    }

    /// TOML 문자열에서 설정을 로드하고 검증합니다.
    pub fn from_toml_str(toml: &str) -> TraderResult<Self> {
        let config: Self = load_from_toml_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// 모든 섹션을 검증합니다.
    pub fn validate(&self) -> TraderResult<()> {
        self.risk.validate()?;
        self.sizing.validate()?;
        self.forecast.validate().map_err(TraderError::Config)?;

        let advice = &self.advice;
        if !(advice.atr_stop_multiplier > 0.0 && advice.atr_stop_multiplier.is_finite()) {
            return Err(TraderError::Config(
                "atr_stop_multiplier must be greater than 0".into(),
            ));
        }
        if !(advice.stop_loss_pct > 0.0 && advice.stop_loss_pct < 1.0) {
            return Err(TraderError::Config(
                "stop_loss_pct must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }
}
