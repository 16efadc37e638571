//! 리스크 관리 설정.
//!
//! 리스크 게이트 한도와 포지션 사이징 규칙을 위한 설정 구조체를 정의합니다.
//! 퍼센트 값은 10.0 = 10% 형식입니다.

use serde::{Deserialize, Serialize};
use trader_core::TraderError;

/// 리스크 게이트 한도.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    /// 포트폴리오 대비 단일 포지션 최대 비율 (기본값: 10%)
    #[serde(default = "default_max_position_size")]
    pub max_position_size: f64,

    /// 포트폴리오 대비 섹터 최대 노출 비율 (기본값: 30%)
    #[serde(default = "default_max_sector_exposure")]
    pub max_sector_exposure: f64,

    /// 보유 종목과의 최대 상관계수 절대값 (기본값: 0.7)
    #[serde(default = "default_max_correlation")]
    pub max_correlation: f64,

    /// 포트폴리오 대비 총 노출 비율 (기본값: 100%)
    #[serde(default = "default_max_total_exposure")]
    pub max_total_exposure: f64,

    /// 평균 일거래량 대비 주문 수량 비율 경고 기준 (기본값: 10%)
    #[serde(default = "default_max_volume_participation")]
    pub max_volume_participation: f64,

    /// 종목 일간 변동성 경고 기준 (기본값: 5%)
    #[serde(default = "default_max_volatility")]
    pub max_volatility: f64,
}

// 기본값 함수들
fn default_max_position_size() -> f64 {
    10.0
}

fn default_max_sector_exposure() -> f64 {
    30.0
}

fn default_max_correlation() -> f64 {
    0.7
}

fn default_max_total_exposure() -> f64 {
    100.0
}

fn default_max_volume_participation() -> f64 {
    10.0
}

fn default_max_volatility() -> f64 {
    5.0
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_position_size: default_max_position_size(),
            max_sector_exposure: default_max_sector_exposure(),
            max_correlation: default_max_correlation(),
            max_total_exposure: default_max_total_exposure(),
            max_volume_participation: default_max_volume_participation(),
            max_volatility: default_max_volatility(),
        }
    }
}

/// 호출 단위 한도 재정의. 지정한 필드만 덮어씁니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskLimitOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_position_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sector_exposure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_correlation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_exposure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_volume_participation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_volatility: Option<f64>,
}

impl RiskLimits {
    /// 기본값으로 새 RiskLimits를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 보수적인 한도를 생성합니다.
    pub fn conservative() -> Self {
        Self {
            max_position_size: 5.0,
            max_sector_exposure: 20.0,
            max_correlation: 0.5,
            max_total_exposure: 60.0,
            max_volume_participation: 5.0,
            max_volatility: 3.0,
        }
    }

    /// 공격적인 한도를 생성합니다.
    pub fn aggressive() -> Self {
        Self {
            max_position_size: 20.0,
            max_sector_exposure: 50.0,
            max_correlation: 0.85,
            max_total_exposure: 150.0,
            max_volume_participation: 20.0,
            max_volatility: 8.0,
        }
    }

    /// 재정의 값을 적용한 한도를 반환합니다.
    pub fn with_overrides(&self, overrides: &RiskLimitOverrides) -> Self {
        Self {
            max_position_size: overrides.max_position_size.unwrap_or(self.max_position_size),
            max_sector_exposure: overrides
                .max_sector_exposure
                .unwrap_or(self.max_sector_exposure),
            max_correlation: overrides.max_correlation.unwrap_or(self.max_correlation),
            max_total_exposure: overrides
                .max_total_exposure
                .unwrap_or(self.max_total_exposure),
            max_volume_participation: overrides
                .max_volume_participation
                .unwrap_or(self.max_volume_participation),
            max_volatility: overrides.max_volatility.unwrap_or(self.max_volatility),
        }
    }

    /// 설정 값을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let pct_fields = [
            ("max_position_size", self.max_position_size),
            ("max_sector_exposure", self.max_sector_exposure),
            ("max_volume_participation", self.max_volume_participation),
        ];
        for (name, value) in pct_fields {
            if !(value > 0.0 && value <= 100.0) {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "{} must be between 0 and 100",
                    name
                )));
            }
        }

        if !(self.max_correlation > 0.0 && self.max_correlation <= 1.0) {
            return Err(ConfigValidationError::InvalidValue(
                "max_correlation must be between 0 and 1".into(),
            ));
        }

        if !(self.max_total_exposure > 0.0 && self.max_total_exposure.is_finite()) {
            return Err(ConfigValidationError::InvalidValue(
                "max_total_exposure must be greater than 0".into(),
            ));
        }

        if !(self.max_volatility > 0.0 && self.max_volatility.is_finite()) {
            return Err(ConfigValidationError::InvalidValue(
                "max_volatility must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

/// 포지션 사이징 방법.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizingMethod {
    /// 고정 비율 (base_size)
    #[default]
    FixedPercentage,
    /// 목표 변동성 / 실제 변동성 × base_size
    VolatilityTarget,
    /// 분수 Kelly
    KellyCriterion,
    /// 보유 종목 대비 역변동성 가중
    RiskParity,
    /// 기대수익률 기반 배수 × base_size
    MomentumBased,
}

/// 분수 Kelly 기본 비율 (Full Kelly의 25%).
pub const DEFAULT_KELLY_FRACTION: f64 = 0.25;

/// 포지션 사이징 규칙.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingRule {
    /// 사이징 방법
    #[serde(default)]
    pub method: SizingMethod,

    /// 기본 포지션 비율 (기본값: 5%)
    #[serde(default = "default_base_size")]
    pub base_size: f64,

    /// 목표 변동성 (VOLATILITY_TARGET 전용, 종목 변동성과 같은 단위)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility_target: Option<f64>,

    /// Full Kelly 대비 적용 비율 (기본값: 0.25)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kelly_fraction: Option<f64>,

    /// 최대 포지션 비율 (기본값: 20%)
    #[serde(default = "default_max_size")]
    pub max_size: f64,

    /// 최소 포지션 비율 (기본값: 1%)
    #[serde(default = "default_min_size")]
    pub min_size: f64,
}

fn default_base_size() -> f64 {
    5.0
}

fn default_max_size() -> f64 {
    20.0
}

fn default_min_size() -> f64 {
    1.0
}

impl Default for SizingRule {
    fn default() -> Self {
        Self {
            method: SizingMethod::default(),
            base_size: default_base_size(),
            volatility_target: None,
            kelly_fraction: None,
            max_size: default_max_size(),
            min_size: default_min_size(),
        }
    }
}

impl SizingRule {
    /// 지정한 방법의 기본 규칙.
    pub fn with_method(method: SizingMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// 유효 Kelly 비율.
    pub fn effective_kelly_fraction(&self) -> f64 {
        self.kelly_fraction.unwrap_or(DEFAULT_KELLY_FRACTION)
    }

    /// 설정 값을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.min_size >= 0.0 && self.max_size <= 100.0) {
            return Err(ConfigValidationError::InvalidValue(
                "min_size and max_size must be between 0 and 100".into(),
            ));
        }

        if self.max_size < self.min_size {
            return Err(ConfigValidationError::InvalidValue(format!(
                "max_size ({}) must not be less than min_size ({})",
                self.max_size, self.min_size
            )));
        }

        if !(self.base_size >= 0.0 && self.base_size.is_finite()) {
            return Err(ConfigValidationError::InvalidValue(
                "base_size must be non-negative".into(),
            ));
        }

        if let Some(fraction) = self.kelly_fraction {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(ConfigValidationError::InvalidValue(
                    "kelly_fraction must be between 0 and 1".into(),
                ));
            }
        }

        if let Some(target) = self.volatility_target {
            if !(target > 0.0 && target.is_finite()) {
                return Err(ConfigValidationError::InvalidValue(
                    "volatility_target must be greater than 0".into(),
                ));
            }
        }

        Ok(())
    }
}

/// 설정 검증 오류.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl From<ConfigValidationError> for TraderError {
    fn from(err: ConfigValidationError) -> Self {
        TraderError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = RiskLimits::default();

        assert_eq!(limits.max_position_size, 10.0);
        assert_eq!(limits.max_sector_exposure, 30.0);
        assert_eq!(limits.max_correlation, 0.7);
        assert_eq!(limits.max_total_exposure, 100.0);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(RiskLimits::conservative().validate().is_ok());
        assert!(RiskLimits::aggressive().validate().is_ok());
        assert!(RiskLimits::conservative().max_position_size < RiskLimits::aggressive().max_position_size);
    }

    #[test]
    fn test_overrides_apply_subset() {
        let overrides = RiskLimitOverrides {
            max_position_size: Some(25.0),
            ..Default::default()
        };
        let limits = RiskLimits::default().with_overrides(&overrides);

        assert_eq!(limits.max_position_size, 25.0);
        assert_eq!(limits.max_sector_exposure, 30.0);
    }

    #[test]
    fn test_limits_deserialize_with_defaults() {
        let limits: RiskLimits = serde_json::from_str(r#"{"max_correlation": 0.5}"#).unwrap();
        assert_eq!(limits.max_correlation, 0.5);
        assert_eq!(limits.max_position_size, 10.0);
    }

    #[test]
    fn test_invalid_limits() {
        let limits = RiskLimits {
            max_position_size: 0.0,
            ..Default::default()
        };
        assert!(limits.validate().is_err());

        let limits = RiskLimits {
            max_correlation: 1.5,
            ..Default::default()
        };
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_sizing_rule_validation() {
        assert!(SizingRule::default().validate().is_ok());

        let inverted = SizingRule {
            min_size: 10.0,
            max_size: 5.0,
            ..Default::default()
        };
        let err = inverted.validate().unwrap_err();
        assert!(err.to_string().contains("max_size"));

        let negative = SizingRule {
            min_size: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let bad_kelly = SizingRule {
            kelly_fraction: Some(1.5),
            ..Default::default()
        };
        assert!(bad_kelly.validate().is_err());
    }

    #[test]
    fn test_sizing_method_wire_format() {
        let json = serde_json::to_string(&SizingMethod::KellyCriterion).unwrap();
        assert_eq!(json, "\"KELLY_CRITERION\"");
        assert_eq!(SizingRule::default().effective_kelly_fraction(), DEFAULT_KELLY_FRACTION);
    }

    #[test]
    fn test_validation_error_converts_to_config_error() {
        let err: TraderError = ConfigValidationError::InvalidValue("x".into()).into();
        assert!(matches!(err, TraderError::Config(_)));
    }
}
