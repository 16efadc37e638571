//! 포지션 크기 계산.
//!
//! 다섯 가지 방법 중 하나로 목표 비율(포트폴리오 대비 %)을 구한 뒤
//! 규칙의 [min_size, max_size] 범위로 자르고 주식 수와 금액으로 변환합니다.
//! 방법에 필요한 입력이 없으면 기본 비율로 대체하고 신뢰도를 절반으로 낮춥니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trader_core::{decimal_from_f64, mean, DecimalExt, Price, Quantity, TraderError, TraderResult};

use crate::config::{SizingMethod, SizingRule};

/// 기본 손절 비율 (포지션 가치의 2%).
pub const DEFAULT_STOP_LOSS_PCT: f64 = 0.02;

/// 기본 기대수익률 (10%).
pub const DEFAULT_EXPECTED_RETURN: f64 = 0.10;

/// 시그널 신뢰도가 없을 때의 기본 신뢰도.
pub const DEFAULT_CONFIDENCE: f64 = 50.0;

/// 모멘텀 배수 범위.
const MOMENTUM_MULTIPLIER_MIN: f64 = 0.5;
const MOMENTUM_MULTIPLIER_MAX: f64 = 2.0;

/// 포지션 사이징 입력.
///
/// `volatility`는 규칙의 `volatility_target`과 같은 단위여야 합니다.
/// 비율 값(`win_rate`, `expected_return`, `stop_loss_pct`)은 분수(0.02 = 2%)입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingInputs {
    pub symbol: String,
    pub price: Price,
    pub portfolio_value: Decimal,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub win_rate: Option<f64>,
    #[serde(default)]
    pub avg_win: Option<f64>,
    #[serde(default)]
    pub avg_loss: Option<f64>,
    /// Kelly 통계 추정용 과거 거래 수익률
    #[serde(default)]
    pub historical_returns: Vec<f64>,
    /// 기존 보유 종목들의 변동성 (리스크 패리티용)
    #[serde(default)]
    pub holding_volatilities: Vec<f64>,
    #[serde(default)]
    pub expected_return: Option<f64>,
    #[serde(default)]
    pub stop_loss_pct: Option<f64>,
    /// 시그널 신뢰도 (0-100)
    #[serde(default)]
    pub signal_confidence: Option<f64>,
}

impl SizingInputs {
    pub fn new(symbol: impl Into<String>, price: Price, portfolio_value: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            portfolio_value,
            volatility: None,
            win_rate: None,
            avg_win: None,
            avg_loss: None,
            historical_returns: Vec::new(),
            holding_volatilities: Vec::new(),
            expected_return: None,
            stop_loss_pct: None,
            signal_confidence: None,
        }
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    /// 명시적인 Kelly 통계를 설정합니다.
    pub fn with_trade_stats(mut self, win_rate: f64, avg_win: f64, avg_loss: f64) -> Self {
        self.win_rate = Some(win_rate);
        self.avg_win = Some(avg_win);
        self.avg_loss = Some(avg_loss);
        self
    }

    pub fn with_historical_returns(mut self, returns: Vec<f64>) -> Self {
        self.historical_returns = returns;
        self
    }

    pub fn with_holding_volatilities(mut self, volatilities: Vec<f64>) -> Self {
        self.holding_volatilities = volatilities;
        self
    }

    pub fn with_expected_return(mut self, expected_return: f64) -> Self {
        self.expected_return = Some(expected_return);
        self
    }

    pub fn with_stop_loss_pct(mut self, stop_loss_pct: f64) -> Self {
        self.stop_loss_pct = Some(stop_loss_pct);
        self
    }

    pub fn with_signal_confidence(mut self, confidence: f64) -> Self {
        self.signal_confidence = Some(confidence);
        self
    }

    fn validate(&self) -> TraderResult<()> {
        if self.price <= Decimal::ZERO {
            return Err(TraderError::InvalidInput(format!(
                "가격은 0보다 커야 합니다: {}",
                self.price
            )));
        }
        if self.portfolio_value <= Decimal::ZERO {
            return Err(TraderError::InvalidInput(format!(
                "포트폴리오 가치는 0보다 커야 합니다: {}",
                self.portfolio_value
            )));
        }
        if let Some(stop) = self.stop_loss_pct {
            if !(0.0..=1.0).contains(&stop) {
                return Err(TraderError::InvalidInput(format!(
                    "손절 비율은 0과 1 사이여야 합니다: {}",
                    stop
                )));
            }
        }
        if let Some(p) = self.win_rate {
            if !(0.0..=1.0).contains(&p) {
                return Err(TraderError::InvalidInput(format!(
                    "승률은 0과 1 사이여야 합니다: {}",
                    p
                )));
            }
        }
        Ok(())
    }
}

/// 포지션 사이징 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizing {
    /// 권장 수량 (정수 주)
    pub recommended_size: Quantity,
    /// 권장 수량 × 가격
    pub recommended_value: Decimal,
    /// 포트폴리오 대비 비율 (항상 [min_size, max_size])
    pub position_percent: f64,
    /// 손절 시 예상 손실 금액
    pub risk_amount: Decimal,
    /// 기대 이익 / 리스크 금액
    pub risk_reward_ratio: f64,
    /// 신뢰도 (0-100)
    pub confidence: f64,
    pub method: SizingMethod,
    /// 입력 부족으로 기본 비율을 사용했는지 여부
    pub used_fallback: bool,
}

/// Kelly 공식 입력 통계.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TradeStats {
    win_rate: f64,
    avg_win: f64,
    avg_loss: f64,
}

impl TradeStats {
    /// 과거 수익률에서 승률과 평균 손익을 추정합니다.
    fn estimate(returns: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        let wins: Vec<f64> = finite.iter().copied().filter(|r| *r > 0.0).collect();
        let losses: Vec<f64> = finite.iter().copied().filter(|r| *r < 0.0).collect();
        if losses.is_empty() {
            return None;
        }

        Some(Self {
            win_rate: wins.len() as f64 / finite.len() as f64,
            avg_win: if wins.is_empty() { 0.0 } else { mean(&wins) },
            avg_loss: mean(&losses),
        })
    }

    /// f* = p - (1 - p) / b, b = 평균 이익 / |평균 손실|. 0 이하면 0.
    fn kelly(&self) -> Option<f64> {
        let loss = self.avg_loss.abs();
        if loss == 0.0 || !loss.is_finite() {
            return None;
        }
        let b = self.avg_win / loss;
        if b <= 0.0 {
            return Some(0.0);
        }
        let f = self.win_rate - (1.0 - self.win_rate) / b;
        if !f.is_finite() {
            return None;
        }
        Some(f.max(0.0))
    }
}

/// 규칙을 보관하는 포지션 사이저.
#[derive(Debug, Clone, Default)]
pub struct PositionSizer {
    rule: SizingRule,
}

impl PositionSizer {
    pub fn new(rule: SizingRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &SizingRule {
        &self.rule
    }

    pub fn size(&self, inputs: &SizingInputs) -> TraderResult<PositionSizing> {
        calculate_position_size(inputs, &self.rule)
    }
}

/// 포지션 크기를 계산합니다.
///
/// # Errors
///
/// 규칙이 잘못되었으면(`max_size < min_size` 등) `TraderError::Config`,
/// 가격이나 포트폴리오 가치가 0 이하이면 `TraderError::InvalidInput`.
pub fn calculate_position_size(
    inputs: &SizingInputs,
    rule: &SizingRule,
) -> TraderResult<PositionSizing> {
    rule.validate()?;
    inputs.validate()?;

    let (raw_percent, used_fallback) = match target_percent(inputs, rule) {
        Some(pct) => (pct, false),
        None => (rule.base_size, true),
    };
    let position_percent = raw_percent.clamp(rule.min_size, rule.max_size);

    let target_value = inputs.portfolio_value.pct_of(position_percent);
    let recommended_size = (target_value / inputs.price).floor().max(Decimal::ZERO);
    let recommended_value = recommended_size * inputs.price;

    let stop = inputs.stop_loss_pct.unwrap_or(DEFAULT_STOP_LOSS_PCT);
    let expected_return = inputs
        .expected_return
        .filter(|r| r.is_finite())
        .unwrap_or(DEFAULT_EXPECTED_RETURN);
    let risk_amount = recommended_value * decimal_from_f64(stop);
    let potential_gain = recommended_value * decimal_from_f64(expected_return);
    let risk_reward_ratio = if risk_amount.is_zero() {
        0.0
    } else {
        (potential_gain / risk_amount).to_f64_or_zero()
    };

    let base_confidence = inputs
        .signal_confidence
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 100.0);
    let confidence = if used_fallback {
        base_confidence / 2.0
    } else {
        base_confidence
    };

    debug!(
        symbol = %inputs.symbol,
        method = ?rule.method,
        raw_percent,
        position_percent,
        shares = %recommended_size,
        used_fallback,
        "포지션 크기 계산"
    );

    Ok(PositionSizing {
        recommended_size,
        recommended_value,
        position_percent,
        risk_amount,
        risk_reward_ratio,
        confidence,
        method: rule.method,
        used_fallback,
    })
}

/// 방법별 원시 목표 비율. 필요한 입력이 없으면 `None`.
fn target_percent(inputs: &SizingInputs, rule: &SizingRule) -> Option<f64> {
    let positive = |v: &f64| v.is_finite() && *v > 0.0;

    let pct = match rule.method {
        SizingMethod::FixedPercentage => rule.base_size,
        SizingMethod::VolatilityTarget => {
            let target = rule.volatility_target.filter(positive)?;
            let actual = inputs.volatility.filter(positive)?;
            target / actual * rule.base_size
        }
        SizingMethod::KellyCriterion => {
            let stats = match (inputs.win_rate, inputs.avg_win, inputs.avg_loss) {
                (Some(win_rate), Some(avg_win), Some(avg_loss)) => TradeStats {
                    win_rate,
                    avg_win,
                    avg_loss,
                },
                _ => TradeStats::estimate(&inputs.historical_returns)?,
            };
            stats.kelly()? * rule.effective_kelly_fraction() * 100.0
        }
        SizingMethod::RiskParity => {
            let own = 1.0 / inputs.volatility.filter(positive)?;
            let others: f64 = inputs
                .holding_volatilities
                .iter()
                .filter(|v| positive(*v))
                .map(|v| 1.0 / v)
                .sum();
            own / (own + others) * 100.0
        }
        SizingMethod::MomentumBased => {
            let er = inputs.expected_return.filter(|r| r.is_finite())?;
            let multiplier =
                (1.0 + 10.0 * er).clamp(MOMENTUM_MULTIPLIER_MIN, MOMENTUM_MULTIPLIER_MAX);
            rule.base_size * multiplier
        }
    };

    pct.is_finite().then_some(pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs() -> SizingInputs {
        SizingInputs::new("AAPL", dec!(50), dec!(100000))
    }

    #[test]
    fn test_fixed_percentage() {
        let sizing = calculate_position_size(&inputs(), &SizingRule::default()).unwrap();

        assert_eq!(sizing.position_percent, 5.0);
        assert_eq!(sizing.recommended_size, dec!(100));
        assert_eq!(sizing.recommended_value, dec!(5000));
        assert_eq!(sizing.risk_amount, dec!(100));
        assert!((sizing.risk_reward_ratio - 5.0).abs() < 1e-9);
        assert_eq!(sizing.confidence, 50.0);
        assert!(!sizing.used_fallback);
    }

    #[test]
    fn test_volatility_target() {
        let rule = SizingRule {
            volatility_target: Some(1.0),
            ..SizingRule::with_method(SizingMethod::VolatilityTarget)
        };
        let sizing = calculate_position_size(&inputs().with_volatility(2.0), &rule).unwrap();

        assert!((sizing.position_percent - 2.5).abs() < 1e-9);
        assert_eq!(sizing.recommended_size, dec!(50));
    }

    #[test]
    fn test_volatility_target_without_volatility_falls_back() {
        let rule = SizingRule {
            volatility_target: Some(1.0),
            ..SizingRule::with_method(SizingMethod::VolatilityTarget)
        };
        let sizing =
            calculate_position_size(&inputs().with_signal_confidence(80.0), &rule).unwrap();

        assert!(sizing.used_fallback);
        assert_eq!(sizing.position_percent, 5.0);
        assert_eq!(sizing.confidence, 40.0);
    }

    #[test]
    fn test_kelly_explicit_stats() {
        // f* = 0.6 - 0.4 / 2 = 0.4, × 0.25 = 10%
        let rule = SizingRule::with_method(SizingMethod::KellyCriterion);
        let sizing =
            calculate_position_size(&inputs().with_trade_stats(0.6, 0.02, -0.01), &rule).unwrap();

        assert!((sizing.position_percent - 10.0).abs() < 1e-9);
        assert!(!sizing.used_fallback);
    }

    #[test]
    fn test_kelly_negative_edge_clips_to_min() {
        let rule = SizingRule::with_method(SizingMethod::KellyCriterion);
        let sizing =
            calculate_position_size(&inputs().with_trade_stats(0.3, 0.01, -0.02), &rule).unwrap();

        assert_eq!(sizing.position_percent, rule.min_size);
        assert!(!sizing.used_fallback);
    }

    #[test]
    fn test_kelly_estimated_from_history() {
        let rule = SizingRule::with_method(SizingMethod::KellyCriterion);
        let returns = vec![0.02, 0.02, 0.02, -0.01, -0.01];
        let sizing =
            calculate_position_size(&inputs().with_historical_returns(returns), &rule).unwrap();

        // p = 0.6, b = 2 → 10%
        assert!((sizing.position_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_kelly_without_losses_falls_back() {
        let rule = SizingRule::with_method(SizingMethod::KellyCriterion);
        let sizing =
            calculate_position_size(&inputs().with_historical_returns(vec![0.01, 0.02]), &rule)
                .unwrap();

        assert!(sizing.used_fallback);
        assert_eq!(sizing.confidence, 25.0);
    }

    #[test]
    fn test_risk_parity() {
        let rule = SizingRule::with_method(SizingMethod::RiskParity);
        // 1/2 ÷ (1/2 + 1/2 + 1/4) = 40%, max 20%로 제한
        let sizing = calculate_position_size(
            &inputs()
                .with_volatility(2.0)
                .with_holding_volatilities(vec![2.0, 4.0]),
            &rule,
        )
        .unwrap();
        assert_eq!(sizing.position_percent, 20.0);

        let many = vec![1.0; 19];
        let sizing = calculate_position_size(
            &inputs().with_volatility(1.0).with_holding_volatilities(many),
            &rule,
        )
        .unwrap();
        assert!((sizing.position_percent - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_momentum_multiplier_clamped() {
        let rule = SizingRule::with_method(SizingMethod::MomentumBased);

        let strong = calculate_position_size(&inputs().with_expected_return(0.5), &rule).unwrap();
        assert_eq!(strong.position_percent, 10.0);

        let weak = calculate_position_size(&inputs().with_expected_return(-0.5), &rule).unwrap();
        assert_eq!(weak.position_percent, 2.5);

        let mild = calculate_position_size(&inputs().with_expected_return(0.03), &rule).unwrap();
        assert!((mild.position_percent - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_stop_loss() {
        let sizing =
            calculate_position_size(&inputs().with_stop_loss_pct(0.05), &SizingRule::default())
                .unwrap();

        assert_eq!(sizing.risk_amount, dec!(250));
        assert!((sizing.risk_reward_ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_stop_gives_zero_ratio() {
        let sizing =
            calculate_position_size(&inputs().with_stop_loss_pct(0.0), &SizingRule::default())
                .unwrap();

        assert!(sizing.risk_amount.is_zero());
        assert_eq!(sizing.risk_reward_ratio, 0.0);
    }

    #[test]
    fn test_invalid_rule_fails_fast() {
        let rule = SizingRule {
            min_size: 10.0,
            max_size: 5.0,
            ..Default::default()
        };
        let err = calculate_position_size(&inputs(), &rule).unwrap_err();
        assert!(matches!(err, TraderError::Config(_)));
    }

    #[test]
    fn test_invalid_inputs() {
        let zero_price = SizingInputs::new("AAPL", Decimal::ZERO, dec!(100000));
        let err = calculate_position_size(&zero_price, &SizingRule::default()).unwrap_err();
        assert!(matches!(err, TraderError::InvalidInput(_)));
    }

    #[test]
    fn test_sizer_uses_rule() {
        let sizer = PositionSizer::new(SizingRule {
            base_size: 8.0,
            ..Default::default()
        });
        let sizing = sizer.size(&inputs()).unwrap();
        assert_eq!(sizing.recommended_size, dec!(160));
    }
}
