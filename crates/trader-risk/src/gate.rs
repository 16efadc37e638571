//! 리스크 게이트.
//!
//! 제안된 주문이 체결된 이후의 포지션 상태를 계산하고 구성된 한도와 비교합니다:
//! - 단일 포지션 크기 (POSITION_SIZE)
//! - 섹터 집중도 (SECTOR_CONCENTRATION)
//! - 보유 종목과의 상관관계 (CORRELATION)
//! - 총 노출 (TOTAL_EXPOSURE)
//!
//! 유동성/변동성 경고는 통과 여부에 영향을 주지 않습니다.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trader_core::{
    decimal_from_f64, pearson_correlation, prices_to_returns, std_dev, DecimalExt, OrderRequest,
    Position, TraderError, TraderResult,
};

use crate::config::RiskLimits;

/// 한도 초과 시 CRITICAL로 격상되는 배수.
const CRITICAL_MULTIPLIER: Decimal = dec!(1.5);

/// 한도 위반 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationType {
    PositionSize,
    SectorConcentration,
    Correlation,
    TotalExposure,
}

/// 위반 심각도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Critical,
}

impl Severity {
    /// 측정값이 한도의 1.5배를 초과(엄격)하면 CRITICAL.
    fn for_excess(current: Decimal, limit: Decimal) -> Self {
        if current > limit * CRITICAL_MULTIPLIER {
            Severity::Critical
        } else {
            Severity::High
        }
    }
}

/// 한도 위반 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskViolation {
    #[serde(rename = "type")]
    pub violation_type: ViolationType,
    pub severity: Severity,
    pub message: String,
    /// 측정값 (퍼센트 또는 상관계수)
    pub current_value: f64,
    /// 비교한 한도
    pub limit_value: f64,
}

/// 경고 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningType {
    Liquidity,
    Volatility,
}

/// 통과를 막지 않는 경고.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWarning {
    #[serde(rename = "type")]
    pub warning_type: WarningType,
    pub message: String,
    pub current_value: f64,
    pub threshold: f64,
}

/// 리스크 검사 결과.
///
/// `passed`는 항상 `violations.is_empty()`와 같습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCheckResult {
    pub passed: bool,
    pub violations: Vec<RiskViolation>,
    pub warnings: Vec<RiskWarning>,
    /// POSITION_SIZE 위반 시 한도 내 최대 주문 수량
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_size: Option<Decimal>,
}

impl RiskCheckResult {
    fn new(
        violations: Vec<RiskViolation>,
        warnings: Vec<RiskWarning>,
        recommended_size: Option<Decimal>,
    ) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
            warnings,
            recommended_size,
        }
    }

    /// 가장 높은 위반 심각도.
    pub fn max_severity(&self) -> Option<Severity> {
        self.violations.iter().map(|v| v.severity).max()
    }

    /// 특정 유형의 위반이 있는지 확인합니다.
    pub fn has_violation(&self, violation_type: ViolationType) -> bool {
        self.violations
            .iter()
            .any(|v| v.violation_type == violation_type)
    }
}

/// 리스크 검사에 필요한 시장 데이터 제공자.
///
/// 알 수 없는 값은 `None`을 반환하며, 해당 검사는 건너뜁니다.
pub trait MarketRiskData: Send + Sync {
    /// 심볼의 섹터.
    fn sector(&self, symbol: &str) -> Option<String>;

    /// 두 심볼 수익률 간 상관계수 (-1 ~ 1).
    fn correlation(&self, a: &str, b: &str) -> Option<f64>;

    /// 평균 일거래량 (수량 단위).
    fn average_daily_volume(&self, symbol: &str) -> Option<Decimal>;

    /// 일간 변동성 (퍼센트, 2.0 = 2%).
    fn volatility(&self, symbol: &str) -> Option<f64>;
}

/// 시장 데이터가 없는 제공자. 데이터 의존 검사를 모두 건너뜁니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMarketData;

impl MarketRiskData for NoMarketData {
    fn sector(&self, _symbol: &str) -> Option<String> {
        None
    }

    fn correlation(&self, _a: &str, _b: &str) -> Option<f64> {
        None
    }

    fn average_daily_volume(&self, _symbol: &str) -> Option<Decimal> {
        None
    }

    fn volatility(&self, _symbol: &str) -> Option<f64> {
        None
    }
}

/// 메모리 내 시장 데이터.
///
/// 상관계수와 변동성은 등록된 가격 이력의 일간 수익률로 계산합니다.
#[derive(Debug, Clone, Default)]
pub struct StaticMarketData {
    sectors: HashMap<String, String>,
    price_history: HashMap<String, Vec<f64>>,
    average_volumes: HashMap<String, Decimal>,
    volatilities: HashMap<String, f64>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sector(mut self, symbol: impl Into<String>, sector: impl Into<String>) -> Self {
        self.sectors.insert(symbol.into(), sector.into());
        self
    }

    pub fn with_price_history(mut self, symbol: impl Into<String>, closes: Vec<f64>) -> Self {
        self.price_history.insert(symbol.into(), closes);
        self
    }

    pub fn with_average_volume(mut self, symbol: impl Into<String>, volume: Decimal) -> Self {
        self.average_volumes.insert(symbol.into(), volume);
        self
    }

    /// 가격 이력 대신 변동성을 직접 지정합니다 (퍼센트).
    pub fn with_volatility(mut self, symbol: impl Into<String>, volatility_pct: f64) -> Self {
        self.volatilities.insert(symbol.into(), volatility_pct);
        self
    }

    fn returns(&self, symbol: &str) -> Option<Vec<f64>> {
        self.price_history
            .get(symbol)
            .map(|closes| prices_to_returns(closes))
            .filter(|returns| returns.len() >= 2)
    }
}

impl MarketRiskData for StaticMarketData {
    fn sector(&self, symbol: &str) -> Option<String> {
        self.sectors.get(symbol).cloned()
    }

    fn correlation(&self, a: &str, b: &str) -> Option<f64> {
        if a == b {
            return Some(1.0);
        }
        let ra = self.returns(a)?;
        let rb = self.returns(b)?;
        pearson_correlation(&ra, &rb)
    }

    fn average_daily_volume(&self, symbol: &str) -> Option<Decimal> {
        self.average_volumes.get(symbol).copied()
    }

    fn volatility(&self, symbol: &str) -> Option<f64> {
        if let Some(v) = self.volatilities.get(symbol) {
            return Some(*v);
        }
        self.returns(symbol).map(|returns| std_dev(&returns) * 100.0)
    }
}

/// 리스크 게이트.
#[derive(Debug, Clone, Default)]
pub struct RiskGate {
    limits: RiskLimits,
}

impl RiskGate {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// 주문을 검사합니다.
    ///
    /// # Errors
    ///
    /// 한도 설정이 잘못되었거나 포트폴리오 가치/가격/수량이 0 이하이면 에러를 반환합니다.
    pub fn check(
        &self,
        order: &OrderRequest,
        positions: &[Position],
        portfolio_value: Decimal,
        data: &dyn MarketRiskData,
    ) -> TraderResult<RiskCheckResult> {
        self.limits.validate()?;
        validate_inputs(order, portfolio_value)?;

        let limits = &self.limits;
        let mut violations = Vec::new();
        let mut warnings = Vec::new();
        let mut recommended_size = None;

        let open: Vec<&Position> = positions.iter().filter(|p| p.is_open()).collect();
        let (same, others): (Vec<&Position>, Vec<&Position>) =
            open.into_iter().partition(|p| p.symbol == order.symbol);

        let existing_qty: Decimal = same.iter().map(|p| p.signed_quantity()).sum();
        let resulting_qty = existing_qty + order.signed_quantity();
        let resulting_value = resulting_qty.abs() * order.price;
        let hundred = Decimal::ONE_HUNDRED;

        // 1. 포지션 크기
        let position_pct = resulting_value / portfolio_value * hundred;
        let position_limit = decimal_from_f64(limits.max_position_size);
        if position_pct > position_limit {
            violations.push(violation(
                ViolationType::PositionSize,
                position_pct,
                position_limit,
                format!(
                    "{} 포지션이 포트폴리오의 {:.2}%로 한도 {}%를 초과합니다",
                    order.symbol,
                    position_pct.to_f64_or_zero(),
                    limits.max_position_size
                ),
            ));

            let room = portfolio_value.pct_of(limits.max_position_size)
                - existing_qty.abs() * order.price;
            recommended_size = Some((room / order.price).floor().max(Decimal::ZERO));
        }

        // 2. 섹터 집중도
        if let Some(sector) = data.sector(&order.symbol) {
            let sector_value: Decimal = others
                .iter()
                .filter(|p| data.sector(&p.symbol).as_deref() == Some(sector.as_str()))
                .map(|p| p.notional_value())
                .sum();
            let sector_pct = (sector_value + resulting_value) / portfolio_value * hundred;
            let sector_limit = decimal_from_f64(limits.max_sector_exposure);
            if sector_pct > sector_limit {
                violations.push(violation(
                    ViolationType::SectorConcentration,
                    sector_pct,
                    sector_limit,
                    format!(
                        "{} 섹터 노출이 {:.2}%로 한도 {}%를 초과합니다",
                        sector,
                        sector_pct.to_f64_or_zero(),
                        limits.max_sector_exposure
                    ),
                ));
            }
        }

        // 3. 상관관계
        let held: BTreeSet<&str> = others.iter().map(|p| p.symbol.as_str()).collect();
        let strongest = held
            .iter()
            .filter_map(|symbol| {
                data.correlation(&order.symbol, symbol)
                    .filter(|rho| rho.is_finite())
                    .map(|rho| (*symbol, rho.abs()))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((symbol, rho)) = strongest {
            if rho > limits.max_correlation {
                let severity = if rho > limits.max_correlation * 1.5 {
                    Severity::Critical
                } else {
                    Severity::High
                };
                violations.push(RiskViolation {
                    violation_type: ViolationType::Correlation,
                    severity,
                    message: format!(
                        "{}와(과) 보유 종목 {}의 상관계수 {:.2}가 한도 {}를 초과합니다",
                        order.symbol, symbol, rho, limits.max_correlation
                    ),
                    current_value: rho,
                    limit_value: limits.max_correlation,
                });
            }
        }

        // 4. 총 노출
        let others_value: Decimal = others.iter().map(|p| p.notional_value()).sum();
        let total_pct = (others_value + resulting_value) / portfolio_value * hundred;
        let total_limit = decimal_from_f64(limits.max_total_exposure);
        if total_pct > total_limit {
            violations.push(violation(
                ViolationType::TotalExposure,
                total_pct,
                total_limit,
                format!(
                    "총 노출이 {:.2}%로 한도 {}%를 초과합니다",
                    total_pct.to_f64_or_zero(),
                    limits.max_total_exposure
                ),
            ));
        }

        // 경고: 유동성
        if let Some(adv) = data.average_daily_volume(&order.symbol) {
            let threshold = adv.pct_of(limits.max_volume_participation);
            if adv > Decimal::ZERO && order.quantity > threshold {
                warnings.push(RiskWarning {
                    warning_type: WarningType::Liquidity,
                    message: format!(
                        "주문 수량 {}이(가) 평균 거래량의 {}%({})를 초과합니다",
                        order.quantity, limits.max_volume_participation, threshold
                    ),
                    current_value: order.quantity.to_f64_or_zero(),
                    threshold: threshold.to_f64_or_zero(),
                });
            }
        }

        // 경고: 변동성
        if let Some(volatility) = data.volatility(&order.symbol) {
            if volatility.is_finite() && volatility > limits.max_volatility {
                warnings.push(RiskWarning {
                    warning_type: WarningType::Volatility,
                    message: format!(
                        "{} 변동성 {:.2}%가 기준 {}%를 초과합니다",
                        order.symbol, volatility, limits.max_volatility
                    ),
                    current_value: volatility,
                    threshold: limits.max_volatility,
                });
            }
        }

        for v in &violations {
            warn!(
                symbol = %order.symbol,
                violation = ?v.violation_type,
                severity = ?v.severity,
                current = v.current_value,
                limit = v.limit_value,
                "리스크 한도 위반"
            );
        }

        let result = RiskCheckResult::new(violations, warnings, recommended_size);
        debug!(
            symbol = %order.symbol,
            side = %order.side,
            passed = result.passed,
            violations = result.violations.len(),
            warnings = result.warnings.len(),
            position_pct = position_pct.to_f64_or_zero(),
            "리스크 검사 완료"
        );

        Ok(result)
    }
}

/// 기본 인터페이스: 주어진 한도로 주문을 검사합니다.
pub fn check_trade_risk(
    order: &OrderRequest,
    positions: &[Position],
    portfolio_value: Decimal,
    limits: &RiskLimits,
    data: &dyn MarketRiskData,
) -> TraderResult<RiskCheckResult> {
    RiskGate::new(limits.clone()).check(order, positions, portfolio_value, data)
}

fn validate_inputs(order: &OrderRequest, portfolio_value: Decimal) -> TraderResult<()> {
    if portfolio_value <= Decimal::ZERO {
        return Err(TraderError::InvalidInput(format!(
            "포트폴리오 가치는 0보다 커야 합니다: {}",
            portfolio_value
        )));
    }
    if order.price <= Decimal::ZERO {
        return Err(TraderError::InvalidInput(format!(
            "주문 가격은 0보다 커야 합니다: {}",
            order.price
        )));
    }
    if order.quantity <= Decimal::ZERO {
        return Err(TraderError::InvalidInput(format!(
            "주문 수량은 0보다 커야 합니다: {}",
            order.quantity
        )));
    }
    Ok(())
}

fn violation(
    violation_type: ViolationType,
    current: Decimal,
    limit: Decimal,
    message: String,
) -> RiskViolation {
    RiskViolation {
        violation_type,
        severity: Severity::for_excess(current, limit),
        message,
        current_value: current.to_f64_or_zero(),
        limit_value: limit.to_f64_or_zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pv() -> Decimal {
        dec!(100000)
    }

    #[test]
    fn test_small_order_passes() {
        let order = OrderRequest::buy("AAPL", dec!(100), dec!(50));
        let result =
            check_trade_risk(&order, &[], pv(), &RiskLimits::default(), &NoMarketData).unwrap();

        assert!(result.passed);
        assert!(result.violations.is_empty());
        assert!(result.recommended_size.is_none());
    }

    #[test]
    fn test_critical_when_above_one_and_half_limit() {
        // 20% > 15%
        let order = OrderRequest::buy("AAPL", dec!(400), dec!(50));
        let result =
            check_trade_risk(&order, &[], pv(), &RiskLimits::default(), &NoMarketData).unwrap();

        assert!(!result.passed);
        assert_eq!(result.violations[0].severity, Severity::Critical);
        assert_eq!(result.recommended_size, Some(dec!(200)));
    }

    #[test]
    fn test_existing_position_counts_toward_size() {
        let positions = vec![Position::long("AAPL", dec!(150), dec!(50))];
        let order = OrderRequest::buy("AAPL", dec!(100), dec!(50));
        let result = check_trade_risk(
            &order,
            &positions,
            pv(),
            &RiskLimits::default(),
            &NoMarketData,
        )
        .unwrap();

        // 250주 × 50 = 12.5%
        assert!(result.has_violation(ViolationType::PositionSize));
        // (10000 - 7500) / 50 = 50
        assert_eq!(result.recommended_size, Some(dec!(50)));
    }

    #[test]
    fn test_sell_reduces_existing_long() {
        let positions = vec![Position::long("AAPL", dec!(300), dec!(50))];
        let order = OrderRequest::sell("AAPL", dec!(200), dec!(50));
        let result = check_trade_risk(
            &order,
            &positions,
            pv(),
            &RiskLimits::default(),
            &NoMarketData,
        )
        .unwrap();

        assert!(result.passed);
    }

    #[test]
    fn test_sell_can_open_short() {
        let order = OrderRequest::sell("AAPL", dec!(300), dec!(50));
        let result =
            check_trade_risk(&order, &[], pv(), &RiskLimits::default(), &NoMarketData).unwrap();

        assert!(result.has_violation(ViolationType::PositionSize));
        assert_eq!(result.max_severity(), Some(Severity::High));
    }

    #[test]
    fn test_sector_concentration() {
        let data = StaticMarketData::new()
            .with_sector("AAPL", "TECH")
            .with_sector("MSFT", "TECH")
            .with_sector("XOM", "ENERGY");
        let positions = vec![
            Position::long("MSFT", dec!(500), dec!(50)),
            Position::long("XOM", dec!(500), dec!(50)),
        ];
        // 섹터: 25000 + 9000 = 34%
        let order = OrderRequest::buy("AAPL", dec!(180), dec!(50));
        let result =
            check_trade_risk(&order, &positions, pv(), &RiskLimits::default(), &data).unwrap();

        assert!(!result.passed);
        assert!(result.has_violation(ViolationType::SectorConcentration));
        assert!(!result.has_violation(ViolationType::PositionSize));
    }

    #[test]
    fn test_correlation_violation() {
        let base: Vec<f64> = vec![100.0, 102.0, 101.0, 104.0, 103.0, 107.0, 106.0, 110.0];
        let twin: Vec<f64> = base.iter().map(|p| p * 2.0).collect();
        let data = StaticMarketData::new()
            .with_price_history("AAPL", base)
            .with_price_history("MSFT", twin);
        let positions = vec![Position::long("MSFT", dec!(10), dec!(200))];
        let order = OrderRequest::buy("AAPL", dec!(10), dec!(100));

        let result =
            check_trade_risk(&order, &positions, pv(), &RiskLimits::default(), &data).unwrap();

        assert!(result.has_violation(ViolationType::Correlation));
        let v = &result.violations[0];
        assert!((v.current_value - 1.0).abs() < 1e-9);
        assert_eq!(v.limit_value, 0.7);
    }

    #[test]
    fn test_total_exposure() {
        let positions = vec![
            Position::long("A", dec!(900), dec!(100)),
            Position::long("B", dec!(50), dec!(100)),
        ];
        let order = OrderRequest::buy("C", dec!(100), dec!(100));
        let result = check_trade_risk(
            &order,
            &positions,
            pv(),
            &RiskLimits::default(),
            &NoMarketData,
        )
        .unwrap();

        // 90000 + 5000 + 10000 = 105%
        assert!(result.has_violation(ViolationType::TotalExposure));
        assert_eq!(result.violations[0].severity, Severity::High);
    }

    #[test]
    fn test_warnings_do_not_block() {
        let data = StaticMarketData::new()
            .with_average_volume("AAPL", dec!(500))
            .with_volatility("AAPL", 7.5);
        let order = OrderRequest::buy("AAPL", dec!(100), dec!(50));
        let result =
            check_trade_risk(&order, &[], pv(), &RiskLimits::default(), &data).unwrap();

        assert!(result.passed);
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.warnings[0].warning_type, WarningType::Liquidity);
        assert_eq!(result.warnings[1].warning_type, WarningType::Volatility);
    }

    #[test]
    fn test_invalid_inputs() {
        let limits = RiskLimits::default();
        let order = OrderRequest::buy("AAPL", dec!(100), dec!(50));
        assert!(check_trade_risk(&order, &[], Decimal::ZERO, &limits, &NoMarketData).is_err());

        let zero_price = OrderRequest::buy("AAPL", dec!(100), Decimal::ZERO);
        assert!(check_trade_risk(&zero_price, &[], pv(), &limits, &NoMarketData).is_err());

        let bad_limits = RiskLimits {
            max_correlation: 2.0,
            ..Default::default()
        };
        let err = check_trade_risk(&order, &[], pv(), &bad_limits, &NoMarketData).unwrap_err();
        assert!(matches!(err, TraderError::Config(_)));
    }

    #[test]
    fn test_result_wire_format() {
        let order = OrderRequest::buy("AAPL", dec!(300), dec!(50));
        let result =
            check_trade_risk(&order, &[], pv(), &RiskLimits::default(), &NoMarketData).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["violations"][0]["type"], "POSITION_SIZE");
        assert_eq!(json["violations"][0]["severity"], "HIGH");
        assert_eq!(json["passed"], false);
    }
}
