//! 리스크 게이트 및 포지션 사이저 통합 테스트

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use trader_core::{OrderRequest, Position};
use trader_risk::{
    calculate_position_size, check_trade_risk, NoMarketData, RiskLimitOverrides, RiskLimits,
    Severity, SizingInputs, SizingMethod, SizingRule, StaticMarketData, ViolationType,
};

#[test]
fn test_order_within_limit_passes() {
    let order = OrderRequest::buy("AAPL", dec!(100), dec!(50));
    let result = check_trade_risk(
        &order,
        &[],
        dec!(100000),
        &RiskLimits::default(),
        &NoMarketData,
    )
    .unwrap();

    assert!(result.passed);
    assert!(result.violations.is_empty());
}

#[test]
fn test_oversized_order_at_boundary_is_high() {
    // 15%는 1.5 × 10%를 초과하지 않음
    let order = OrderRequest::buy("AAPL", dec!(300), dec!(50));
    let result = check_trade_risk(
        &order,
        &[],
        dec!(100000),
        &RiskLimits::default(),
        &NoMarketData,
    )
    .unwrap();

    assert!(!result.passed);
    assert_eq!(result.violations.len(), 1);
    let v = &result.violations[0];
    assert_eq!(v.violation_type, ViolationType::PositionSize);
    assert_eq!(v.severity, Severity::High);
    assert_eq!(v.current_value, 15.0);
    assert_eq!(v.limit_value, 10.0);
    assert_eq!(result.recommended_size, Some(dec!(200)));
}

#[test]
fn test_per_call_override_relaxes_limit() {
    let limits = RiskLimits::default().with_overrides(&RiskLimitOverrides {
        max_position_size: Some(20.0),
        ..Default::default()
    });
    let order = OrderRequest::buy("AAPL", dec!(300), dec!(50));
    let result = check_trade_risk(&order, &[], dec!(100000), &limits, &NoMarketData).unwrap();

    assert!(result.passed);
}

#[test]
fn test_full_book_with_market_data() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 4) as f64).collect();
    let data = StaticMarketData::new()
        .with_sector("AAPL", "TECH")
        .with_sector("MSFT", "TECH")
        .with_price_history("AAPL", closes.clone())
        .with_price_history("MSFT", closes)
        .with_average_volume("AAPL", dec!(1000000));
    let positions = vec![Position::long("MSFT", dec!(100), dec!(250))];
    let order = OrderRequest::buy("AAPL", dec!(50), dec!(100));

    let result = check_trade_risk(
        &order,
        &positions,
        dec!(100000),
        &RiskLimits::default(),
        &data,
    )
    .unwrap();

    assert!(result.has_violation(ViolationType::Correlation));
    assert!(!result.has_violation(ViolationType::SectorConcentration));
    assert!(result.warnings.is_empty());
}

#[test]
fn test_sizing_feeds_gate() {
    let inputs = SizingInputs::new("AAPL", dec!(50), dec!(100000));
    let sizing = calculate_position_size(&inputs, &SizingRule::default()).unwrap();
    let order = OrderRequest::buy("AAPL", sizing.recommended_size, dec!(50));

    let result = check_trade_risk(
        &order,
        &[],
        dec!(100000),
        &RiskLimits::default(),
        &NoMarketData,
    )
    .unwrap();
    assert!(result.passed);
}

fn arb_method() -> impl Strategy<Value = SizingMethod> {
    prop_oneof![
        Just(SizingMethod::FixedPercentage),
        Just(SizingMethod::VolatilityTarget),
        Just(SizingMethod::KellyCriterion),
        Just(SizingMethod::RiskParity),
        Just(SizingMethod::MomentumBased),
    ]
}

proptest! {
    /// passed ⟺ violations.is_empty()
    #[test]
    fn prop_passed_iff_no_violations(
        qty in 1u32..5000,
        price in 1u32..1000,
        existing in 0u32..2000,
        other in 0u32..2000,
        sell in any::<bool>(),
    ) {
        let positions = vec![
            Position::long("AAPL", Decimal::from(existing), Decimal::from(price)),
            Position::long("MSFT", Decimal::from(other), dec!(100)),
        ];
        let order = if sell {
            OrderRequest::sell("AAPL", Decimal::from(qty), Decimal::from(price))
        } else {
            OrderRequest::buy("AAPL", Decimal::from(qty), Decimal::from(price))
        };
        let data = StaticMarketData::new()
            .with_sector("AAPL", "TECH")
            .with_sector("MSFT", "TECH");

        let result = check_trade_risk(&order, &positions, dec!(100000), &RiskLimits::default(), &data).unwrap();

        prop_assert_eq!(result.passed, result.violations.is_empty());
        prop_assert_eq!(
            result.recommended_size.is_some(),
            result.has_violation(ViolationType::PositionSize)
        );
        if let Some(size) = result.recommended_size {
            prop_assert!(size >= Decimal::ZERO);
        }
    }

    /// 사이징 비율은 항상 [min_size, max_size]
    #[test]
    fn prop_sizing_percent_is_clipped(
        method in arb_method(),
        base in 0.0f64..50.0,
        min in 0.0f64..10.0,
        span in 0.0f64..40.0,
        volatility in 0.01f64..10.0,
        expected_return in -1.0f64..1.0,
        win_rate in 0.0f64..1.0,
        avg_win in 0.001f64..0.1,
        avg_loss in -0.1f64..-0.001,
    ) {
        let rule = SizingRule {
            method,
            base_size: base,
            volatility_target: Some(1.0),
            kelly_fraction: None,
            min_size: min,
            max_size: min + span,
        };
        let inputs = SizingInputs::new("AAPL", dec!(37), dec!(250000))
            .with_volatility(volatility)
            .with_expected_return(expected_return)
            .with_trade_stats(win_rate, avg_win, avg_loss)
            .with_holding_volatilities(vec![1.0, 2.0]);

        let sizing = calculate_position_size(&inputs, &rule).unwrap();

        prop_assert!(sizing.position_percent >= rule.min_size);
        prop_assert!(sizing.position_percent <= rule.max_size);
        prop_assert!(sizing.recommended_size >= Decimal::ZERO);
        prop_assert!(sizing.recommended_value <= dec!(250000));

        // 동일 입력은 동일 결과
        let again = calculate_position_size(&inputs, &rule).unwrap();
        prop_assert_eq!(sizing, again);
    }
}
