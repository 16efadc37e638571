//! 금융 계산을 위한 Decimal 유틸리티.
//!
//! 가격/수량은 `Decimal`로 보관하고, 통계 계산 경계에서만 `f64`로 변환합니다.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 수량 타입.
pub type Quantity = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// f64로 변환합니다. 표현할 수 없으면 0.0.
    fn to_f64_or_zero(&self) -> f64;

    /// 퍼센트 값(예: 10.0 = 10%)에 해당하는 금액을 계산합니다.
    fn pct_of(&self, pct: f64) -> Decimal;
}

impl DecimalExt for Decimal {
    fn to_f64_or_zero(&self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }

    fn pct_of(&self, pct: f64) -> Decimal {
        // 퍼센트를 정수로 스케일링 (퍼센트의 소수점 4자리까지 지원)
        let scaled_pct = (pct * 10_000.0).round() as i64;
        (*self * Decimal::from(scaled_pct)) / Decimal::from(1_000_000)
    }
}

/// f64를 Decimal로 변환합니다. NaN/무한대는 0.
pub fn decimal_from_f64(value: f64) -> Decimal {
    if value.is_finite() {
        Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pct_of() {
        assert_eq!(dec!(100000).pct_of(10.0), dec!(10000));
        assert_eq!(dec!(1000).pct_of(10.5), dec!(105));
    }

    #[test]
    fn test_to_f64_or_zero() {
        assert_eq!(dec!(50.25).to_f64_or_zero(), 50.25);
    }

    #[test]
    fn test_decimal_from_non_finite() {
        assert_eq!(decimal_from_f64(f64::NAN), Decimal::ZERO);
        assert_eq!(decimal_from_f64(f64::INFINITY), Decimal::ZERO);
        assert_eq!(decimal_from_f64(2.5), dec!(2.5));
    }
}
