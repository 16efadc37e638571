//! 주문 타입.
//!
//! - `Side` - 주문 방향 (매수/매도)
//! - `OrderRequest` - 리스크 검증 대상 주문 요청

use crate::types::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 주문 방향 (매수 또는 매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 반대 방향을 반환합니다.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// 부호 있는 수량 계산용 부호 (매수 +1, 매도 -1).
    pub fn sign(&self) -> Decimal {
        match self {
            Side::Buy => Decimal::ONE,
            Side::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// 주문 요청.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// 거래 심볼
    pub symbol: String,
    /// 주문 방향
    pub side: Side,
    /// 주문 수량
    pub quantity: Quantity,
    /// 주문 가격 (시장가 주문은 현재가)
    pub price: Price,
}

impl OrderRequest {
    /// 새 주문 요청을 생성합니다.
    pub fn new(symbol: impl Into<String>, side: Side, quantity: Quantity, price: Price) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price,
        }
    }

    /// 매수 주문을 생성합니다.
    pub fn buy(symbol: impl Into<String>, quantity: Quantity, price: Price) -> Self {
        Self::new(symbol, Side::Buy, quantity, price)
    }

    /// 매도 주문을 생성합니다.
    pub fn sell(symbol: impl Into<String>, quantity: Quantity, price: Price) -> Self {
        Self::new(symbol, Side::Sell, quantity, price)
    }

    /// 주문 명목 가치 (수량 × 가격).
    pub fn notional_value(&self) -> Decimal {
        self.quantity * self.price
    }

    /// 부호 있는 수량 (매수 +, 매도 -).
    pub fn signed_quantity(&self) -> Decimal {
        self.quantity * self.side.sign()
    }
}
