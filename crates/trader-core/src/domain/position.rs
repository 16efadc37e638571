//! 포지션 타입.
//!
//! 리스크 검증 시점의 보유 현황을 나타냅니다. 저장/갱신 수명주기는 없습니다.

use crate::domain::Side;
use crate::types::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 심볼의 보유량을 나타내는 포지션.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// 거래 심볼
    pub symbol: String,
    /// 포지션 방향 (롱 = Buy, 숏 = Sell)
    pub side: Side,
    /// 보유 수량 (항상 0 이상)
    pub quantity: Quantity,
    /// 평균 진입 가격
    pub entry_price: Price,
    /// 현재 시장 가격
    pub current_price: Price,
}

impl Position {
    /// 새 포지션을 생성합니다. 현재가는 진입가로 초기화됩니다.
    pub fn new(symbol: impl Into<String>, side: Side, quantity: Quantity, entry_price: Price) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            entry_price,
            current_price: entry_price,
        }
    }

    /// 롱 포지션을 생성합니다.
    pub fn long(symbol: impl Into<String>, quantity: Quantity, entry_price: Price) -> Self {
        Self::new(symbol, Side::Buy, quantity, entry_price)
    }

    /// 숏 포지션을 생성합니다.
    pub fn short(symbol: impl Into<String>, quantity: Quantity, entry_price: Price) -> Self {
        Self::new(symbol, Side::Sell, quantity, entry_price)
    }

    /// 현재 가격을 설정합니다.
    pub fn with_current_price(mut self, current_price: Price) -> Self {
        self.current_price = current_price;
        self
    }

    /// 부호 있는 수량 (롱 +, 숏 -).
    pub fn signed_quantity(&self) -> Decimal {
        self.quantity * self.side.sign()
    }

    /// 포지션의 명목 가치(절대값)를 반환합니다.
    pub fn notional_value(&self) -> Decimal {
        self.current_price * self.quantity
    }

    /// 미실현 손익.
    pub fn unrealized_pnl(&self) -> Decimal {
        (self.current_price - self.entry_price) * self.signed_quantity()
    }

    /// 포지션이 오픈 상태인지 확인합니다.
    pub fn is_open(&self) -> bool {
        self.quantity > Decimal::ZERO
    }
}
