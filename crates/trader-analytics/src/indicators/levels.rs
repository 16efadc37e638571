//! 가격 레벨 지표.
//!
//! - 지지/저항: 최근 구간의 최저가/최고가
//! - 피보나치 되돌림: 최근 구간 고점-저점 사이의 비율 레벨

use serde::{Deserialize, Serialize};
use trader_core::{Candle, DecimalExt};

/// 지지/저항 기본 조회 구간.
pub const SUPPORT_RESISTANCE_WINDOW: usize = 20;

/// 피보나치 기본 조회 구간.
pub const FIBONACCI_WINDOW: usize = 50;

/// 지지/저항 레벨.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    /// 지지선 (구간 최저가).
    pub support: f64,
    /// 저항선 (구간 최고가).
    pub resistance: f64,
}

/// 피보나치 되돌림 레벨 (고점 기준 하락 방향).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub high: f64,
    pub low: f64,
    pub level_236: f64,
    pub level_382: f64,
    pub level_500: f64,
    pub level_618: f64,
    pub level_786: f64,
}

impl FibonacciLevels {
    /// 고점/저점으로부터 레벨 계산.
    pub fn from_range(high: f64, low: f64) -> Self {
        let diff = high - low;
        let level = |ratio: f64| high - diff * ratio;
        Self {
            high,
            low,
            level_236: level(0.236),
            level_382: level(0.382),
            level_500: level(0.5),
            level_618: level(0.618),
            level_786: level(0.786),
        }
    }
}

fn high_low(candles: &[Candle]) -> (f64, f64) {
    candles.iter().fold((f64::MIN, f64::MAX), |(hi, lo), c| {
        (
            hi.max(c.high.to_f64_or_zero()),
            lo.min(c.low.to_f64_or_zero()),
        )
    })
}

/// 최근 `window`개 캔들의 지지/저항. 캔들이 없으면 None.
pub fn support_resistance(candles: &[Candle], window: usize) -> Option<SupportResistance> {
    if candles.is_empty() || window == 0 {
        return None;
    }
    let recent = &candles[candles.len().saturating_sub(window)..];
    let (resistance, support) = high_low(recent);
    Some(SupportResistance {
        support,
        resistance,
    })
}

/// 최근 `window`개 캔들의 피보나치 레벨. 캔들이 2개 미만이면 None.
pub fn fibonacci_levels(candles: &[Candle], window: usize) -> Option<FibonacciLevels> {
    if candles.len() < 2 || window < 2 {
        return None;
    }
    let recent = &candles[candles.len().saturating_sub(window)..];
    let (high, low) = high_low(recent);
    Some(FibonacciLevels::from_range(high, low))
}
