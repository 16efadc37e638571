//! 캔들 패턴 감지.
//!
//! 마지막 한두 개 캔들의 몸통/그림자 비율로 반전 패턴을 감지합니다.
//!
//! ## 지원 패턴
//! - **도지 (Doji)**: 몸통이 전체 범위의 10% 이하
//! - **망치형 (Hammer)**: 아래꼬리 > 2 × 몸통, 위꼬리 < 몸통
//! - **유성형 (Shooting Star)**: 위꼬리 > 2 × 몸통, 아래꼬리 < 몸통
//! - **장악형 (Engulfing)**: 직전 캔들 몸통을 반대 방향으로 감싸는 캔들
//! - **잉태형 (Harami)**: 직전 캔들 몸통 안에 들어가는 반대 방향 캔들

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trader_core::Candle;

/// 캔들 패턴 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandlePatternType {
    /// 도지 (추세 전환 가능성).
    Doji,
    /// 망치형 (강세 반전).
    Hammer,
    /// 유성형 (약세 반전).
    ShootingStar,
    /// 강세 장악형.
    BullishEngulfing,
    /// 약세 장악형.
    BearishEngulfing,
    /// 강세 잉태형.
    BullishHarami,
    /// 약세 잉태형.
    BearishHarami,
}

/// 패턴이 암시하는 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternBias {
    Bullish,
    Bearish,
    Neutral,
}

impl CandlePatternType {
    /// 패턴 방향성.
    pub fn bias(self) -> PatternBias {
        match self {
            Self::Hammer | Self::BullishEngulfing | Self::BullishHarami => PatternBias::Bullish,
            Self::ShootingStar | Self::BearishEngulfing | Self::BearishHarami => {
                PatternBias::Bearish
            }
            Self::Doji => PatternBias::Neutral,
        }
    }

    /// 표시용 이름.
    pub fn name(self) -> &'static str {
        match self {
            Self::Doji => "Doji",
            Self::Hammer => "Hammer",
            Self::ShootingStar => "Shooting Star",
            Self::BullishEngulfing => "Bullish Engulfing",
            Self::BearishEngulfing => "Bearish Engulfing",
            Self::BullishHarami => "Bullish Harami",
            Self::BearishHarami => "Bearish Harami",
        }
    }
}

/// 캔들 패턴 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CandlePatternParams {
    /// 몸통 비율 임계값 (기본: 0.1, 도지 판단용).
    pub body_ratio_threshold: Decimal,
    /// 그림자 비율 임계값 (기본: 2.0, 망치형/유성형 판단용).
    pub shadow_ratio_threshold: Decimal,
}

impl Default for CandlePatternParams {
    fn default() -> Self {
        Self {
            body_ratio_threshold: dec!(0.1),
            shadow_ratio_threshold: dec!(2.0),
        }
    }
}

/// 감지된 캔들 패턴 플래그.
///
/// 두 캔들 패턴(장악형, 잉태형)은 캔들이 2개 이상일 때만 true가 될 수 있습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandlePatterns {
    pub doji: bool,
    pub hammer: bool,
    pub shooting_star: bool,
    pub bullish_engulfing: bool,
    pub bearish_engulfing: bool,
    pub bullish_harami: bool,
    pub bearish_harami: bool,
}

impl CandlePatterns {
    /// 감지된 패턴 목록 (고정 순서).
    pub fn detected(&self) -> Vec<CandlePatternType> {
        [
            (self.doji, CandlePatternType::Doji),
            (self.hammer, CandlePatternType::Hammer),
            (self.shooting_star, CandlePatternType::ShootingStar),
            (self.bullish_engulfing, CandlePatternType::BullishEngulfing),
            (self.bearish_engulfing, CandlePatternType::BearishEngulfing),
            (self.bullish_harami, CandlePatternType::BullishHarami),
            (self.bearish_harami, CandlePatternType::BearishHarami),
        ]
        .into_iter()
        .filter_map(|(hit, pattern)| hit.then_some(pattern))
        .collect()
    }

    /// 감지된 패턴이 하나라도 있는지 확인.
    pub fn any(&self) -> bool {
        !self.detected().is_empty()
    }
}

/// 기본 파라미터로 마지막 캔들들의 패턴 감지. 캔들이 없으면 None.
pub fn detect_patterns(candles: &[Candle]) -> Option<CandlePatterns> {
    detect_patterns_with(candles, &CandlePatternParams::default())
}

/// 파라미터를 지정해 패턴 감지.
pub fn detect_patterns_with(
    candles: &[Candle],
    params: &CandlePatternParams,
) -> Option<CandlePatterns> {
    let last = candles.last()?;

    let body = last.body_size();
    let upper = last.upper_shadow();
    let lower = last.lower_shadow();

    let mut patterns = CandlePatterns {
        doji: body <= last.range() * params.body_ratio_threshold,
        hammer: lower > body * params.shadow_ratio_threshold && upper < body,
        shooting_star: upper > body * params.shadow_ratio_threshold && lower < body,
        ..Default::default()
    };

    if candles.len() >= 2 {
        let prev = &candles[candles.len() - 2];

        patterns.bullish_engulfing = prev.is_bearish()
            && last.is_bullish()
            && last.open < prev.close
            && last.close > prev.open;
        patterns.bearish_engulfing = prev.is_bullish()
            && last.is_bearish()
            && last.open > prev.close
            && last.close < prev.open;
        patterns.bullish_harami = prev.is_bearish()
            && last.is_bullish()
            && last.open > prev.close
            && last.close < prev.open;
        patterns.bearish_harami = prev.is_bullish()
            && last.is_bearish()
            && last.open < prev.close
            && last.close > prev.open;
    }

    Some(patterns)
}
