//! 시장 심리 집계기.
//!
//! 지표 스냅샷과 가격 변화율로부터 [-1, 1] 범위의 심리 점수를 계산합니다.
//! 규칙은 고정 순서로 적용되며, 적용된 규칙마다 요인(factor)이 기록됩니다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::{IndicatorSnapshot, MacdTrend, OscillatorZone, TrendDirection};

/// 모멘텀 요인이 적용되는 최소 가격 변화율 (2%).
pub const MOMENTUM_THRESHOLD: f64 = 0.02;

/// 심리 레이블.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    VeryBullish,
    Bullish,
    Neutral,
    Bearish,
    VeryBearish,
}

impl SentimentLabel {
    /// 고정 구간: ≥0.6, ≥0.2, ≤-0.6, ≤-0.2.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.6 {
            Self::VeryBullish
        } else if score >= 0.2 {
            Self::Bullish
        } else if score <= -0.6 {
            Self::VeryBearish
        } else if score <= -0.2 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }
}

/// 심리 요인.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentFactor {
    /// 요인 이름
    pub name: String,
    /// 점수 기여도
    pub impact: f64,
    /// 설명
    pub description: String,
}

impl SentimentFactor {
    fn new(name: &str, impact: f64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            impact,
            description: description.to_string(),
        }
    }
}

/// 심리 집계 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub overall: SentimentLabel,
    /// [-1, 1]로 제한된 점수
    pub score: f64,
    pub factors: Vec<SentimentFactor>,
}

/// 스냅샷과 가격 변화율(예: 0.03 = +3%)로 심리 집계.
///
/// 유한하지 않은 가격 변화율은 무시합니다.
pub fn aggregate(snapshot: &IndicatorSnapshot, price_change: f64) -> SentimentResult {
    let mut factors = Vec::new();

    if let Some(rsi) = &snapshot.rsi {
        match rsi.zone {
            OscillatorZone::Oversold => factors.push(SentimentFactor::new(
                "RSI",
                0.3,
                "RSI 과매도 구간, 반등 가능성",
            )),
            OscillatorZone::Overbought => factors.push(SentimentFactor::new(
                "RSI",
                -0.3,
                "RSI 과매수 구간, 조정 가능성",
            )),
            OscillatorZone::Neutral => {}
        }
    }

    if let Some(macd) = &snapshot.macd {
        match macd.trend {
            MacdTrend::Bullish => {
                factors.push(SentimentFactor::new("MACD", 0.2, "MACD 강세 교차"))
            }
            MacdTrend::Bearish => {
                factors.push(SentimentFactor::new("MACD", -0.2, "MACD 약세 교차"))
            }
            MacdTrend::Neutral => {}
        }
    }

    match snapshot.sma_trend() {
        Some(TrendDirection::Uptrend) => {
            factors.push(SentimentFactor::new("이동평균", 0.2, "이동평균 상승 추세"))
        }
        Some(TrendDirection::Downtrend) => {
            factors.push(SentimentFactor::new("이동평균", -0.2, "이동평균 하락 추세"))
        }
        _ => {}
    }

    if price_change.is_finite() && price_change.abs() > MOMENTUM_THRESHOLD {
        if price_change > 0.0 {
            factors.push(SentimentFactor::new("모멘텀", 0.15, "강한 상승 모멘텀"));
        } else {
            factors.push(SentimentFactor::new("모멘텀", -0.15, "강한 하락 모멘텀"));
        }
    }

    if let Some(adx) = snapshot.adx.filter(|a| a.strength.is_strong()) {
        if adx.plus_di > adx.minus_di {
            factors.push(SentimentFactor::new("ADX", 0.1, "강한 추세, 매수세 우위"));
        } else if adx.minus_di > adx.plus_di {
            factors.push(SentimentFactor::new("ADX", -0.1, "강한 추세, 매도세 우위"));
        }
    }

    if let Some(patterns) = &snapshot.patterns {
        if patterns.hammer {
            factors.push(SentimentFactor::new("캔들 패턴", 0.1, "망치형 반등 신호"));
        }
        if patterns.shooting_star {
            factors.push(SentimentFactor::new("캔들 패턴", -0.1, "유성형 하락 신호"));
        }
    }

    let raw: f64 = factors.iter().map(|f| f.impact).sum();
    let score = raw.clamp(-1.0, 1.0);
    let overall = SentimentLabel::from_score(score);

    debug!(score, overall = ?overall, factors = factors.len(), "시장 심리 집계");

    SentimentResult {
        overall,
        score,
        factors,
    }
}
