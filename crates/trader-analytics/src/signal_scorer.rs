//! 시그널 스코어러.
//!
//! 지표 스냅샷의 분류 결과를 강세/약세 점수로 합산해
//! 5단계 시그널(STRONG_BUY ~ STRONG_SELL)과 신뢰도를 산출합니다.
//!
//! # 점수 규칙
//!
//! | 지표 | 가중치 | 강세 | 약세 |
//! |------|--------|------|------|
//! | RSI | 2 | 과매도 | 과매수 |
//! | MACD | 2 | MACD > 시그널 | MACD < 시그널 |
//! | SMA 추세 | 1 | 상승 | 하락 |
//! | 스토캐스틱 | 1 | 과매도 | 과매수 |
//! | ADX (Strong 이상) | 1 | +DI > -DI | -DI > +DI |
//! | 캔들 패턴 (각각) | 1 | 강세 패턴 | 약세 패턴 |
//!
//! 신뢰도 = min(|순점수| × 15, 95). 통계적 확률이 아닌 단순 매핑입니다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::candle_patterns::PatternBias;
use crate::indicators::{IndicatorSnapshot, MacdTrend, OscillatorZone, TrendDirection};

/// 순점수 1점당 신뢰도.
pub const CONFIDENCE_PER_POINT: f64 = 15.0;

/// 신뢰도 상한.
pub const MAX_CONFIDENCE: f64 = 95.0;

/// 5단계 매매 시그널.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalLabel {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl SignalLabel {
    /// 순점수 → 시그널. ±4 이상 강한 시그널, ±2 이상 일반 시그널.
    pub fn from_net_score(net: i32) -> Self {
        match net {
            n if n >= 4 => Self::StrongBuy,
            n if n >= 2 => Self::Buy,
            n if n <= -4 => Self::StrongSell,
            n if n <= -2 => Self::Sell,
            _ => Self::Neutral,
        }
    }

    /// 매수 계열 여부.
    pub fn is_buy(self) -> bool {
        matches!(self, Self::StrongBuy | Self::Buy)
    }

    /// 매도 계열 여부.
    pub fn is_sell(self) -> bool {
        matches!(self, Self::StrongSell | Self::Sell)
    }
}

impl std::fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::Buy => "BUY",
            Self::Neutral => "NEUTRAL",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG_SELL",
        };
        write!(f, "{}", s)
    }
}

/// 스코어링 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSignal {
    /// 종합 시그널
    pub overall: SignalLabel,
    /// 신뢰도 (0 ~ 95)
    pub confidence: f64,
    /// 평가 순서대로 기록된 근거
    pub reasons: Vec<String>,
    pub bullish_score: u32,
    pub bearish_score: u32,
    pub net_score: i32,
}

impl ScoredSignal {
    /// 지표가 하나도 없을 때의 결과.
    pub fn neutral() -> Self {
        Self {
            overall: SignalLabel::Neutral,
            confidence: 0.0,
            reasons: Vec::new(),
            bullish_score: 0,
            bearish_score: 0,
            net_score: 0,
        }
    }
}

/// 지표별 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    #[serde(default = "default_heavy_weight")]
    pub rsi: u32,
    #[serde(default = "default_heavy_weight")]
    pub macd: u32,
    #[serde(default = "default_light_weight")]
    pub sma_trend: u32,
    #[serde(default = "default_light_weight")]
    pub stochastic: u32,
    #[serde(default = "default_light_weight")]
    pub adx: u32,
    #[serde(default = "default_light_weight")]
    pub pattern: u32,
}

fn default_heavy_weight() -> u32 {
    2
}

fn default_light_weight() -> u32 {
    1
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            rsi: default_heavy_weight(),
            macd: default_heavy_weight(),
            sma_trend: default_light_weight(),
            stochastic: default_light_weight(),
            adx: default_light_weight(),
            pattern: default_light_weight(),
        }
    }
}

/// 순점수 → 신뢰도. |net|에 대해 단조 증가하며 95에서 포화.
pub fn confidence_for(net_score: i32) -> f64 {
    (net_score.unsigned_abs() as f64 * CONFIDENCE_PER_POINT).min(MAX_CONFIDENCE)
}

/// 시그널 스코어러.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalScorer {
    weights: SignalWeights,
}

/// 강세/약세 누적기.
#[derive(Default)]
struct Tally {
    bullish: u32,
    bearish: u32,
    reasons: Vec<String>,
}

impl Tally {
    fn bullish(&mut self, weight: u32, reason: String) {
        self.bullish += weight;
        self.reasons.push(reason);
    }

    fn bearish(&mut self, weight: u32, reason: String) {
        self.bearish += weight;
        self.reasons.push(reason);
    }
}

impl SignalScorer {
    /// 기본 가중치 스코어러.
    pub fn new() -> Self {
        Self::default()
    }

    /// 가중치를 지정한 스코어러.
    pub fn with_weights(weights: SignalWeights) -> Self {
        Self { weights }
    }

    /// 스냅샷 스코어링.
    pub fn score(&self, snapshot: &IndicatorSnapshot) -> ScoredSignal {
        let w = &self.weights;
        let mut tally = Tally::default();

        if let Some(rsi) = &snapshot.rsi {
            match rsi.zone {
                OscillatorZone::Oversold => {
                    tally.bullish(w.rsi, format!("RSI 과매도 ({:.1})", rsi.value))
                }
                OscillatorZone::Overbought => {
                    tally.bearish(w.rsi, format!("RSI 과매수 ({:.1})", rsi.value))
                }
                OscillatorZone::Neutral => {}
            }
        }

        if let Some(macd) = &snapshot.macd {
            match macd.trend {
                MacdTrend::Bullish => {
                    tally.bullish(w.macd, "MACD 강세 (MACD > 시그널)".to_string())
                }
                MacdTrend::Bearish => {
                    tally.bearish(w.macd, "MACD 약세 (MACD < 시그널)".to_string())
                }
                MacdTrend::Neutral => {}
            }
        }

        match snapshot.sma_trend() {
            Some(TrendDirection::Uptrend) => {
                tally.bullish(w.sma_trend, "이동평균 정배열 상승 추세".to_string())
            }
            Some(TrendDirection::Downtrend) => {
                tally.bearish(w.sma_trend, "이동평균 역배열 하락 추세".to_string())
            }
            _ => {}
        }

        if let Some(stoch) = &snapshot.stochastic {
            match stoch.zone {
                OscillatorZone::Oversold => {
                    tally.bullish(w.stochastic, format!("스토캐스틱 과매도 ({:.1})", stoch.k))
                }
                OscillatorZone::Overbought => {
                    tally.bearish(w.stochastic, format!("스토캐스틱 과매수 ({:.1})", stoch.k))
                }
                OscillatorZone::Neutral => {}
            }
        }

        if let Some(adx) = snapshot.adx.filter(|a| a.strength.is_strong()) {
            if adx.plus_di > adx.minus_di {
                tally.bullish(w.adx, format!("강한 상승 추세 (ADX {:.1})", adx.adx));
            } else if adx.minus_di > adx.plus_di {
                tally.bearish(w.adx, format!("강한 하락 추세 (ADX {:.1})", adx.adx));
            }
        }

        if let Some(patterns) = &snapshot.patterns {
            for pattern in patterns.detected() {
                match pattern.bias() {
                    PatternBias::Bullish => {
                        tally.bullish(w.pattern, format!("강세 캔들 패턴: {}", pattern.name()))
                    }
                    PatternBias::Bearish => {
                        tally.bearish(w.pattern, format!("약세 캔들 패턴: {}", pattern.name()))
                    }
                    PatternBias::Neutral => {}
                }
            }
        }

        let net_score = tally.bullish as i32 - tally.bearish as i32;
        let result = ScoredSignal {
            overall: SignalLabel::from_net_score(net_score),
            confidence: confidence_for(net_score),
            reasons: tally.reasons,
            bullish_score: tally.bullish,
            bearish_score: tally.bearish,
            net_score,
        };

        debug!(
            overall = %result.overall,
            bullish = result.bullish_score,
            bearish = result.bearish_score,
            confidence = result.confidence,
            "시그널 스코어 계산"
        );

        result
    }
}

/// 기본 가중치로 스냅샷 스코어링.
pub fn score(snapshot: &IndicatorSnapshot) -> ScoredSignal {
    SignalScorer::new().score(snapshot)
}
