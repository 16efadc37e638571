//! 지표 스냅샷 (Indicator Adapter).
//!
//! 캔들 시계열에서 각 지표의 최신 값을 뽑아 분류 규칙을 적용한 스냅샷을 만듭니다.
//! 히스토리가 부족한 지표는 에러 대신 `None`이 됩니다.

use serde::{Deserialize, Serialize};
use tracing::debug;
use trader_core::{closes_f64, Candle};

use super::candle_patterns::{detect_patterns, CandlePatterns};
use super::levels::{
    fibonacci_levels, support_resistance, FibonacciLevels, SupportResistance, FIBONACCI_WINDOW,
    SUPPORT_RESISTANCE_WINDOW,
};
use super::{
    latest, AdxParams, AtrParams, BollingerBandsParams, CciParams, EmaParams, IndicatorEngine,
    MacdParams, RsiParams, SmaParams, StochasticParams, WilliamsRParams,
};

/// 볼린저 스퀴즈 판단 기준 (밴드 폭 / 중간 밴드).
pub const SQUEEZE_THRESHOLD: f64 = 0.1;

/// 오실레이터 구간 (RSI, 스토캐스틱, Williams %R, CCI 공용).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OscillatorZone {
    Oversold,
    Neutral,
    Overbought,
}

impl OscillatorZone {
    /// 하한/상한 기준 분류. 하한 미만이면 과매도, 상한 초과면 과매수.
    pub fn classify(value: f64, lower: f64, upper: f64) -> Self {
        if value < lower {
            Self::Oversold
        } else if value > upper {
            Self::Overbought
        } else {
            Self::Neutral
        }
    }
}

/// MACD 추세.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MacdTrend {
    Bullish,
    Bearish,
    Neutral,
}

/// 이동평균 배열로 본 추세 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Uptrend,
    Downtrend,
    Sideways,
}

/// ADX 추세 강도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendStrength {
    Weak,
    Strong,
    VeryStrong,
}

impl TrendStrength {
    /// ADX > 50 매우 강함, > 25 강함, 그 외 약함.
    pub fn from_adx(adx: f64) -> Self {
        if adx > 50.0 {
            Self::VeryStrong
        } else if adx > 25.0 {
            Self::Strong
        } else {
            Self::Weak
        }
    }

    /// 강한 추세(Strong 이상) 여부.
    pub fn is_strong(self) -> bool {
        matches!(self, Self::Strong | Self::VeryStrong)
    }
}

/// OBV 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeTrend {
    Rising,
    Falling,
    Flat,
}

/// RSI 값과 구간.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64,
    pub zone: OscillatorZone,
}

impl RsiReading {
    /// RSI < 30 과매도, > 70 과매수.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            zone: OscillatorZone::classify(value, 30.0, 70.0),
        }
    }
}

/// MACD 최신 값과 추세.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub trend: MacdTrend,
}

impl MacdReading {
    /// MACD > 시그널이면 강세, < 이면 약세.
    pub fn new(macd: f64, signal: f64) -> Self {
        let trend = if macd > signal {
            MacdTrend::Bullish
        } else if macd < signal {
            MacdTrend::Bearish
        } else {
            MacdTrend::Neutral
        };
        Self {
            macd,
            signal,
            histogram: macd - signal,
            trend,
        }
    }
}

/// 볼린저 밴드 최신 값과 스퀴즈 여부.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// 스퀴즈: (상단 - 하단) / 중간 < 0.1. 중간 밴드가 0이면 false.
    pub squeeze: bool,
}

impl BollingerReading {
    pub fn new(upper: f64, middle: f64, lower: f64) -> Self {
        let squeeze = middle != 0.0 && (upper - lower) / middle < SQUEEZE_THRESHOLD;
        Self {
            upper,
            middle,
            lower,
            squeeze,
        }
    }
}

/// 이동평균과 배열 추세.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub ema12: Option<f64>,
    pub ema26: Option<f64>,
    /// SMA20/SMA50이 없으면 None.
    pub trend: Option<TrendDirection>,
}

impl MovingAverages {
    /// SMA 값들로 추세 분류.
    ///
    /// sma20 > sma50 > sma200 상승, 역순이면 하락, 그 외 횡보.
    /// SMA200이 없으면 횡보로 봅니다.
    pub fn classify_trend(
        sma20: Option<f64>,
        sma50: Option<f64>,
        sma200: Option<f64>,
    ) -> Option<TrendDirection> {
        let (s20, s50) = (sma20?, sma50?);
        let trend = match sma200 {
            Some(s200) if s20 > s50 && s50 > s200 => TrendDirection::Uptrend,
            Some(s200) if s20 < s50 && s50 < s200 => TrendDirection::Downtrend,
            _ => TrendDirection::Sideways,
        };
        Some(trend)
    }

    /// 추세만 지정한 이동평균 묶음.
    pub fn with_trend(trend: TrendDirection) -> Self {
        Self {
            trend: Some(trend),
            ..Default::default()
        }
    }
}

/// 스토캐스틱 최신 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticReading {
    pub k: f64,
    pub d: Option<f64>,
    pub zone: OscillatorZone,
}

impl StochasticReading {
    /// %K < 20 과매도, > 80 과매수.
    pub fn new(k: f64, d: Option<f64>) -> Self {
        Self {
            k,
            d,
            zone: OscillatorZone::classify(k, 20.0, 80.0),
        }
    }
}

/// ADX 최신 값과 강도.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxReading {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub strength: TrendStrength,
}

impl AdxReading {
    pub fn new(adx: f64, plus_di: f64, minus_di: f64) -> Self {
        Self {
            adx,
            plus_di,
            minus_di,
            strength: TrendStrength::from_adx(adx),
        }
    }
}

/// Williams %R 최신 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WilliamsReading {
    pub value: f64,
    pub zone: OscillatorZone,
}

impl WilliamsReading {
    /// %R < -80 과매도, > -20 과매수.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            zone: OscillatorZone::classify(value, -80.0, -20.0),
        }
    }
}

/// CCI 최신 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CciReading {
    pub value: f64,
    pub zone: OscillatorZone,
}

impl CciReading {
    /// CCI < -100 과매도, > 100 과매수.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            zone: OscillatorZone::classify(value, -100.0, 100.0),
        }
    }
}

/// OBV 최신 값과 방향.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObvReading {
    pub value: f64,
    pub previous: f64,
    pub trend: VolumeTrend,
}

impl ObvReading {
    pub fn new(value: f64, previous: f64) -> Self {
        let trend = if value > previous {
            VolumeTrend::Rising
        } else if value < previous {
            VolumeTrend::Falling
        } else {
            VolumeTrend::Flat
        };
        Self {
            value,
            previous,
            trend,
        }
    }
}

/// 시점별 지표 스냅샷.
///
/// 매 요청마다 새로 계산되며 저장되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<RsiReading>,
    pub macd: Option<MacdReading>,
    pub bollinger: Option<BollingerReading>,
    pub moving_averages: MovingAverages,
    pub stochastic: Option<StochasticReading>,
    pub adx: Option<AdxReading>,
    pub williams_r: Option<WilliamsReading>,
    pub cci: Option<CciReading>,
    pub atr: Option<f64>,
    pub obv: Option<ObvReading>,
    pub support_resistance: Option<SupportResistance>,
    pub fibonacci: Option<FibonacciLevels>,
    pub patterns: Option<CandlePatterns>,
}

impl IndicatorSnapshot {
    /// SMA 추세 (없으면 None).
    pub fn sma_trend(&self) -> Option<TrendDirection> {
        self.moving_averages.trend
    }
}

/// 캔들 → 지표 스냅샷 어댑터.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndicatorAdapter {
    engine: IndicatorEngine,
}

impl IndicatorAdapter {
    /// 새 어댑터 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 지표 스냅샷 계산.
    ///
    /// 빈 입력을 포함해 어떤 캔들 배열에서도 실패하지 않습니다.
    pub fn compute(&self, candles: &[Candle]) -> IndicatorSnapshot {
        let closes = closes_f64(candles);
        let engine = &self.engine;

        let rsi = engine
            .rsi(&closes, RsiParams::default())
            .ok()
            .and_then(|s| latest(&s))
            .map(RsiReading::new);

        let macd = engine
            .macd(&closes, MacdParams::default())
            .ok()
            .and_then(|s| s.last().copied())
            .and_then(|m| Some(MacdReading::new(m.macd?, m.signal?)));

        let bollinger = engine
            .bollinger_bands(&closes, BollingerBandsParams::default())
            .ok()
            .and_then(|s| s.last().copied())
            .and_then(|b| Some(BollingerReading::new(b.upper?, b.middle?, b.lower?)));

        let sma = |period| {
            engine
                .sma(&closes, SmaParams { period })
                .ok()
                .and_then(|s| latest(&s))
        };
        let ema = |period| {
            engine
                .ema(&closes, EmaParams { period })
                .ok()
                .and_then(|s| latest(&s))
        };
        let (sma20, sma50, sma200) = (sma(20), sma(50), sma(200));
        let moving_averages = MovingAverages {
            sma20,
            sma50,
            sma200,
            ema12: ema(12),
            ema26: ema(26),
            trend: MovingAverages::classify_trend(sma20, sma50, sma200),
        };

        let stochastic = engine
            .stochastic(candles, StochasticParams::default())
            .ok()
            .and_then(|s| s.last().copied())
            .and_then(|s| Some(StochasticReading::new(s.k?, s.d)));

        let adx = engine
            .adx(candles, AdxParams::default())
            .ok()
            .and_then(|s| s.last().copied())
            .and_then(|a| Some(AdxReading::new(a.adx?, a.plus_di?, a.minus_di?)));

        let williams_r = engine
            .williams_r(candles, WilliamsRParams::default())
            .ok()
            .and_then(|s| latest(&s))
            .map(WilliamsReading::new);

        let cci = engine
            .cci(candles, CciParams::default())
            .ok()
            .and_then(|s| latest(&s))
            .map(CciReading::new);

        let atr = engine
            .atr(candles, AtrParams::default())
            .ok()
            .and_then(|s| latest(&s));

        let obv = engine.obv(candles).ok().and_then(|s| match s.as_slice() {
            [.., Some(prev), Some(last)] => Some(ObvReading::new(*last, *prev)),
            _ => None,
        });

        let snapshot = IndicatorSnapshot {
            rsi,
            macd,
            bollinger,
            moving_averages,
            stochastic,
            adx,
            williams_r,
            cci,
            atr,
            obv,
            support_resistance: support_resistance(candles, SUPPORT_RESISTANCE_WINDOW),
            fibonacci: fibonacci_levels(candles, FIBONACCI_WINDOW),
            patterns: detect_patterns(candles),
        };

        debug!(
            candles = candles.len(),
            rsi = ?snapshot.rsi.map(|r| r.value),
            macd_trend = ?snapshot.macd.map(|m| m.trend),
            sma_trend = ?snapshot.moving_averages.trend,
            "지표 스냅샷 계산 완료"
        );

        snapshot
    }
}

/// 기본 어댑터로 스냅샷 계산.
pub fn compute_snapshot(candles: &[Candle]) -> IndicatorSnapshot {
    IndicatorAdapter::new().compute(candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::candles_from_closes;

    #[test]
    fn test_classification_thresholds() {
        assert_eq!(RsiReading::new(29.9).zone, OscillatorZone::Oversold);
        assert_eq!(RsiReading::new(30.0).zone, OscillatorZone::Neutral);
        assert_eq!(RsiReading::new(70.1).zone, OscillatorZone::Overbought);

        assert_eq!(TrendStrength::from_adx(25.0), TrendStrength::Weak);
        assert_eq!(TrendStrength::from_adx(25.1), TrendStrength::Strong);
        assert_eq!(TrendStrength::from_adx(50.1), TrendStrength::VeryStrong);

        assert_eq!(WilliamsReading::new(-85.0).zone, OscillatorZone::Oversold);
        assert_eq!(WilliamsReading::new(-10.0).zone, OscillatorZone::Overbought);
        assert_eq!(CciReading::new(150.0).zone, OscillatorZone::Overbought);
        assert_eq!(StochasticReading::new(15.0, None).zone, OscillatorZone::Oversold);
    }

    #[test]
    fn test_bollinger_squeeze() {
        assert!(BollingerReading::new(104.0, 100.0, 96.0).squeeze);
        assert!(!BollingerReading::new(110.0, 100.0, 90.0).squeeze);
        assert!(!BollingerReading::new(1.0, 0.0, -1.0).squeeze);
    }

    #[test]
    fn test_sma_trend_classification() {
        use TrendDirection::*;
        let classify = MovingAverages::classify_trend;
        assert_eq!(classify(Some(3.0), Some(2.0), Some(1.0)), Some(Uptrend));
        assert_eq!(classify(Some(1.0), Some(2.0), Some(3.0)), Some(Downtrend));
        assert_eq!(classify(Some(2.0), Some(3.0), Some(1.0)), Some(Sideways));
        assert_eq!(classify(Some(3.0), Some(2.0), None), Some(Sideways));
        assert_eq!(classify(None, Some(2.0), Some(1.0)), None);
    }

    #[test]
    fn test_macd_trend() {
        assert_eq!(MacdReading::new(1.0, 0.5).trend, MacdTrend::Bullish);
        assert_eq!(MacdReading::new(0.5, 1.0).trend, MacdTrend::Bearish);
        assert_eq!(MacdReading::new(1.0, 1.0).trend, MacdTrend::Neutral);
    }

    #[test]
    fn test_empty_candles_yield_empty_snapshot() {
        let snapshot = compute_snapshot(&[]);
        assert_eq!(snapshot, IndicatorSnapshot::default());
    }

    #[test]
    fn test_history_gating() {
        let closes: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        let snapshot = compute_snapshot(&candles_from_closes(&closes));

        assert!(snapshot.rsi.is_some());
        assert!(snapshot.atr.is_some());
        assert!(snapshot.stochastic.is_some());
        assert!(snapshot.williams_r.is_some());
        assert!(snapshot.bollinger.is_none());
        assert!(snapshot.cci.is_none());
        assert!(snapshot.macd.is_none());
        assert!(snapshot.adx.is_none());
        assert!(snapshot.moving_averages.trend.is_none());
        assert!(snapshot.obv.is_some());
        assert!(snapshot.patterns.is_some());
    }

    #[test]
    fn test_long_uptrend_snapshot() {
        let closes: Vec<f64> = (0..220).map(|i| 100.0 + i as f64 * 0.5).collect();
        let snapshot = compute_snapshot(&candles_from_closes(&closes));

        assert_eq!(snapshot.moving_averages.trend, Some(TrendDirection::Uptrend));
        assert_eq!(snapshot.macd.map(|m| m.trend), Some(MacdTrend::Bullish));
        assert_eq!(snapshot.obv.map(|o| o.trend), Some(VolumeTrend::Rising));
        assert!(snapshot.adx.unwrap().plus_di > snapshot.adx.unwrap().minus_di);
        assert!(snapshot.rsi.unwrap().value > 70.0);
    }
}
