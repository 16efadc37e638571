//! 추세 지표 (Trend Indicators).
//!
//! 가격 추세의 방향과 강도를 측정하는 지표들을 제공합니다.
//! - SMA / EMA (ta-rs)
//! - MACD (ta-rs)
//! - ADX, +DI, -DI (Wilder 평활화, 직접 구현)

use serde::{Deserialize, Serialize};
use ta::indicators::{
    ExponentialMovingAverage, MovingAverageConvergenceDivergence, SimpleMovingAverage,
};
use ta::Next;
use trader_core::{Candle, DecimalExt};

use super::{check_input, warmed_up, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<f64>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<f64>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<f64>,
}

/// ADX 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdxParams {
    /// 평활 기간 (기본: 14).
    pub period: usize,
}

impl Default for AdxParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// ADX 결과.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AdxResult {
    /// ADX (0 ~ 100). 2 × period 개 캔들부터 계산.
    pub adx: Option<f64>,
    /// +DI. period + 1 개 캔들부터 계산.
    pub plus_di: Option<f64>,
    /// -DI.
    pub minus_di: Option<f64>,
}

/// 추세 지표 계산기.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA).
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        check_input(params.period, params.period, prices.len())?;

        let mut sma = SimpleMovingAverage::new(params.period)?;
        let values: Vec<f64> = prices.iter().map(|&p| sma.next(p)).collect();

        Ok(warmed_up(values, params.period))
    }

    /// 지수 이동평균 (EMA).
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        check_input(params.period, params.period, prices.len())?;

        let mut ema = ExponentialMovingAverage::new(params.period)?;
        let values: Vec<f64> = prices.iter().map(|&p| ema.next(p)).collect();

        Ok(warmed_up(values, params.period))
    }

    /// MACD.
    ///
    /// 장기 EMA 기간만큼의 데이터가 있어야 계산합니다.
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        let required = params.slow_period.max(params.fast_period);
        check_input(params.fast_period.min(params.signal_period), required, prices.len())?;

        let mut macd = MovingAverageConvergenceDivergence::new(
            params.fast_period,
            params.slow_period,
            params.signal_period,
        )?;

        let result = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let out = macd.next(p);
                if i + 1 >= required {
                    MacdResult {
                        macd: Some(out.macd),
                        signal: Some(out.signal),
                        histogram: Some(out.histogram),
                    }
                } else {
                    MacdResult {
                        macd: None,
                        signal: None,
                        histogram: None,
                    }
                }
            })
            .collect();

        Ok(result)
    }

    /// ADX (Average Directional Index).
    ///
    /// TR, +DM, -DM을 Wilder 방식으로 평활화한 뒤
    /// DX = |+DI - -DI| / (+DI + -DI) × 100 의 Wilder 평균을 ADX로 사용합니다.
    pub fn adx(&self, candles: &[Candle], params: AdxParams) -> IndicatorResult<Vec<AdxResult>> {
        let period = params.period;
        check_input(period, period * 2, candles.len())?;

        let highs: Vec<f64> = candles.iter().map(|c| c.high.to_f64_or_zero()).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low.to_f64_or_zero()).collect();
        let closes: Vec<f64> = candles.iter().map(|c| c.close.to_f64_or_zero()).collect();

        let mut result = vec![AdxResult::default(); candles.len()];

        let p = period as f64;
        let mut smoothed_tr = 0.0;
        let mut smoothed_plus = 0.0;
        let mut smoothed_minus = 0.0;
        let mut dx_values = Vec::with_capacity(candles.len());
        let mut adx: Option<f64> = None;

        for i in 1..candles.len() {
            let tr = (highs[i] - lows[i])
                .max((highs[i] - closes[i - 1]).abs())
                .max((lows[i] - closes[i - 1]).abs());

            let up_move = highs[i] - highs[i - 1];
            let down_move = lows[i - 1] - lows[i];
            let plus_dm = if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 };
            let minus_dm = if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 };

            if i <= period {
                // 초기값은 단순 합계
                smoothed_tr += tr;
                smoothed_plus += plus_dm;
                smoothed_minus += minus_dm;
                if i < period {
                    continue;
                }
            } else {
                smoothed_tr = smoothed_tr - smoothed_tr / p + tr;
                smoothed_plus = smoothed_plus - smoothed_plus / p + plus_dm;
                smoothed_minus = smoothed_minus - smoothed_minus / p + minus_dm;
            }

            let (plus_di, minus_di) = if smoothed_tr > 0.0 {
                (
                    100.0 * smoothed_plus / smoothed_tr,
                    100.0 * smoothed_minus / smoothed_tr,
                )
            } else {
                (0.0, 0.0)
            };

            let di_sum = plus_di + minus_di;
            let dx = if di_sum > 0.0 {
                100.0 * (plus_di - minus_di).abs() / di_sum
            } else {
                0.0
            };
            dx_values.push(dx);

            adx = match adx {
                Some(prev) => Some((prev * (p - 1.0) + dx) / p),
                None if dx_values.len() == period => Some(dx_values.iter().sum::<f64>() / p),
                None => None,
            };

            result[i] = AdxResult {
                adx,
                plus_di: Some(plus_di),
                minus_di: Some(minus_di),
            };
        }

        Ok(result)
    }
}
