//! 모멘텀 지표 (Momentum Indicators).
//!
//! 가격 모멘텀과 과매수/과매도 상태를 측정하는 지표들을 제공합니다.
//! - RSI (Relative Strength Index)
//! - Stochastic Oscillator
//! - Williams %R
//! - CCI (Commodity Channel Index)

use serde::{Deserialize, Serialize};
use ta::indicators::{FastStochastic, RelativeStrengthIndex, SimpleMovingAverage};
use ta::Next;
use trader_core::{Candle, DecimalExt};

use super::{check_input, warmed_up, Bar, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 스토캐스틱 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticParams {
    /// %K 기간 (기본: 14).
    pub k_period: usize,
    /// %D 기간 (smoothing, 기본: 3).
    pub d_period: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

/// 스토캐스틱 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticResult {
    /// %K (Fast Stochastic).
    pub k: Option<f64>,
    /// %D (%K의 이동평균).
    pub d: Option<f64>,
}

/// Williams %R 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WilliamsRParams {
    /// 조회 기간 (기본: 14).
    pub period: usize,
}

impl Default for WilliamsRParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// CCI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CciParams {
    /// 조회 기간 (기본: 20).
    pub period: usize,
    /// Lambert 상수 (기본: 0.015).
    pub constant: f64,
}

impl Default for CciParams {
    fn default() -> Self {
        Self {
            period: 20,
            constant: 0.015,
        }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default, Clone, Copy)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들 (처음 period-1개는 None)
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        check_input(params.period, params.period, prices.len())?;

        let mut rsi = RelativeStrengthIndex::new(params.period)?;
        let values: Vec<f64> = prices.iter().map(|&p| rsi.next(p)).collect();

        Ok(warmed_up(values, params.period))
    }

    /// 스토캐스틱 오실레이터 계산.
    ///
    /// %K = (현재가 - 최저가) / (최고가 - 최저가) × 100
    /// %D = %K의 이동평균
    pub fn stochastic(
        &self,
        candles: &[Candle],
        params: StochasticParams,
    ) -> IndicatorResult<Vec<StochasticResult>> {
        check_input(params.k_period.min(params.d_period), params.k_period, candles.len())?;

        let mut fast = FastStochastic::new(params.k_period)?;
        let mut smoothing = SimpleMovingAverage::new(params.d_period)?;
        let mut k_count = 0usize;

        let result = candles
            .iter()
            .enumerate()
            .map(|(i, candle)| {
                let k = fast.next(&Bar(candle));
                if i + 1 < params.k_period {
                    return StochasticResult { k: None, d: None };
                }

                k_count += 1;
                let d = smoothing.next(k);
                StochasticResult {
                    k: Some(k),
                    d: (k_count >= params.d_period).then_some(d),
                }
            })
            .collect();

        Ok(result)
    }

    /// Williams %R 계산.
    ///
    /// %R = (최고가 - 종가) / (최고가 - 최저가) × -100
    /// 범위가 0이면 중간값(-50)을 사용합니다.
    pub fn williams_r(
        &self,
        candles: &[Candle],
        params: WilliamsRParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;
        check_input(period, period, candles.len())?;

        let mut result = vec![None; candles.len()];
        for i in (period - 1)..candles.len() {
            let window = &candles[i + 1 - period..=i];
            let highest = window
                .iter()
                .map(|c| c.high.to_f64_or_zero())
                .fold(f64::MIN, f64::max);
            let lowest = window
                .iter()
                .map(|c| c.low.to_f64_or_zero())
                .fold(f64::MAX, f64::min);
            let close = candles[i].close.to_f64_or_zero();

            let range = highest - lowest;
            result[i] = Some(if range > 0.0 {
                (highest - close) / range * -100.0
            } else {
                -50.0
            });
        }

        Ok(result)
    }

    /// CCI (Commodity Channel Index) 계산.
    ///
    /// CCI = (TP - SMA(TP)) / (상수 × 평균편차), TP = (고가 + 저가 + 종가) / 3
    /// 평균편차가 0이면 0을 반환합니다.
    pub fn cci(&self, candles: &[Candle], params: CciParams) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;
        check_input(period, period, candles.len())?;

        let typical: Vec<f64> = candles
            .iter()
            .map(|c| c.typical_price().to_f64_or_zero())
            .collect();

        let values = (0..typical.len()).map(|i| {
            if i + 1 < period {
                return f64::NAN;
            }
            let window = &typical[i + 1 - period..=i];
            let sma = window.iter().sum::<f64>() / period as f64;
            let mean_dev = window.iter().map(|tp| (tp - sma).abs()).sum::<f64>() / period as f64;

            if mean_dev == 0.0 || params.constant == 0.0 {
                0.0
            } else {
                (typical[i] - sma) / (params.constant * mean_dev)
            }
        });

        Ok(warmed_up(values, period))
    }
}
