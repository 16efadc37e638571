//! 변동성 지표 (Volatility Indicators).
//!
//! 가격 변동성을 측정하는 지표들을 제공합니다.
//! - Bollinger Bands (볼린저 밴드)
//! - ATR (Average True Range, 평균 실제 범위)

use serde::{Deserialize, Serialize};
use ta::indicators::{AverageTrueRange, BollingerBands};
use ta::Next;
use trader_core::Candle;

use super::{check_input, warmed_up, Bar, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: f64,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

/// 볼린저 밴드 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    /// 상단 밴드 (MA + k × σ).
    pub upper: Option<f64>,
    /// 중간 밴드 (이동평균).
    pub middle: Option<f64>,
    /// 하단 밴드 (MA - k × σ).
    pub lower: Option<f64>,
    /// 밴드 폭 ((상단 - 하단) / 중간). 중간 밴드가 0이면 None.
    pub bandwidth: Option<f64>,
}

impl BollingerBandsResult {
    fn empty() -> Self {
        Self {
            upper: None,
            middle: None,
            lower: None,
            bandwidth: None,
        }
    }
}

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default, Clone, Copy)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        check_input(params.period, params.period, prices.len())?;

        let mut bb = BollingerBands::new(params.period, params.std_dev_multiplier)?;

        let result = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let out = bb.next(p);
                if i + 1 < params.period {
                    return BollingerBandsResult::empty();
                }
                let bandwidth =
                    (out.average != 0.0).then(|| (out.upper - out.lower) / out.average);
                BollingerBandsResult {
                    upper: Some(out.upper),
                    middle: Some(out.average),
                    lower: Some(out.lower),
                    bandwidth,
                }
            })
            .collect();

        Ok(result)
    }

    /// ATR (Average True Range) 계산.
    ///
    /// TR = max(고가 - 저가, |고가 - 전일종가|, |저가 - 전일종가|)
    pub fn atr(&self, candles: &[Candle], params: AtrParams) -> IndicatorResult<Vec<Option<f64>>> {
        check_input(params.period, params.period, candles.len())?;

        let mut atr = AverageTrueRange::new(params.period)?;
        let values: Vec<f64> = candles.iter().map(|c| atr.next(&Bar(c))).collect();

        Ok(warmed_up(values, params.period))
    }
}
