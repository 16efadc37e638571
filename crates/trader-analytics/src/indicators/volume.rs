//! 거래량 지표 (Volume Indicators).
//!
//! - OBV (On-Balance Volume): 종가 상승일 거래량 누적, 하락일 차감

use ta::indicators::OnBalanceVolume;
use ta::Next;
use trader_core::Candle;

use super::{check_input, warmed_up, Bar, IndicatorResult};

/// 거래량 지표 계산기.
#[derive(Debug, Default, Clone, Copy)]
pub struct VolumeIndicators;

impl VolumeIndicators {
    /// 새로운 거래량 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// OBV 계산.
    ///
    /// 첫 캔들의 OBV는 해당 캔들 거래량부터 시작합니다.
    pub fn obv(&self, candles: &[Candle]) -> IndicatorResult<Vec<Option<f64>>> {
        check_input(1, 1, candles.len())?;

        let mut obv = OnBalanceVolume::new();
        let values: Vec<f64> = candles.iter().map(|c| obv.next(&Bar(c))).collect();

        Ok(warmed_up(values, 1))
    }
}
