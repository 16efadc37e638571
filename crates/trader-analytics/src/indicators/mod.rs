//! 기술적 지표 모듈.
//!
//! 캔들 시계열로부터 기술적 지표를 계산하고 분류합니다.
//! 수치 계산은 ta-rs 라이브러리에 위임하며, ta-rs가 제공하지 않는 지표
//! (ADX, Williams %R, CCI, 지지/저항, 피보나치, 캔들 패턴)는 직접 구현합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA / EMA**: 단순/지수 이동평균
//! - **MACD**: 이동평균 수렴/확산
//! - **ADX**: 평균 방향성 지수 (+DI / -DI 포함)
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수
//! - **Stochastic**: 스토캐스틱 오실레이터
//! - **Williams %R**, **CCI**
//!
//! ## 변동성 / 거래량 지표
//! - **Bollinger Bands**, **ATR**, **OBV**
//!
//! # 사용 예시
//!
//! ```ignore
//! use trader_analytics::indicators::{IndicatorEngine, RsiParams, compute_snapshot};
//!
//! let engine = IndicatorEngine::new();
//! let rsi = engine.rsi(&closes, RsiParams::default())?;
//!
//! // 최신 값 기준 스냅샷
//! let snapshot = compute_snapshot(&candles);
//! ```

pub mod candle_patterns;
pub mod levels;
pub mod momentum;
pub mod snapshot;
pub mod trend;
pub mod volatility;
pub mod volume;

use thiserror::Error;
use trader_core::{Candle, DecimalExt};

pub use candle_patterns::{
    detect_patterns, detect_patterns_with, CandlePatternParams, CandlePatternType, CandlePatterns,
    PatternBias,
};
pub use levels::{fibonacci_levels, support_resistance, FibonacciLevels, SupportResistance};
pub use momentum::{
    CciParams, MomentumCalculator, RsiParams, StochasticParams, StochasticResult,
    WilliamsRParams,
};
pub use snapshot::{
    compute_snapshot, AdxReading, BollingerReading, CciReading, IndicatorAdapter,
    IndicatorSnapshot, MacdReading, MacdTrend, MovingAverages, ObvReading, OscillatorZone,
    RsiReading, StochasticReading, TrendDirection, TrendStrength, VolumeTrend, WilliamsReading,
};
pub use trend::{AdxParams, AdxResult, EmaParams, MacdParams, MacdResult, SmaParams, TrendIndicators};
pub use volatility::{AtrParams, BollingerBandsParams, BollingerBandsResult, VolatilityIndicators};
pub use volume::VolumeIndicators;

/// 지표 계산 오류.
#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

impl From<ta::errors::TaError> for IndicatorError {
    fn from(err: ta::errors::TaError) -> Self {
        IndicatorError::InvalidParameter(format!("{:?}", err))
    }
}

/// ta-rs 입력용 캔들 래퍼.
pub(crate) struct Bar<'a>(pub(crate) &'a Candle);

impl ta::Open for Bar<'_> {
    fn open(&self) -> f64 {
        self.0.open.to_f64_or_zero()
    }
}

impl ta::High for Bar<'_> {
    fn high(&self) -> f64 {
        self.0.high.to_f64_or_zero()
    }
}

impl ta::Low for Bar<'_> {
    fn low(&self) -> f64 {
        self.0.low.to_f64_or_zero()
    }
}

impl ta::Close for Bar<'_> {
    fn close(&self) -> f64 {
        self.0.close.to_f64_or_zero()
    }
}

impl ta::Volume for Bar<'_> {
    fn volume(&self) -> f64 {
        self.0.volume.to_f64_or_zero()
    }
}

/// 기간 및 데이터 길이 검증.
pub(crate) fn check_input(period: usize, required: usize, provided: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }
    if provided < required {
        return Err(IndicatorError::InsufficientData { required, provided });
    }
    Ok(())
}

/// 워밍업 구간(처음 `warmup - 1`개)을 None으로 표시한 시계열.
pub(crate) fn warmed_up<I>(values: I, warmup: usize) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i + 1 >= warmup && v.is_finite()).then_some(v))
        .collect()
}

/// 시계열의 가장 최근 값.
pub fn latest<T: Copy>(series: &[Option<T>]) -> Option<T> {
    series.last().copied().flatten()
}

/// 통합 지표 엔진.
///
/// 모든 기술적 지표 계산을 위한 통합 인터페이스를 제공합니다.
/// 각 메서드는 입력과 같은 길이의 인덱스별 시계열을 반환합니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
    volume: VolumeIndicators,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 추세 지표 ====================

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// # 반환
    /// 계산된 SMA 값들의 벡터 (처음 period-1개는 None)
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.trend.sma(prices, params)
    }

    /// 지수 이동평균 (EMA) 계산.
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.trend.ema(prices, params)
    }

    /// MACD 계산.
    ///
    /// # 반환
    /// MACD 라인, 시그널 라인, 히스토그램
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        self.trend.macd(prices, params)
    }

    /// ADX (+DI, -DI 포함) 계산.
    pub fn adx(&self, candles: &[Candle], params: AdxParams) -> IndicatorResult<Vec<AdxResult>> {
        self.trend.adx(candles, params)
    }

    // ==================== 모멘텀 지표 ====================

    /// RSI 계산.
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.momentum.rsi(prices, params)
    }

    /// 스토캐스틱 오실레이터 계산.
    pub fn stochastic(
        &self,
        candles: &[Candle],
        params: StochasticParams,
    ) -> IndicatorResult<Vec<StochasticResult>> {
        self.momentum.stochastic(candles, params)
    }

    /// Williams %R 계산 (-100 ~ 0).
    pub fn williams_r(
        &self,
        candles: &[Candle],
        params: WilliamsRParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        self.momentum.williams_r(candles, params)
    }

    /// CCI (Commodity Channel Index) 계산.
    pub fn cci(&self, candles: &[Candle], params: CciParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.momentum.cci(candles, params)
    }

    // ==================== 변동성 지표 ====================

    /// 볼린저 밴드 계산.
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        self.volatility.bollinger_bands(prices, params)
    }

    /// ATR (Average True Range) 계산.
    pub fn atr(&self, candles: &[Candle], params: AtrParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.volatility.atr(candles, params)
    }

    // ==================== 거래량 지표 ====================

    /// OBV (On-Balance Volume) 계산.
    pub fn obv(&self, candles: &[Candle]) -> IndicatorResult<Vec<Option<f64>>> {
        self.volume.obv(candles)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use trader_core::{decimal_from_f64, Candle};

    /// 종가 시계열로 테스트 캔들 생성 (고가/저가 ±1).
    pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open = if i == 0 { close } else { closes[i - 1] };
                let c = decimal_from_f64(close);
                let o = decimal_from_f64(open);
                Candle::new(
                    o,
                    o.max(c) + Decimal::ONE,
                    o.min(c) - Decimal::ONE,
                    c,
                    Decimal::from(1000 + i as i64),
                    start + Duration::days(i as i64),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_input() {
        assert!(check_input(14, 14, 20).is_ok());
        assert_eq!(
            check_input(14, 14, 5),
            Err(IndicatorError::InsufficientData { required: 14, provided: 5 })
        );
        assert!(matches!(
            check_input(0, 0, 5),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_warmed_up_marks_leading_none() {
        let series = warmed_up(vec![1.0, 2.0, 3.0, f64::NAN], 2);
        assert_eq!(series, vec![None, Some(2.0), Some(3.0), None]);
    }

    #[test]
    fn test_latest() {
        assert_eq!(latest(&[Some(1.0), Some(2.0)]), Some(2.0));
        assert_eq!(latest::<f64>(&[Some(1.0), None]), None);
        assert_eq!(latest::<f64>(&[]), None);
    }
}
