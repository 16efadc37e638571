//! 시그널 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 계산 및 분류 (지표 스냅샷)
//! - 시그널 스코어링 (STRONG_BUY ~ STRONG_SELL)
//! - 시장 심리 집계
//! - 회귀 기반 가격 예측
//!
//! 모든 계산은 입력 배열에 대한 순수 함수이며 상태를 갖지 않습니다.
//!
//! # Re-exports
//!
//! - [`indicators`]: 지표 엔진과 스냅샷 (IndicatorEngine, IndicatorSnapshot 등)
//! - [`signal_scorer`]: 스냅샷 → ScoredSignal
//! - [`sentiment`]: 스냅샷 + 가격 변화율 → SentimentResult
//! - [`forecast`]: 가격 시계열 → Forecast

pub mod forecast;
pub mod indicators;
pub mod sentiment;
pub mod signal_scorer;

// Indicators 모듈 re-exports
pub use indicators::{
    compute_snapshot,
    // 분류 결과
    AdxReading,
    BollingerReading,
    CandlePatternType,
    CandlePatterns,
    CciReading,
    IndicatorAdapter,
    IndicatorEngine,
    IndicatorError,
    IndicatorResult,
    IndicatorSnapshot,
    MacdReading,
    MacdTrend,
    MovingAverages,
    ObvReading,
    OscillatorZone,
    RsiReading,
    StochasticReading,
    TrendDirection,
    TrendStrength,
    VolumeTrend,
    WilliamsReading,
};

// Signal Scorer 모듈 re-exports
pub use signal_scorer::{score, ScoredSignal, SignalLabel, SignalScorer, SignalWeights};

// Sentiment 모듈 re-exports
pub use sentiment::{aggregate, SentimentFactor, SentimentLabel, SentimentResult};

// Forecast 모듈 re-exports
pub use forecast::{
    Forecast, ForecastComponents, ForecastParams, LinearRegression, ModelForecast,
    PolynomialRegression, PriceForecaster, PriceRange, RegressionModel,
};
