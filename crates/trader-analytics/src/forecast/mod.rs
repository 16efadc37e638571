//! 가격 예측.
//!
//! 선형 회귀, 2차 다항 회귀, 다중 구간 이동평균 세 모델을
//! 신뢰도 가중 평균으로 결합해 다음 시점 가격을 예측합니다.

pub mod forecaster;
pub mod regression;

pub use forecaster::{
    Forecast, ForecastComponents, ForecastParams, ModelForecast, PriceForecaster, PriceRange,
};
pub use regression::{LinearRegression, PolynomialRegression, RegressionModel};
