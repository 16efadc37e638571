//! 앙상블 가격 예측기.
//!
//! 1. 선형 회귀 (인덱스 → 가격), 신뢰도 = R² × 100
//! 2. 2차 다항 회귀, 신뢰도 = R² × 100
//! 3. 다중 구간 이동평균 (구간 길이 가중), 신뢰도 = (1 - 변동성) × 100, [20, 80]
//!
//! 최종 예측 = Σ(예측 × 신뢰도) / Σ신뢰도, 최종 신뢰도 = 세 신뢰도의 단순 평균,
//! 예측 범위 = 예측 ± |예측| × 변동성.

use serde::{Deserialize, Serialize};
use tracing::debug;
use trader_core::relative_volatility;

use super::regression::{LinearRegression, PolynomialRegression, RegressionModel};

/// 예측기 파라미터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    /// 모델 계산에 필요한 최소 데이터 수
    #[serde(default = "default_min_points")]
    pub min_points: usize,
    /// 이동평균 구간들 (구간 길이로 가중)
    #[serde(default = "default_ma_windows")]
    pub ma_windows: Vec<usize>,
    /// 상대 변동성 계산 구간
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,
    /// 데이터 부족/신뢰도 0일 때의 대체 범위 비율
    #[serde(default = "default_fallback_band")]
    pub fallback_band: f64,
    /// 다항 회귀 차수
    #[serde(default = "default_polynomial_degree")]
    pub polynomial_degree: usize,
}

fn default_min_points() -> usize {
    10
}

fn default_ma_windows() -> Vec<usize> {
    vec![5, 10, 20]
}

fn default_volatility_window() -> usize {
    20
}

fn default_fallback_band() -> f64 {
    0.02
}

fn default_polynomial_degree() -> usize {
    2
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            min_points: default_min_points(),
            ma_windows: default_ma_windows(),
            volatility_window: default_volatility_window(),
            fallback_band: default_fallback_band(),
            polynomial_degree: default_polynomial_degree(),
        }
    }
}

impl ForecastParams {
    /// 파라미터 검증.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_points < 2 {
            return Err("min_points는 2 이상이어야 합니다".to_string());
        }
        if self.volatility_window == 0 {
            return Err("volatility_window는 0보다 커야 합니다".to_string());
        }
        if self.ma_windows.iter().any(|&w| w == 0) {
            return Err("ma_windows에 0이 포함될 수 없습니다".to_string());
        }
        if !(0.0..1.0).contains(&self.fallback_band) {
            return Err("fallback_band는 0 이상 1 미만이어야 합니다".to_string());
        }
        Ok(())
    }
}

/// 예측 범위.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// 중심값 ± |중심값| × 비율.
    pub fn around(center: f64, ratio: f64) -> Self {
        let half = center.abs() * ratio.max(0.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// 값이 범위 안에 있는지 확인.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// 개별 모델 예측.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelForecast {
    pub prediction: f64,
    /// 0 ~ 100
    pub confidence: f64,
}

/// 모델별 예측 (적합 실패한 모델은 None).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastComponents {
    pub linear: Option<ModelForecast>,
    pub polynomial: Option<ModelForecast>,
    pub moving_average: Option<ModelForecast>,
}

impl ForecastComponents {
    fn models(&self) -> [Option<ModelForecast>; 3] {
        [self.linear, self.polynomial, self.moving_average]
    }
}

/// 가격 예측 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// 다음 시점 예측 가격
    pub prediction: f64,
    /// 0 ~ 100
    pub confidence: f64,
    /// 항상 prediction을 포함하는 범위
    pub range: PriceRange,
    /// 최근 구간 상대 변동성
    pub volatility: f64,
    pub components: ForecastComponents,
}

impl Forecast {
    fn degenerate(last: f64, band: f64) -> Self {
        Self {
            prediction: last,
            confidence: 0.0,
            range: PriceRange::around(last, band),
            volatility: 0.0,
            components: ForecastComponents::default(),
        }
    }
}

/// R² → 신뢰도 (0 ~ 100).
fn r_squared_confidence<M: RegressionModel>(model: &M) -> f64 {
    (model.r_squared() * 100.0).clamp(0.0, 100.0)
}

/// 앙상블 가격 예측기.
#[derive(Debug, Clone, Default)]
pub struct PriceForecaster {
    params: ForecastParams,
}

impl PriceForecaster {
    /// 기본 파라미터 예측기.
    pub fn new() -> Self {
        Self::default()
    }

    /// 파라미터 지정.
    pub fn with_params(params: ForecastParams) -> Self {
        Self { params }
    }

    /// 현재 파라미터.
    pub fn params(&self) -> &ForecastParams {
        &self.params
    }

    /// 가격 시계열로 다음 시점 예측.
    ///
    /// 유한하지 않은 가격은 제외합니다. 빈 입력은 0 예측,
    /// 최소 데이터 수 미만은 마지막 가격 ± fallback_band를 반환합니다.
    pub fn forecast(&self, prices: &[f64]) -> Forecast {
        let prices: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
        let params = &self.params;

        let Some(&last) = prices.last() else {
            return Forecast::degenerate(0.0, 0.0);
        };
        if prices.len() < params.min_points {
            return Forecast::degenerate(last, params.fallback_band);
        }

        let volatility = relative_volatility(&prices, params.volatility_window);
        let xs: Vec<f64> = (0..prices.len()).map(|i| i as f64).collect();
        let next_x = prices.len() as f64;

        let components = ForecastComponents {
            linear: LinearRegression::fit(&xs, &prices).map(|m| ModelForecast {
                prediction: m.predict(next_x),
                confidence: r_squared_confidence(&m),
            }),
            polynomial: PolynomialRegression::fit(&xs, &prices, params.polynomial_degree).map(
                |m| ModelForecast {
                    prediction: m.predict(next_x),
                    confidence: r_squared_confidence(&m),
                },
            ),
            moving_average: self.moving_average(&prices, volatility),
        };

        let models = components.models();
        let total_confidence: f64 = models.iter().flatten().map(|m| m.confidence).sum();
        let confidence = total_confidence / models.len() as f64;

        let weighted: f64 = models
            .iter()
            .flatten()
            .map(|m| m.prediction * m.confidence)
            .sum();
        let prediction = weighted / total_confidence;

        if total_confidence <= 0.0 || !prediction.is_finite() {
            let mut fallback = Forecast::degenerate(last, params.fallback_band);
            fallback.volatility = volatility;
            fallback.components = components;
            return fallback;
        }

        let forecast = Forecast {
            prediction,
            confidence,
            range: PriceRange::around(prediction, volatility),
            volatility,
            components,
        };

        debug!(
            points = prices.len(),
            prediction = forecast.prediction,
            confidence = forecast.confidence,
            volatility,
            "가격 예측 완료"
        );

        forecast
    }

    /// 다중 구간 이동평균 예측. 시계열보다 긴 구간은 건너뜁니다.
    fn moving_average(&self, prices: &[f64], volatility: f64) -> Option<ModelForecast> {
        let (weighted, total_weight) = self
            .params
            .ma_windows
            .iter()
            .filter(|&&w| w > 0 && w <= prices.len())
            .fold((0.0, 0.0), |(sum, weight), &w| {
                let recent = &prices[prices.len() - w..];
                let avg = recent.iter().sum::<f64>() / w as f64;
                (sum + avg * w as f64, weight + w as f64)
            });

        if total_weight == 0.0 {
            return None;
        }

        Some(ModelForecast {
            prediction: weighted / total_weight,
            confidence: ((1.0 - volatility) * 100.0).clamp(20.0, 80.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series() {
        let forecast = PriceForecaster::new().forecast(&[]);
        assert_eq!(forecast.prediction, 0.0);
        assert_eq!(forecast.confidence, 0.0);
        assert_eq!(forecast.range, PriceRange { min: 0.0, max: 0.0 });
    }

    #[test]
    fn test_short_series_degenerates() {
        let forecast = PriceForecaster::new().forecast(&[100.0; 9]);
        assert_eq!(forecast.prediction, 100.0);
        assert_eq!(forecast.confidence, 0.0);
        assert!((forecast.range.min - 98.0).abs() < 1e-9);
        assert!((forecast.range.max - 102.0).abs() < 1e-9);
        assert!(forecast.components.linear.is_none());
    }

    #[test]
    fn test_linear_trend_forecast() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let forecast = PriceForecaster::new().forecast(&prices);

        let linear = forecast.components.linear.unwrap();
        assert!((linear.prediction - 130.0).abs() < 1e-6);
        assert!((linear.confidence - 100.0).abs() < 1e-6);

        // 이동평균은 추세에 뒤처지므로 앙상블 예측은 선형 예측보다 낮음
        let ma = forecast.components.moving_average.unwrap();
        assert!(ma.prediction < 130.0);
        assert!((20.0..=80.0).contains(&ma.confidence));
        assert!(forecast.prediction < 130.0);
        assert!(forecast.prediction > ma.prediction);
        assert!(forecast.range.contains(forecast.prediction));
    }

    #[test]
    fn test_flat_series_uses_moving_average_only() {
        let forecast = PriceForecaster::new().forecast(&[50.0; 15]);

        assert_eq!(forecast.components.linear.unwrap().confidence, 0.0);
        let ma = forecast.components.moving_average.unwrap();
        assert_eq!(ma.confidence, 80.0);
        assert!((forecast.prediction - 50.0).abs() < 1e-9);
        // 변동성 0 → 범위 폭 0
        assert_eq!(forecast.range.min, forecast.range.max);
        assert!((forecast.confidence - 80.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_moving_average_skips_long_windows() {
        let prices: Vec<f64> = (0..12).map(|i| i as f64 + 1.0).collect();
        let ma = PriceForecaster::new()
            .moving_average(&prices, 0.0)
            .unwrap();
        // 구간 5: 평균 10, 구간 10: 평균 7.5 → (50 + 75) / 15
        assert!((ma.prediction - 125.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_prices_filtered() {
        let mut prices = vec![100.0; 12];
        prices.push(f64::NAN);
        let forecast = PriceForecaster::new().forecast(&prices);
        assert!(forecast.prediction.is_finite());
        assert!((forecast.prediction - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_params_validation() {
        assert!(ForecastParams::default().validate().is_ok());
        let params = ForecastParams {
            ma_windows: vec![5, 0],
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
