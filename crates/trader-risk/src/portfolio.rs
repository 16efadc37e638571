//! 포트폴리오 리스크 평가.
//!
//! 보유 포지션과 종목별 일간 수익률 이력으로 노출, 집중도, 역사적 VaR,
//! 변동성을 계산하고 0-100 리스크 점수로 요약합니다.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trader_core::{
    decimal_from_f64, quantile, std_dev, DecimalExt, Position, TraderError, TraderResult,
};

/// 기본 VaR 신뢰수준.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

// 점수 정규화 기준
const GROSS_EXPOSURE_CAP: f64 = 150.0;
const VOLATILITY_CAP: f64 = 5.0;

/// 리스크 수준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            RiskLevel::Low
        } else if score < 50.0 {
            RiskLevel::Medium
        } else if score < 75.0 {
            RiskLevel::High
        } else {
            RiskLevel::Extreme
        }
    }
}

/// 포트폴리오 리스크 평가 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRiskAssessment {
    /// 총 노출 (절대 명목가치 합 / 포트폴리오, %)
    pub gross_exposure_pct: f64,
    /// 순 노출 (롱 - 숏, %)
    pub net_exposure_pct: f64,
    /// 가장 큰 종목 비중 (%)
    pub largest_position_pct: f64,
    /// 허핀달 집중도 지수 (0-1)
    pub concentration_index: f64,
    /// 가중 포트폴리오 일간 수익률
    pub portfolio_returns: Vec<f64>,
    /// 역사적 VaR (양수 손실 금액)
    pub value_at_risk: Decimal,
    pub confidence_level: f64,
    /// 일간 변동성 (%)
    pub volatility_pct: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

/// 포트폴리오 리스크를 평가합니다.
///
/// 수익률 이력이 없는 종목은 노출/집중도 계산에만 포함됩니다.
/// 종목별 이력 길이가 다르면 가장 최근 구간을 기준으로 맞춥니다.
pub fn assess_portfolio_risk(
    positions: &[Position],
    portfolio_value: Decimal,
    returns: &HashMap<String, Vec<f64>>,
    confidence_level: f64,
) -> TraderResult<PortfolioRiskAssessment> {
    if portfolio_value <= Decimal::ZERO {
        return Err(TraderError::InvalidInput(format!(
            "포트폴리오 가치는 0보다 커야 합니다: {}",
            portfolio_value
        )));
    }
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(TraderError::InvalidInput(format!(
            "신뢰수준은 0과 1 사이여야 합니다: {}",
            confidence_level
        )));
    }

    // 심볼별 부호 있는 명목가치
    let mut exposures: BTreeMap<&str, Decimal> = BTreeMap::new();
    for p in positions.iter().filter(|p| p.is_open()) {
        *exposures.entry(p.symbol.as_str()).or_default() +=
            p.current_price * p.signed_quantity();
    }

    let pv = portfolio_value.to_f64_or_zero();
    let gross: Decimal = exposures.values().map(|v| v.abs()).sum();
    let net: Decimal = exposures.values().copied().sum();
    let largest = exposures
        .values()
        .map(|v| v.abs())
        .max()
        .unwrap_or(Decimal::ZERO);

    let gross_f = gross.to_f64_or_zero();
    let concentration_index = if gross_f > 0.0 {
        exposures
            .values()
            .map(|v| {
                let share = v.abs().to_f64_or_zero() / gross_f;
                share * share
            })
            .sum()
    } else {
        0.0
    };

    let portfolio_returns = weighted_returns(&exposures, pv, returns);
    let volatility_pct = if portfolio_returns.len() >= 2 {
        std_dev(&portfolio_returns) * 100.0
    } else {
        0.0
    };
    let worst = quantile(&portfolio_returns, 1.0 - confidence_level).unwrap_or(0.0);
    let value_at_risk = decimal_from_f64((-worst).max(0.0)) * portfolio_value;

    let gross_exposure_pct = gross_f / pv * 100.0;
    let risk_score = 35.0 * (gross_exposure_pct / GROSS_EXPOSURE_CAP).min(1.0)
        + 30.0 * concentration_index
        + 35.0 * (volatility_pct / VOLATILITY_CAP).min(1.0);
    let risk_level = RiskLevel::from_score(risk_score);

    debug!(
        positions = exposures.len(),
        gross_exposure_pct,
        volatility_pct,
        var = %value_at_risk,
        risk_score,
        "포트폴리오 리스크 평가"
    );

    Ok(PortfolioRiskAssessment {
        gross_exposure_pct,
        net_exposure_pct: net.to_f64_or_zero() / pv * 100.0,
        largest_position_pct: largest.to_f64_or_zero() / pv * 100.0,
        concentration_index,
        portfolio_returns,
        value_at_risk,
        confidence_level,
        volatility_pct,
        risk_score,
        risk_level,
    })
}

/// 포트폴리오 가중 수익률 시계열.
fn weighted_returns(
    exposures: &BTreeMap<&str, Decimal>,
    portfolio_value: f64,
    returns: &HashMap<String, Vec<f64>>,
) -> Vec<f64> {
    let series: Vec<(f64, &[f64])> = exposures
        .iter()
        .filter_map(|(symbol, exposure)| {
            returns
                .get(*symbol)
                .filter(|r| !r.is_empty())
                .map(|r| (exposure.to_f64_or_zero() / portfolio_value, r.as_slice()))
        })
        .collect();

    let Some(len) = series.iter().map(|(_, r)| r.len()).min() else {
        return Vec::new();
    };

    (0..len)
        .map(|t| {
            series
                .iter()
                .map(|(weight, r)| {
                    let value = r[r.len() - len + t];
                    if value.is_finite() {
                        weight * value
                    } else {
                        0.0
                    }
                })
                .sum()
        })
        .collect()
}
