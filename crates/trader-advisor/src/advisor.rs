//! 트레이딩 어드바이저.
//!
//! 지표 스냅샷, 시그널 스코어링, 가격 예측, 시장 심리를 한 번에 계산해
//! 매수/매도/관망 추천을 만들고, 주문 계획은 리스크 게이트와 포지션 사이저를 거칩니다.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use trader_analytics::{
    aggregate, Forecast, IndicatorAdapter, IndicatorSnapshot, PriceForecaster, ScoredSignal,
    SentimentResult, SignalLabel, SignalScorer,
};
use trader_core::{
    analysis_span, closes_f64, Candle, OrderRequest, Position, Quantity, TraderResult,
};
use trader_risk::{
    MarketRiskData, PositionSizer, PositionSizing, RiskCheckResult, RiskGate,
    RiskLimitOverrides, SizingInputs,
};

use crate::config::{AdviceConfig, AdvisorConfig};

/// 추천 행동.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl From<SignalLabel> for TradeAction {
    fn from(label: SignalLabel) -> Self {
        if label.is_buy() {
            TradeAction::Buy
        } else if label.is_sell() {
            TradeAction::Sell
        } else {
            TradeAction::Hold
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
            TradeAction::Hold => write!(f, "HOLD"),
        }
    }
}

/// 매매 추천.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: TradeAction,
    /// 시그널 신뢰도와 예측 신뢰도의 평균 (0-100)
    pub confidence: f64,
    pub target_price: f64,
    /// HOLD에는 손절가가 없습니다.
    pub stop_loss: Option<f64>,
    pub reasoning: Vec<String>,
}

/// 심볼 단위 분석 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub symbol: String,
    /// 마지막 종가
    pub price: f64,
    /// 직전 종가 대비 변화율 (0.03 = +3%)
    pub price_change: f64,
    pub snapshot: IndicatorSnapshot,
    pub signal: ScoredSignal,
    pub forecast: Forecast,
    pub sentiment: SentimentResult,
    pub recommendation: Recommendation,
}

/// 리스크 검사를 거친 주문 계획.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub order: OrderRequest,
    pub risk: RiskCheckResult,
    pub sizing: PositionSizing,
    /// 사이저 권장 수량을 리스크 게이트 권장 수량으로 제한한 값
    pub suggested_quantity: Quantity,
}

impl TradePlan {
    /// 요청한 주문이 그대로 승인되었는지 여부.
    pub fn is_approved(&self) -> bool {
        self.risk.passed
    }
}

/// 분석과 리스크 구성 요소를 묶는 어드바이저.
#[derive(Debug, Clone, Default)]
pub struct TradingAdvisor {
    adapter: IndicatorAdapter,
    scorer: SignalScorer,
    forecaster: PriceForecaster,
    gate: RiskGate,
    sizer: PositionSizer,
    advice: AdviceConfig,
}

impl TradingAdvisor {
    /// 설정을 검증한 뒤 어드바이저를 생성합니다.
    pub fn new(config: &AdvisorConfig) -> TraderResult<Self> {
        config.validate()?;
        Ok(Self {
            adapter: IndicatorAdapter::new(),
            scorer: SignalScorer::with_weights(config.signal_weights),
            forecaster: PriceForecaster::with_params(config.forecast.clone()),
            gate: RiskGate::new(config.risk.clone()),
            sizer: PositionSizer::new(config.sizing.clone()),
            advice: config.advice.clone(),
        })
    }

    /// 캔들 시계열을 분석합니다. 데이터가 부족해도 실패하지 않습니다.
    pub fn analyze(&self, symbol: &str, candles: &[Candle]) -> MarketAnalysis {
        let span = analysis_span!("analyze", symbol, candles.len());
        let _guard = span.enter();

        let closes = closes_f64(candles);
        let price = closes.last().copied().unwrap_or(0.0);
        let price_change = match closes.as_slice() {
            [.., prev, last] if *prev != 0.0 => last / prev - 1.0,
            _ => 0.0,
        };

        let snapshot = self.adapter.compute(candles);
        let signal = self.scorer.score(&snapshot);
        let forecast = self.forecaster.forecast(&closes);
        let sentiment = aggregate(&snapshot, price_change);
        let recommendation =
            self.recommend(price, &snapshot, &signal, &forecast, &sentiment);

        info!(
            action = %recommendation.action,
            signal = %signal.overall,
            confidence = recommendation.confidence,
            target = recommendation.target_price,
            "매매 추천 생성"
        );

        MarketAnalysis {
            symbol: symbol.to_string(),
            price,
            price_change,
            snapshot,
            signal,
            forecast,
            sentiment,
            recommendation,
        }
    }

    fn recommend(
        &self,
        price: f64,
        snapshot: &IndicatorSnapshot,
        signal: &ScoredSignal,
        forecast: &Forecast,
        sentiment: &SentimentResult,
    ) -> Recommendation {
        let action = TradeAction::from(signal.overall);
        let confidence = (signal.confidence + forecast.confidence) / 2.0;

        let target_price = match action {
            TradeAction::Buy => forecast.range.max,
            TradeAction::Sell => forecast.range.min,
            TradeAction::Hold => forecast.prediction,
        };

        let distance = match snapshot.atr.filter(|atr| atr.is_finite() && *atr > 0.0) {
            Some(atr) => atr * self.advice.atr_stop_multiplier,
            None => price * self.advice.stop_loss_pct,
        };
        let stop_loss = match action {
            TradeAction::Buy => Some((price - distance).max(0.0)),
            TradeAction::Sell => Some(price + distance),
            TradeAction::Hold => None,
        };

        let reasoning = signal
            .reasons
            .iter()
            .cloned()
            .chain(sentiment.factors.iter().map(|f| f.description.clone()))
            .collect();

        Recommendation {
            action,
            confidence,
            target_price,
            stop_loss,
            reasoning,
        }
    }

    /// 주문을 리스크 게이트와 포지션 사이저로 검토합니다.
    ///
    /// `overrides`가 있으면 이번 호출에만 한도를 덮어씁니다.
    pub fn plan_trade(
        &self,
        order: &OrderRequest,
        positions: &[Position],
        portfolio_value: Decimal,
        data: &dyn MarketRiskData,
        inputs: &SizingInputs,
        overrides: Option<&RiskLimitOverrides>,
    ) -> TraderResult<TradePlan> {
        let risk = match overrides {
            Some(overrides) => RiskGate::new(self.gate.limits().with_overrides(overrides))
                .check(order, positions, portfolio_value, data)?,
            None => self.gate.check(order, positions, portfolio_value, data)?,
        };
        let sizing = self.sizer.size(inputs)?;

        let suggested_quantity = match risk.recommended_size {
            Some(cap) => sizing.recommended_size.min(cap),
            None => sizing.recommended_size,
        };

        debug!(
            symbol = %order.symbol,
            passed = risk.passed,
            sized = %sizing.recommended_size,
            suggested = %suggested_quantity,
            "주문 계획 생성"
        );

        Ok(TradePlan {
            order: order.clone(),
            risk,
            sizing,
            suggested_quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trader_analytics::PriceRange;

    fn forecast(prediction: f64, min: f64, max: f64, confidence: f64) -> Forecast {
        Forecast {
            prediction,
            confidence,
            range: PriceRange { min, max },
            volatility: 0.0,
            components: Default::default(),
        }
    }

    fn signal(overall: SignalLabel, confidence: f64) -> ScoredSignal {
        ScoredSignal {
            overall,
            confidence,
            reasons: vec!["RSI 과매도".to_string()],
            ..ScoredSignal::neutral()
        }
    }

    fn neutral_sentiment() -> SentimentResult {
        aggregate(&IndicatorSnapshot::default(), 0.0)
    }

    #[test]
    fn test_action_from_label() {
        assert_eq!(TradeAction::from(SignalLabel::StrongBuy), TradeAction::Buy);
        assert_eq!(TradeAction::from(SignalLabel::Buy), TradeAction::Buy);
        assert_eq!(TradeAction::from(SignalLabel::Neutral), TradeAction::Hold);
        assert_eq!(TradeAction::from(SignalLabel::StrongSell), TradeAction::Sell);
    }

    #[test]
    fn test_buy_recommendation_uses_atr_stop() {
        let advisor = TradingAdvisor::default();
        let snapshot = IndicatorSnapshot {
            atr: Some(1.5),
            ..Default::default()
        };
        let rec = advisor.recommend(
            100.0,
            &snapshot,
            &signal(SignalLabel::StrongBuy, 75.0),
            &forecast(101.0, 99.0, 104.0, 25.0),
            &neutral_sentiment(),
        );

        assert_eq!(rec.action, TradeAction::Buy);
        assert_eq!(rec.confidence, 50.0);
        assert_eq!(rec.target_price, 104.0);
        assert_eq!(rec.stop_loss, Some(97.0));
        assert_eq!(rec.reasoning, vec!["RSI 과매도".to_string()]);
    }

    #[test]
    fn test_sell_recommendation_without_atr() {
        let advisor = TradingAdvisor::default();
        let rec = advisor.recommend(
            100.0,
            &IndicatorSnapshot::default(),
            &signal(SignalLabel::Sell, 30.0),
            &forecast(99.0, 97.0, 101.0, 10.0),
            &neutral_sentiment(),
        );

        assert_eq!(rec.action, TradeAction::Sell);
        assert_eq!(rec.target_price, 97.0);
        assert_eq!(rec.stop_loss, Some(102.0));
    }

    #[test]
    fn test_hold_has_no_stop() {
        let advisor = TradingAdvisor::default();
        let rec = advisor.recommend(
            100.0,
            &IndicatorSnapshot::default(),
            &ScoredSignal::neutral(),
            &forecast(100.5, 98.0, 103.0, 0.0),
            &neutral_sentiment(),
        );

        assert_eq!(rec.action, TradeAction::Hold);
        assert_eq!(rec.target_price, 100.5);
        assert!(rec.stop_loss.is_none());
    }

    #[test]
    fn test_analyze_empty_candles() {
        let analysis = TradingAdvisor::default().analyze("AAPL", &[]);

        assert_eq!(analysis.price, 0.0);
        assert_eq!(analysis.price_change, 0.0);
        assert_eq!(analysis.recommendation.action, TradeAction::Hold);
    }
}
