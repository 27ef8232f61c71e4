//! Trend following — EMA trend filter with stochastic pullback timing.
//!
//! Long when price is above the trend EMA and a smoothed %K turns up from
//! oversold; short when price is below the EMA and %K turns down from
//! overbought. ATR-scaled stop and target.

use serde::{Deserialize, Serialize};

use super::{BarContext, EntrySignal, Strategy};
use crate::domain::OrderSide;
use crate::indicators::{Atr, Ema, Indicator, StochasticK};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendFollowingParams {
    pub ema_period: usize,
    pub stoch_period: usize,
    pub stoch_smooth: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub atr_period: usize,
    pub atr_mult_sl: f64,
    pub atr_mult_tp: f64,
}

impl Default for TrendFollowingParams {
    fn default() -> Self {
        Self {
            ema_period: 80,
            stoch_period: 14,
            stoch_smooth: 3,
            oversold: 20.0,
            overbought: 80.0,
            atr_period: 14,
            atr_mult_sl: 1.5,
            atr_mult_tp: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrendFollowing {
    params: TrendFollowingParams,
    ema: String,
    stoch: String,
    atr: String,
}

impl TrendFollowing {
    pub fn new(params: TrendFollowingParams) -> Self {
        Self {
            ema: format!("ema_{}", params.ema_period),
            stoch: format!("stoch_k_{}_{}", params.stoch_period, params.stoch_smooth),
            atr: format!("atr_{}", params.atr_period),
            params,
        }
    }
}

impl Strategy for TrendFollowing {
    fn name(&self) -> &'static str {
        "trend_following"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Ema::new(self.params.ema_period)),
            Box::new(StochasticK::new(
                self.params.stoch_period,
                self.params.stoch_smooth,
            )),
            Box::new(Atr::new(self.params.atr_period)),
        ]
    }

    fn entry(&self, ctx: &BarContext) -> Option<EntrySignal> {
        let ema = ctx.value(&self.ema)?;
        let k = ctx.value(&self.stoch)?;
        let k_prev = ctx.previous(&self.stoch)?;
        let atr = ctx.value(&self.atr)?;
        let close = ctx.close();

        if close > ema && k < self.params.oversold && k_prev < k {
            Some(EntrySignal {
                side: OrderSide::Buy,
                stop_loss: close - self.params.atr_mult_sl * atr,
                take_profit: close + self.params.atr_mult_tp * atr,
            })
        } else if close < ema && k > self.params.overbought && k_prev > k {
            Some(EntrySignal {
                side: OrderSide::Sell,
                stop_loss: close + self.params.atr_mult_sl * atr,
                take_profit: close - self.params.atr_mult_tp * atr,
            })
        } else {
            None
        }
    }
}
