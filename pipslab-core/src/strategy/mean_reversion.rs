//! Mean reversion on Bollinger band touches.
//!
//! Long when the close dips below the lower band, short when it pops above
//! the upper band. Stops and targets are ATR multiples from the close.

use serde::{Deserialize, Serialize};

use super::{BarContext, EntrySignal, Strategy};
use crate::domain::OrderSide;
use crate::indicators::{Atr, Bollinger, Indicator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeanReversionParams {
    pub bollinger_period: usize,
    pub dev_factor: f64,
    pub atr_period: usize,
    pub atr_mult: f64,
    pub profit_mult: f64,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        Self {
            bollinger_period: 20,
            dev_factor: 2.0,
            atr_period: 14,
            atr_mult: 1.5,
            profit_mult: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeanReversion {
    params: MeanReversionParams,
    upper: String,
    lower: String,
    atr: String,
}

impl MeanReversion {
    pub fn new(params: MeanReversionParams) -> Self {
        let upper = format!("bollinger_upper_{}", params.bollinger_period);
        let lower = format!("bollinger_lower_{}", params.bollinger_period);
        let atr = format!("atr_{}", params.atr_period);
        Self {
            params,
            upper,
            lower,
            atr,
        }
    }
}

impl Strategy for MeanReversion {
    fn name(&self) -> &'static str {
        "mean_reversion"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Bollinger::upper(
                self.params.bollinger_period,
                self.params.dev_factor,
            )),
            Box::new(Bollinger::lower(
                self.params.bollinger_period,
                self.params.dev_factor,
            )),
            Box::new(Atr::new(self.params.atr_period)),
        ]
    }

    fn entry(&self, ctx: &BarContext) -> Option<EntrySignal> {
        let upper = ctx.value(&self.upper)?;
        let lower = ctx.value(&self.lower)?;
        let atr = ctx.value(&self.atr)?;
        let close = ctx.close();

        if close < lower {
            Some(EntrySignal {
                side: OrderSide::Buy,
                stop_loss: close - self.params.atr_mult * atr,
                take_profit: close + self.params.profit_mult * atr,
            })
        } else if close > upper {
            Some(EntrySignal {
                side: OrderSide::Sell,
                stop_loss: close + self.params.atr_mult * atr,
                take_profit: close - self.params.profit_mult * atr,
            })
        } else {
            None
        }
    }
}
