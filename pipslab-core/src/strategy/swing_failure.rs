//! Swing failure — liquidity sweep reversal with an EMA regime filter.
//!
//! Sell a bearish failure (new high rejected) only below the trend EMA;
//! buy a bullish failure (new low rejected) only above it. ATR-scaled
//! stop and target from the close.

use serde::{Deserialize, Serialize};

use super::{BarContext, EntrySignal, Strategy};
use crate::domain::OrderSide;
use crate::indicators::{Atr, Ema, Indicator, SwingSignal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwingFailureParams {
    pub lookback: usize,
    pub ema_trend_period: usize,
    pub atr_period: usize,
    pub atr_mult_sl: f64,
    pub atr_mult_tp: f64,
}

impl Default for SwingFailureParams {
    fn default() -> Self {
        Self {
            lookback: 10,
            ema_trend_period: 200,
            atr_period: 14,
            atr_mult_sl: 1.5,
            atr_mult_tp: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SwingFailure {
    params: SwingFailureParams,
    signal: String,
    ema: String,
    atr: String,
}

impl SwingFailure {
    pub fn new(params: SwingFailureParams) -> Self {
        Self {
            signal: format!("swing_signal_{}", params.lookback),
            ema: format!("ema_{}", params.ema_trend_period),
            atr: format!("atr_{}", params.atr_period),
            params,
        }
    }
}

impl Strategy for SwingFailure {
    fn name(&self) -> &'static str {
        "swing_failure"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(SwingSignal::new(self.params.lookback)),
            Box::new(Ema::new(self.params.ema_trend_period)),
            Box::new(Atr::new(self.params.atr_period)),
        ]
    }

    fn entry(&self, ctx: &BarContext) -> Option<EntrySignal> {
        let signal = ctx.value(&self.signal)?;
        let ema = ctx.value(&self.ema)?;
        let atr = ctx.value(&self.atr)?;
        let close = ctx.close();

        if signal == 1.0 && close < ema {
            Some(EntrySignal {
                side: OrderSide::Sell,
                stop_loss: close + self.params.atr_mult_sl * atr,
                take_profit: close - self.params.atr_mult_tp * atr,
            })
        } else if signal == -1.0 && close > ema {
            Some(EntrySignal {
                side: OrderSide::Buy,
                stop_loss: close - self.params.atr_mult_sl * atr,
                take_profit: close + self.params.atr_mult_tp * atr,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, IndicatorColumns};

    #[test]
    fn bearish_failure_below_trend_goes_short() {
        // Decline keeps the close under the EMA; the last bar sweeps the
        // recent swing high and closes back below it.
        let mut closes: Vec<f64> = (0..30).map(|i| 1.1200 - i as f64 * 0.0010).collect();
        closes.push(1.0910);
        let mut bars = make_bars(&closes);
        let last = bars.len() - 1;
        let swing_high = bars[last - 5..last]
            .iter()
            .map(|b| b.high)
            .fold(f64::MIN, f64::max);
        bars[last].high = swing_high + 0.0005;
        bars[last].close = swing_high - 0.0010;
        bars[last].low = bars[last].close - 0.0002;
        bars[last].open = bars[last].close;

        let strat = SwingFailure::new(SwingFailureParams {
            lookback: 5,
            ema_trend_period: 20,
            atr_period: 5,
            ..Default::default()
        });
        let columns = IndicatorColumns::compute(&strat.indicators(), &bars);
        let ctx = BarContext {
            bars: &bars,
            index: last,
            columns: &columns,
            pip_size: 0.0001,
        };

        let signal = strat.entry(&ctx).expect("bearish failure should fire");
        assert_eq!(signal.side, OrderSide::Sell);
        assert!(signal.stop_loss > bars[last].close);
        assert!(signal.take_profit < bars[last].close);
    }

    #[test]
    fn failure_against_regime_is_filtered() {
        // Same sweep shape but in a rising market: close sits above the EMA,
        // so the bearish failure is filtered out.
        let mut closes: Vec<f64> = (0..30).map(|i| 1.0900 + i as f64 * 0.0010).collect();
        closes.push(1.1210);
        let mut bars = make_bars(&closes);
        let last = bars.len() - 1;
        let swing_high = bars[last - 5..last]
            .iter()
            .map(|b| b.high)
            .fold(f64::MIN, f64::max);
        bars[last].high = swing_high + 0.0005;
        bars[last].close = swing_high - 0.0001;
        bars[last].open = bars[last].close;

        let strat = SwingFailure::new(SwingFailureParams {
            lookback: 5,
            ema_trend_period: 20,
            atr_period: 5,
            ..Default::default()
        });
        let columns = IndicatorColumns::compute(&strat.indicators(), &bars);
        let ctx = BarContext {
            bars: &bars,
            index: last,
            columns: &columns,
            pip_size: 0.0001,
        };
        assert!(strat.entry(&ctx).is_none());
    }
}
