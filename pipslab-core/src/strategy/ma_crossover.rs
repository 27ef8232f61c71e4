//! Moving-average crossover.
//!
//! Long when the fast EMA crosses above the slow EMA, short on the mirror
//! cross. On the first bar both averages are ready there is no prior
//! relationship to cross from, so an already-ordered pair counts as a
//! cross. Protective levels are fixed pip offsets from the entry close.

use serde::{Deserialize, Serialize};

use super::{BarContext, EntrySignal, Strategy};
use crate::domain::OrderSide;
use crate::indicators::{Ema, Indicator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaCrossoverParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub stop_loss_pips: f64,
    pub take_profit_pips: f64,
}

impl Default for MaCrossoverParams {
    fn default() -> Self {
        Self {
            fast_period: 10,
            slow_period: 50,
            stop_loss_pips: 30.0,
            take_profit_pips: 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MaCrossover {
    params: MaCrossoverParams,
    fast: String,
    slow: String,
}

impl MaCrossover {
    pub fn new(params: MaCrossoverParams) -> Self {
        let fast = format!("ema_{}", params.fast_period);
        let slow = format!("ema_{}", params.slow_period);
        Self { params, fast, slow }
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &'static str {
        "ma_crossover"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Ema::new(self.params.fast_period)),
            Box::new(Ema::new(self.params.slow_period)),
        ]
    }

    fn entry(&self, ctx: &BarContext) -> Option<EntrySignal> {
        let fast = ctx.value(&self.fast)?;
        let slow = ctx.value(&self.slow)?;
        let prev = ctx
            .previous(&self.fast)
            .zip(ctx.previous(&self.slow));
        let was_above = prev.map(|(f, s)| f > s).unwrap_or(false);
        let was_below = prev.map(|(f, s)| f < s).unwrap_or(false);

        let close = ctx.close();
        let stop_offset = self.params.stop_loss_pips * ctx.pip_size;
        let profit_offset = self.params.take_profit_pips * ctx.pip_size;

        if fast > slow && !was_above {
            Some(EntrySignal {
                side: OrderSide::Buy,
                stop_loss: close - stop_offset,
                take_profit: close + profit_offset,
            })
        } else if fast < slow && !was_below {
            Some(EntrySignal {
                side: OrderSide::Sell,
                stop_loss: close + stop_offset,
                take_profit: close - profit_offset,
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

    fn context<'a>(
        bars: &'a [crate::domain::Bar],
        columns: &'a IndicatorColumns,
        index: usize,
    ) -> BarContext<'a> {
        BarContext {
            bars,
            index,
            columns,
            pip_size: 0.0001,
        }
    }

    #[test]
    fn golden_cross_goes_long() {
        // Falling then sharply rising closes force the fast EMA through the
        // slow one from below.
        let mut closes: Vec<f64> = (0..30).map(|i| 1.2 - i as f64 * 0.001).collect();
        closes.extend((0..30).map(|i| 1.17 + i as f64 * 0.004));
        let bars = make_bars(&closes);

        let strat = MaCrossover::new(MaCrossoverParams {
            fast_period: 5,
            slow_period: 20,
            ..Default::default()
        });
        let columns = IndicatorColumns::compute(&strat.indicators(), &bars);

        let mut long_seen = None;
        for i in 0..bars.len() {
            if let Some(signal) = strat.entry(&context(&bars, &columns, i)) {
                if signal.side == OrderSide::Buy {
                    long_seen = Some((i, signal));
                    break;
                }
            }
        }
        let (i, signal) = long_seen.expect("golden cross should fire");
        assert!(signal.stop_loss < bars[i].close);
        assert!(signal.take_profit > bars[i].close);
    }

    #[test]
    fn no_signal_during_warmup() {
        let bars = make_bars(&[1.1, 1.2, 1.3]);
        let strat = MaCrossover::new(MaCrossoverParams::default());
        let columns = IndicatorColumns::compute(&strat.indicators(), &bars);
        for i in 0..bars.len() {
            assert!(strat.entry(&context(&bars, &columns, i)).is_none());
        }
    }

    #[test]
    fn protective_levels_use_pip_offsets() {
        let mut closes: Vec<f64> = (0..30).map(|i| 1.2 - i as f64 * 0.001).collect();
        closes.extend((0..30).map(|i| 1.17 + i as f64 * 0.004));
        let bars = make_bars(&closes);

        let params = MaCrossoverParams {
            fast_period: 5,
            slow_period: 20,
            stop_loss_pips: 30.0,
            take_profit_pips: 100.0,
        };
        let strat = MaCrossover::new(params);
        let columns = IndicatorColumns::compute(&strat.indicators(), &bars);

        for i in 0..bars.len() {
            if let Some(signal) = strat.entry(&context(&bars, &columns, i)) {
                if signal.side == OrderSide::Buy {
                    assert!((bars[i].close - signal.stop_loss - 0.0030).abs() < 1e-9);
                    assert!((signal.take_profit - bars[i].close - 0.0100).abs() < 1e-9);
                    return;
                }
            }
        }
        panic!("expected at least one long entry");
    }
}
