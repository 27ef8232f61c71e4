//! Crash/boom — regime-filtered signal-line cross with a trailing stop.
//!
//! Regime from a long EMA and the Bollinger envelope:
//! - up-trend: close above the trend EMA but still under the upper band
//! - down-trend: close below the trend EMA but still over the lower band
//! - anything else is consolidation, no entries.
//!
//! Entry on the short signal EMA crossing the band midline in the regime's
//! direction. The stop sits one band plus an ATR buffer away; the target is
//! a multiple of the risked distance. The only strategy that opts into the
//! engine's trailing stop.

use serde::{Deserialize, Serialize};

use super::{BarContext, EntrySignal, Strategy, TrailSpec};
use crate::domain::OrderSide;
use crate::indicators::{Atr, Bollinger, Ema, Indicator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrashBoomParams {
    pub bollinger_period: usize,
    pub dev_factor: f64,
    pub ema_trend_period: usize,
    pub ema_signal_period: usize,
    pub atr_period: usize,
    pub atr_mult: f64,
    pub profit_mult: f64,
    pub trail_trigger_pips: f64,
    pub trail_atr_mult: f64,
}

impl Default for CrashBoomParams {
    fn default() -> Self {
        Self {
            bollinger_period: 20,
            dev_factor: 2.0,
            ema_trend_period: 400,
            ema_signal_period: 5,
            atr_period: 14,
            atr_mult: 1.5,
            profit_mult: 2.0,
            trail_trigger_pips: 10.0,
            trail_atr_mult: 1.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrashBoom {
    params: CrashBoomParams,
    trend_ema: String,
    signal_ema: String,
    mid: String,
    upper: String,
    lower: String,
    atr: String,
}

impl CrashBoom {
    pub fn new(params: CrashBoomParams) -> Self {
        Self {
            trend_ema: format!("ema_{}", params.ema_trend_period),
            signal_ema: format!("ema_{}", params.ema_signal_period),
            mid: format!("bollinger_middle_{}", params.bollinger_period),
            upper: format!("bollinger_upper_{}", params.bollinger_period),
            lower: format!("bollinger_lower_{}", params.bollinger_period),
            atr: format!("atr_{}", params.atr_period),
            params,
        }
    }
}

impl Strategy for CrashBoom {
    fn name(&self) -> &'static str {
        "crash_boom"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Ema::new(self.params.ema_trend_period)),
            Box::new(Ema::new(self.params.ema_signal_period)),
            Box::new(Bollinger::middle(
                self.params.bollinger_period,
                self.params.dev_factor,
            )),
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
        let trend = ctx.value(&self.trend_ema)?;
        let signal = ctx.value(&self.signal_ema)?;
        let signal_prev = ctx.previous(&self.signal_ema)?;
        let mid = ctx.value(&self.mid)?;
        let upper = ctx.value(&self.upper)?;
        let lower = ctx.value(&self.lower)?;
        let atr = ctx.value(&self.atr)?;
        let close = ctx.close();

        let up_trend = close > trend && close < upper;
        let down_trend = close < trend && close > lower;

        if up_trend && signal_prev < mid && signal > mid {
            let stop_loss = lower - self.params.atr_mult * atr;
            Some(EntrySignal {
                side: OrderSide::Buy,
                stop_loss,
                take_profit: close + self.params.profit_mult * (close - stop_loss),
            })
        } else if down_trend && signal_prev > mid && signal < mid {
            let stop_loss = upper + self.params.atr_mult * atr;
            Some(EntrySignal {
                side: OrderSide::Sell,
                stop_loss,
                take_profit: close - self.params.profit_mult * (stop_loss - close),
            })
        } else {
            None
        }
    }

    fn trailing(&self) -> Option<TrailSpec> {
        Some(TrailSpec {
            atr: self.atr.clone(),
            trigger_pips: self.params.trail_trigger_pips,
            atr_mult: self.params.trail_atr_mult,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, IndicatorColumns};

    fn small_params() -> CrashBoomParams {
        CrashBoomParams {
            ema_trend_period: 30,
            bollinger_period: 10,
            atr_period: 5,
            ..Default::default()
        }
    }

    /// Two bars with hand-built indicator columns; the predicate is
    /// evaluated at index 1 so `previous` is defined.
    fn columns_for(
        trend: f64,
        signal_prev: f64,
        signal: f64,
        mid: f64,
        upper: f64,
        lower: f64,
        atr: f64,
    ) -> IndicatorColumns {
        let mut columns = IndicatorColumns::default();
        columns.insert("ema_30", vec![trend, trend]);
        columns.insert("ema_5", vec![signal_prev, signal]);
        columns.insert("bollinger_middle_10", vec![mid, mid]);
        columns.insert("bollinger_upper_10", vec![upper, upper]);
        columns.insert("bollinger_lower_10", vec![lower, lower]);
        columns.insert("atr_5", vec![atr, atr]);
        columns
    }

    #[test]
    fn uptrend_midline_cross_goes_long() {
        // close 1.1000, above the trend EMA, under the upper band, with the
        // signal EMA crossing the midline from below.
        let bars = make_bars(&[1.0990, 1.1000]);
        let columns = columns_for(1.0950, 1.0980, 1.0995, 1.0990, 1.1030, 1.0950, 0.0010);

        let strat = CrashBoom::new(small_params());
        let ctx = BarContext {
            bars: &bars,
            index: 1,
            columns: &columns,
            pip_size: 0.0001,
        };
        let signal = strat.entry(&ctx).expect("midline cross in up-trend fires");
        assert_eq!(signal.side, OrderSide::Buy);
        // Stop: lower band minus the ATR buffer.
        assert!((signal.stop_loss - (1.0950 - 1.5 * 0.0010)).abs() < 1e-9);
        // Target: profit_mult times the risked distance.
        let risk = 1.1000 - signal.stop_loss;
        assert!((signal.take_profit - (1.1000 + 2.0 * risk)).abs() < 1e-9);
    }

    #[test]
    fn downtrend_midline_cross_goes_short() {
        let bars = make_bars(&[1.1010, 1.1000]);
        // close below the trend EMA, above the lower band, signal EMA
        // dropping through the midline.
        let columns = columns_for(1.1050, 1.1020, 1.1005, 1.1010, 1.1060, 1.0960, 0.0010);

        let strat = CrashBoom::new(small_params());
        let ctx = BarContext {
            bars: &bars,
            index: 1,
            columns: &columns,
            pip_size: 0.0001,
        };
        let signal = strat.entry(&ctx).expect("midline cross in down-trend fires");
        assert_eq!(signal.side, OrderSide::Sell);
        assert!((signal.stop_loss - (1.1060 + 1.5 * 0.0010)).abs() < 1e-9);
    }

    #[test]
    fn cross_outside_regime_is_filtered() {
        let bars = make_bars(&[1.0990, 1.1000]);
        // Same cross, but close sits above the upper band: consolidating.
        let columns = columns_for(1.0950, 1.0980, 1.0995, 1.0990, 1.0998, 1.0950, 0.0010);

        let strat = CrashBoom::new(small_params());
        let ctx = BarContext {
            bars: &bars,
            index: 1,
            columns: &columns,
            pip_size: 0.0001,
        };
        assert!(strat.entry(&ctx).is_none());
    }

    #[test]
    fn consolidation_stays_flat() {
        let closes = vec![1.1000; 60];
        let bars = make_bars(&closes);
        let strat = CrashBoom::new(small_params());
        let columns = IndicatorColumns::compute(&strat.indicators(), &bars);
        for i in 0..bars.len() {
            let ctx = BarContext {
                bars: &bars,
                index: i,
                columns: &columns,
                pip_size: 0.0001,
            };
            assert!(strat.entry(&ctx).is_none());
        }
    }

    #[test]
    fn opts_into_trailing() {
        let strat = CrashBoom::new(CrashBoomParams::default());
        let trail = strat.trailing().expect("crash_boom trails its stop");
        assert_eq!(trail.atr, "atr_14");
        assert_eq!(trail.trigger_pips, 10.0);
        assert_eq!(trail.atr_mult, 1.5);
    }
}
