//! The bar-by-bar strategy engine.
//!
//! One engine run drives one strategy over one bar feed, strictly
//! sequentially. Per bar:
//! 1. apply venue events (fills and rejections, delivered in bar order)
//! 2. mark equity at the close
//! 3. skip decision logic while an order is in flight
//! 4. flat + warm: evaluate the entry predicate, submit a bracket
//! 5. in position: move the trailing stop under the ratchet invariant
//!
//! A position still open when the feed ends is left open — the final
//! balance reflects realized P&L only. This mirrors the behavior the
//! system was validated against; it is deliberate, not an oversight.

pub mod state;

pub use state::{EnginePhase, EngineState, StopRatchet};

use tracing::{debug, info};

use crate::domain::{Bar, Direction, TradeRecord};
use crate::error::EngineError;
use crate::indicators::{max_lookback, IndicatorColumns};
use crate::strategy::{BarContext, Strategy, TrailSpec};
use crate::venue::{ExecutionVenue, OrderEvent, SimVenue};
use state::PendingEntry;

/// Configuration for a single run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub starting_cash: f64,
    /// Position size in base-currency units (1_000 units = 0.01 lot).
    pub lot_units: f64,
    /// Price distance of one pip (0.0001 for most pairs, 0.01 for JPY).
    pub pip_size: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_cash: 100_000.0,
            lot_units: 1_000.0,
            pip_size: 0.0001,
        }
    }
}

/// Everything a completed run hands to the aggregator.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub trades: Vec<TradeRecord>,
    /// Bar-by-bar account equity (balance plus unrealized P&L at the close).
    pub equity: Vec<f64>,
    /// Realized balance at stream end. An open position's unrealized P&L is
    /// not included.
    pub final_balance: f64,
    pub trade_count: usize,
    pub bars_processed: usize,
}

/// Run a strategy over a bar feed with the standard fill simulator.
pub fn run(
    strategy: &dyn Strategy,
    bars: &[Bar],
    config: &EngineConfig,
) -> Result<RunOutput, EngineError> {
    let mut venue = SimVenue::new();
    run_with_venue(strategy, bars, config, &mut venue)
}

/// Run a strategy against a caller-supplied venue.
pub fn run_with_venue(
    strategy: &dyn Strategy,
    bars: &[Bar],
    config: &EngineConfig,
    venue: &mut dyn ExecutionVenue,
) -> Result<RunOutput, EngineError> {
    if bars.is_empty() {
        return Err(EngineError::EmptyFeed);
    }
    for i in 1..bars.len() {
        if bars[i].time <= bars[i - 1].time {
            return Err(EngineError::NonMonotonicFeed { index: i });
        }
    }

    let indicators = strategy.indicators();
    let columns = IndicatorColumns::compute(&indicators, bars);
    let warmup = max_lookback(&indicators);
    let trail = strategy.trailing();
    if let Some(spec) = &trail {
        if !columns.contains(&spec.atr) {
            return Err(EngineError::MissingIndicator(spec.atr.clone()));
        }
    }

    let mut state = EngineState::new(config.starting_cash);

    for (i, bar) in bars.iter().enumerate() {
        for event in venue.on_bar(i, bar) {
            match event {
                OrderEvent::Filled {
                    role: crate::domain::OrderRole::Entry,
                    price,
                    time,
                    bar_index,
                    ..
                } => state.on_entry_filled(price, time, bar_index, config.lot_units, trail.is_some()),
                OrderEvent::Filled {
                    role,
                    price,
                    time,
                    bar_index,
                    ..
                } => state.on_exit_filled(role, price, time, bar_index),
                OrderEvent::Rejected { id, reason } => state.on_rejected(id, reason),
            }
        }

        state.mark(bar.close);

        // One in-flight order at a time: no decisions while it is pending.
        if state.order_in_flight() {
            continue;
        }

        match state.phase() {
            EnginePhase::Flat => {
                if i < warmup {
                    continue;
                }
                let ctx = BarContext {
                    bars,
                    index: i,
                    columns: &columns,
                    pip_size: config.pip_size,
                };
                if let Some(signal) = strategy.entry(&ctx) {
                    let id =
                        venue.submit_bracket(signal.side, signal.stop_loss, signal.take_profit, i);
                    info!(
                        strategy = strategy.name(),
                        order_id = id.0,
                        ?signal.side,
                        close = bar.close,
                        stop_loss = signal.stop_loss,
                        take_profit = signal.take_profit,
                        bar_index = i,
                        "bracket entry created"
                    );
                    state.pending = Some(PendingEntry { id, signal });
                }
            }
            EnginePhase::InPosition => {
                if let Some(spec) = &trail {
                    trail_stop(&mut state, spec, &columns, bar, i, config, venue);
                }
            }
            EnginePhase::PendingEntry => unreachable!("order_in_flight checked above"),
        }
    }

    Ok(RunOutput {
        final_balance: state.balance,
        trade_count: state.trade_count,
        bars_processed: bars.len(),
        trades: state.trades,
        equity: state.equity,
    })
}

/// Trailing-stop step: once unrealized profit clears the trigger, propose
/// the more favorable of breakeven and an ATR offset from the close, and
/// replace the venue's stop only on strict improvement.
fn trail_stop(
    state: &mut EngineState,
    spec: &TrailSpec,
    columns: &IndicatorColumns,
    bar: &Bar,
    bar_index: usize,
    config: &EngineConfig,
    venue: &mut dyn ExecutionVenue,
) {
    let Some(position) = state.position.as_mut() else {
        return;
    };
    let Some(atr) = columns.value(&spec.atr, bar_index) else {
        return;
    };

    let profit_pips = position.profit_pips(bar.close, config.pip_size);
    if profit_pips <= spec.trigger_pips {
        return;
    }

    let candidate = match position.direction {
        Direction::Long => position
            .entry_price
            .max(bar.close - spec.atr_mult * atr),
        Direction::Short => position
            .entry_price
            .min(bar.close + spec.atr_mult * atr),
    };

    let Some(ratchet) = state.ratchet.as_mut() else {
        return;
    };
    if let Some(new_level) = ratchet.tighten(candidate) {
        position.stop_price = new_level;
        venue.replace_stop(new_level, bar_index);
        debug!(
            stop = new_level,
            profit_pips, bar_index, "trailing stop moved"
        );
    }
}
