//! Mutable per-run engine state and the trailing-stop ratchet.

use tracing::{info, warn};

use crate::domain::{
    Direction, OrderId, OrderRole, Position, RejectReason, TradeRecord,
};
use crate::strategy::EntrySignal;

/// The strategy engine's state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// No position, no pending order.
    Flat,
    /// Bracket submitted, waiting for the entry fill.
    PendingEntry,
    /// Entry filled, protective exits active.
    InPosition,
}

/// Monotonic-improvement guard for the protective stop.
///
/// A long position's stop may only rise; a short position's stop may only
/// fall. It never loosens, even when ATR expansion would suggest a wider
/// stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopRatchet {
    direction: Direction,
    level: f64,
}

impl StopRatchet {
    pub fn new(direction: Direction, initial_level: f64) -> Self {
        Self {
            direction,
            level: initial_level,
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Accept `candidate` only on strict improvement, returning the new
    /// level. A loosening or equal candidate leaves the stop unchanged.
    pub fn tighten(&mut self, candidate: f64) -> Option<f64> {
        let improves = match self.direction {
            Direction::Long => candidate > self.level,
            Direction::Short => candidate < self.level,
        };
        if improves {
            self.level = candidate;
            Some(candidate)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PendingEntry {
    pub id: OrderId,
    pub signal: EntrySignal,
}

/// Mutable state that evolves bar-by-bar during one run.
#[derive(Debug)]
pub struct EngineState {
    pub balance: f64,
    pub position: Option<Position>,
    pub(crate) pending: Option<PendingEntry>,
    pub ratchet: Option<StopRatchet>,
    pub trades: Vec<TradeRecord>,
    pub equity: Vec<f64>,
    /// Completed round-trips; always equals `trades.len()`.
    pub trade_count: usize,
}

impl EngineState {
    pub fn new(starting_cash: f64) -> Self {
        Self {
            balance: starting_cash,
            position: None,
            pending: None,
            ratchet: None,
            trades: Vec::new(),
            equity: Vec::new(),
            trade_count: 0,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        if self.position.is_some() {
            EnginePhase::InPosition
        } else if self.pending.is_some() {
            EnginePhase::PendingEntry
        } else {
            EnginePhase::Flat
        }
    }

    /// True while an order is non-terminal; per-bar decision logic is
    /// skipped entirely in that case.
    pub fn order_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Mark equity at the bar close: balance plus unrealized P&L.
    pub fn mark(&mut self, close: f64) {
        let unrealized = self
            .position
            .as_ref()
            .map(|p| p.unrealized(close))
            .unwrap_or(0.0);
        self.equity.push(self.balance + unrealized);
    }

    pub(crate) fn on_entry_filled(
        &mut self,
        price: f64,
        time: chrono::NaiveDateTime,
        bar_index: usize,
        units: f64,
        trailing: bool,
    ) {
        let Some(pending) = self.pending.take() else {
            warn!(bar_index, "entry fill without a pending order, ignored");
            return;
        };
        let direction = Direction::from_side(pending.signal.side);
        info!(
            order_id = pending.id.0,
            ?direction,
            price,
            bar_index,
            "entry filled"
        );
        if trailing {
            self.ratchet = Some(StopRatchet::new(direction, pending.signal.stop_loss));
        }
        self.position = Some(Position {
            direction,
            units,
            entry_price: price,
            entry_time: time,
            entry_bar: bar_index,
            stop_price: pending.signal.stop_loss,
        });
    }

    pub(crate) fn on_exit_filled(
        &mut self,
        role: OrderRole,
        price: f64,
        time: chrono::NaiveDateTime,
        bar_index: usize,
    ) {
        let Some(position) = self.position.take() else {
            warn!(bar_index, "exit fill without a position, ignored");
            return;
        };
        let pnl = position.direction.sign() * (price - position.entry_price) * position.units;
        self.balance += pnl;
        self.trade_count += 1;
        info!(
            ?role,
            price,
            pnl,
            balance = self.balance,
            bar_index,
            "position closed"
        );
        self.trades.push(TradeRecord {
            direction: position.direction,
            units: position.units,
            entry_bar: position.entry_bar,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_bar: bar_index,
            exit_time: time,
            exit_price: price,
            exit_role: role,
            pnl,
        });
        self.ratchet = None;
    }

    pub(crate) fn on_rejected(&mut self, id: OrderId, reason: RejectReason) {
        // Treated as "no trade occurred", never fatal.
        warn!(order_id = id.0, ?reason, "order canceled/margin/rejected");
        self.pending = None;
    }
}
