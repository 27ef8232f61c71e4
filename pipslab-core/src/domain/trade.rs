//! TradeRecord — one completed round-trip.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::order::OrderRole;
use super::position::Direction;

/// A completed round-trip trade: entry fill to protective-exit fill.
///
/// Immutable once appended to a run's ledger. `exit_time` is strictly after
/// `entry_time` (the venue activates protective legs one bar after entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub direction: Direction,
    pub units: f64,

    pub entry_bar: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,

    pub exit_bar: usize,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    /// Which protective leg closed the trade.
    pub exit_role: OrderRole,

    /// Realized P&L in account currency.
    pub pnl: f64,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_bar.saturating_sub(self.entry_bar)
    }
}
