//! Order intents and their lifecycle.
//!
//! The engine submits at most one entry order at a time (a bracket), and the
//! venue manages the protective legs it spawns. An `Order` is discarded once
//! it reaches a terminal status.

use serde::{Deserialize, Serialize};

/// Monotonic per-run order identifier, assigned by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// What kind of order and its price parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    /// Fill at the next bar's open.
    Market,
    /// Triggers when price reaches the level, then fills as market.
    Stop { trigger: f64 },
    /// Fill at the limit price or better.
    Limit { limit: f64 },
    /// Entry (market) plus simultaneous stop-loss and take-profit. Filling
    /// the entry activates the two protective legs as an OCO pair.
    Bracket { stop_loss: f64, take_profit: f64 },
}

/// Which leg of a trade an order (or its fill) represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderRole {
    Entry,
    StopLoss,
    TakeProfit,
    TrailingStop,
}

/// Why the venue refused or dropped an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    Canceled,
    Margin,
    Rejected,
}

/// Order lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Sent to the venue, not yet acknowledged.
    Submitted,
    /// Acknowledged, waiting to trigger or fill.
    Accepted,
    /// Completely filled.
    Completed,
    /// Canceled (OCO sibling filled, or replaced).
    Canceled,
    /// Refused for margin.
    MarginRejected,
}

impl OrderStatus {
    /// A terminal order no longer counts against the one-in-flight limit.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Canceled | Self::MarginRejected
        )
    }
}

/// A single order as tracked by the venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub role: OrderRole,
    pub status: OrderStatus,
    /// Bar index at which the order was submitted.
    pub created_bar: usize,
}

impl Order {
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}
