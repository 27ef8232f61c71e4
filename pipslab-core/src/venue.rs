//! Execution venue boundary — order submission and asynchronous fills.
//!
//! The engine never assumes a fill price beyond "equal to or better than the
//! bracket trigger". `SimVenue` implements standard backtest semantics:
//! market entries fill at the next bar's open, protective legs trigger on
//! the bar's range, and the stop leg wins when both legs are touched within
//! one bar. Events are delivered in strict bar order.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::{
    Bar, Order, OrderId, OrderKind, OrderRole, OrderSide, OrderStatus, RejectReason,
};

/// Notification from the venue back to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    Filled {
        id: OrderId,
        role: OrderRole,
        side: OrderSide,
        price: f64,
        bar_index: usize,
        time: NaiveDateTime,
    },
    Rejected {
        id: OrderId,
        reason: RejectReason,
    },
}

/// The venue interface the engine drives.
///
/// One engine instance owns one venue instance; fills for a run are never
/// reordered relative to bars, which the one-outstanding-order invariant
/// depends on.
pub trait ExecutionVenue: Send {
    /// Submit a bracket: market entry plus stop-loss and take-profit legs.
    /// Returns the entry order id as the acknowledgement.
    fn submit_bracket(
        &mut self,
        side: OrderSide,
        stop_loss: f64,
        take_profit: f64,
        bar_index: usize,
    ) -> OrderId;

    /// Replace the active protective stop with a tighter trigger level.
    /// Returns the new stop order id, or `None` when no position is open.
    fn replace_stop(&mut self, trigger: f64, bar_index: usize) -> Option<OrderId>;

    /// Advance one bar and deliver any fill/rejection events it produced.
    fn on_bar(&mut self, bar_index: usize, bar: &Bar) -> Vec<OrderEvent>;
}

#[derive(Debug, Clone)]
struct ActiveBracket {
    entry_side: OrderSide,
    stop: f64,
    stop_id: OrderId,
    stop_role: OrderRole,
    take_profit: f64,
    take_profit_id: OrderId,
    /// Protective legs activate the bar the entry fills and are eligible
    /// from the following bar, so an exit can never share the entry's bar.
    activated_bar: usize,
}

/// Bracket-order fill simulator.
#[derive(Debug, Default)]
pub struct SimVenue {
    next_id: u64,
    pending_entry: Option<Order>,
    bracket: Option<ActiveBracket>,
}

impl SimVenue {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> OrderId {
        self.next_id += 1;
        OrderId(self.next_id)
    }

    fn check_exit(bracket: &ActiveBracket, bar: &Bar) -> Option<(OrderRole, OrderId, f64)> {
        match bracket.entry_side {
            OrderSide::Buy => {
                // Long position: stop below, target above. Stop has priority
                // when the bar's range touches both.
                if bar.low <= bracket.stop {
                    let price = if bar.open <= bracket.stop {
                        bar.open
                    } else {
                        bracket.stop
                    };
                    Some((bracket.stop_role, bracket.stop_id, price))
                } else if bar.high >= bracket.take_profit {
                    let price = if bar.open >= bracket.take_profit {
                        bar.open
                    } else {
                        bracket.take_profit
                    };
                    Some((OrderRole::TakeProfit, bracket.take_profit_id, price))
                } else {
                    None
                }
            }
            OrderSide::Sell => {
                if bar.high >= bracket.stop {
                    let price = if bar.open >= bracket.stop {
                        bar.open
                    } else {
                        bracket.stop
                    };
                    Some((bracket.stop_role, bracket.stop_id, price))
                } else if bar.low <= bracket.take_profit {
                    let price = if bar.open <= bracket.take_profit {
                        bar.open
                    } else {
                        bracket.take_profit
                    };
                    Some((OrderRole::TakeProfit, bracket.take_profit_id, price))
                } else {
                    None
                }
            }
        }
    }
}

impl ExecutionVenue for SimVenue {
    fn submit_bracket(
        &mut self,
        side: OrderSide,
        stop_loss: f64,
        take_profit: f64,
        bar_index: usize,
    ) -> OrderId {
        let id = self.next_id();
        debug!(
            order_id = id.0,
            ?side,
            stop_loss,
            take_profit,
            bar_index,
            "bracket submitted"
        );
        self.pending_entry = Some(Order {
            id,
            side,
            kind: OrderKind::Bracket {
                stop_loss,
                take_profit,
            },
            role: OrderRole::Entry,
            status: OrderStatus::Submitted,
            created_bar: bar_index,
        });
        id
    }

    fn replace_stop(&mut self, trigger: f64, bar_index: usize) -> Option<OrderId> {
        let id = self.next_id();
        let bracket = self.bracket.as_mut()?;
        bracket.stop = trigger;
        bracket.stop_id = id;
        bracket.stop_role = OrderRole::TrailingStop;
        debug!(order_id = id.0, trigger, bar_index, "protective stop replaced");
        Some(id)
    }

    fn on_bar(&mut self, bar_index: usize, bar: &Bar) -> Vec<OrderEvent> {
        let mut events = Vec::new();

        // Entry fills at the open of the bar after submission.
        if let Some(entry) = self.pending_entry.take() {
            if entry.created_bar < bar_index {
                let OrderKind::Bracket {
                    stop_loss,
                    take_profit,
                } = entry.kind
                else {
                    return events;
                };
                let stop_id = self.next_id();
                let take_profit_id = self.next_id();
                events.push(OrderEvent::Filled {
                    id: entry.id,
                    role: OrderRole::Entry,
                    side: entry.side,
                    price: bar.open,
                    bar_index,
                    time: bar.time,
                });
                self.bracket = Some(ActiveBracket {
                    entry_side: entry.side,
                    stop: stop_loss,
                    stop_id,
                    stop_role: OrderRole::StopLoss,
                    take_profit,
                    take_profit_id,
                    activated_bar: bar_index,
                });
                return events;
            }
            self.pending_entry = Some(entry);
            return events;
        }

        // Protective legs, eligible from the bar after activation.
        if let Some(bracket) = &self.bracket {
            if bar_index > bracket.activated_bar {
                if let Some((role, id, price)) = Self::check_exit(bracket, bar) {
                    let exit_side = bracket.entry_side.opposite();
                    events.push(OrderEvent::Filled {
                        id,
                        role,
                        side: exit_side,
                        price,
                        bar_index,
                        time: bar.time,
                    });
                    // OCO: the sibling leg dies with the fill.
                    self.bracket = None;
                }
            }
        }

        events
    }
}
