//! Domain types shared across the engine, venue, and runner.

pub mod bar;
pub mod order;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use order::{Order, OrderId, OrderKind, OrderRole, OrderSide, OrderStatus, RejectReason};
pub use position::{Direction, Position};
pub use trade::TradeRecord;
