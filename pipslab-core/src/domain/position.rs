//! Position — the engine's single open exposure.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::order::OrderSide;

/// Direction of exposure. A position is never long and short at once; the
/// engine holds at most one `Position` and `Flat` is represented by holding
/// none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn from_side(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => Self::Long,
            OrderSide::Sell => Self::Short,
        }
    }

    /// +1.0 for long, -1.0 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }
}

/// An open position, owned exclusively by one engine instance for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,
    /// Size in base-currency units (e.g. 1_000 units = 0.01 lot).
    pub units: f64,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub entry_bar: usize,
    /// Currently active protective stop level (static or trailing).
    pub stop_price: f64,
}

impl Position {
    /// Unrealized P&L at the given mark price, in account currency.
    pub fn unrealized(&self, mark: f64) -> f64 {
        self.direction.sign() * (mark - self.entry_price) * self.units
    }

    /// Unrealized profit in pips at the given mark price.
    pub fn profit_pips(&self, mark: f64, pip_size: f64) -> f64 {
        self.direction.sign() * (mark - self.entry_price) / pip_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn long_position() -> Position {
        Position {
            direction: Direction::Long,
            units: 1_000.0,
            entry_price: 1.1000,
            entry_time: NaiveDate::from_ymd_opt(2024, 3, 4)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            entry_bar: 50,
            stop_price: 1.0950,
        }
    }

    #[test]
    fn unrealized_long() {
        let pos = long_position();
        assert!((pos.unrealized(1.1010) - 1.0).abs() < 1e-9);
        assert!((pos.unrealized(1.0990) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn profit_pips_short() {
        let mut pos = long_position();
        pos.direction = Direction::Short;
        // Short from 1.1000, mark 1.0980 → +20 pips.
        assert!((pos.profit_pips(1.0980, 0.0001) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn direction_from_side() {
        assert_eq!(Direction::from_side(OrderSide::Buy), Direction::Long);
        assert_eq!(Direction::from_side(OrderSide::Sell), Direction::Short);
    }
}
