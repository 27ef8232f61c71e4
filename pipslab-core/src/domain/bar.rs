//! Bar — one OHLCV candle of an intraday feed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol at a single timeframe.
///
/// Bars are owned by the feed and referenced read-only by the engine.
/// Non-finite prices are rejected at the ingestion boundary (feed loading),
/// not re-validated per bar inside the loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Basic OHLC sanity: finite prices, high >= low, range contains open/close,
    /// close > 0.
    pub fn is_sane(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.close > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar {
            time: NaiveDate::from_ymd_opt(2024, 3, 4)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            open: 1.0850,
            high: 1.0862,
            low: 1.0841,
            close: 1.0855,
            volume: 1_200,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_rejects_inverted_range() {
        let mut bar = sample_bar();
        bar.high = 1.0830; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_rejects_non_finite_price() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar.time, deser.time);
        assert_eq!(bar.close, deser.close);
        assert_eq!(bar.volume, deser.volume);
    }
}
