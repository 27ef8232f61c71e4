//! Indicator trait, precomputed columns, and concrete implementations.
//!
//! Indicators are pure functions: bar history in, numeric series out. Each
//! strategy declares the indicators it needs; the engine computes them once
//! before the bar loop and queries values by bar index during the loop.
//!
//! Multi-series indicators (Bollinger) are exposed as separate named
//! instances per band, keeping the single-series trait unchanged.

use std::collections::HashMap;

use crate::domain::Bar;

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod sma;
pub mod stochastic;
pub mod swing;

pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::Ema;
pub use sma::Sma;
pub use stochastic::StochasticK;
pub use swing::SwingSignal;

/// Trait for indicators.
///
/// `compute` returns a series of the same length as `bars`; the first
/// `lookback()` values are `f64::NAN` (warm-up). No value at bar t may
/// depend on data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Stable name the strategy uses to query values (e.g. "ema_400").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Precomputed indicator series, queried by name and bar index.
///
/// Warm-up (`NaN`) values are reported as `None` — the "not ready" contract
/// from the indicator interface. Strategies never see a fabricated value.
#[derive(Debug, Clone, Default)]
pub struct IndicatorColumns {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorColumns {
    /// Compute every indicator over the bar series and collect the columns.
    pub fn compute(indicators: &[Box<dyn Indicator>], bars: &[Bar]) -> Self {
        let mut columns = Self::default();
        for ind in indicators {
            columns
                .series
                .insert(ind.name().to_string(), ind.compute(bars));
        }
        columns
    }

    /// Insert a named series directly (tests and composed callers).
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Current value at `bar_index`, or `None` during warm-up.
    pub fn value(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
            .filter(|v| !v.is_nan())
    }

    /// Value one bar before `bar_index` (for crossing detection), or `None`.
    pub fn previous(&self, name: &str, bar_index: usize) -> Option<f64> {
        if bar_index == 0 {
            return None;
        }
        self.value(name, bar_index - 1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Longest warm-up over a set of indicators. No entries are possible until
/// this many bars have elapsed.
pub fn max_lookback(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}

#[cfg(test)]
pub(crate) const DEFAULT_EPSILON: f64 = 1e-9;

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "expected {expected}, got {actual}"
    );
}

/// Create synthetic bars from close prices for testing.
///
/// Open = previous close (or close for the first bar), high/low bracket the
/// body by one pip-scale tick, timestamps advance one minute per bar.
#[cfg(test)]
pub(crate) fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                time: base + chrono::Duration::minutes(i as i64),
                open,
                high: open.max(close) + 0.0001,
                low: open.min(close) - 0.0001,
                close,
                volume: 1_000,
            }
        })
        .collect()
}
