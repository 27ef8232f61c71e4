//! Swing-failure signal line.
//!
//! Looks at the `lookback` bars before the current one:
//! - Bearish failure (+1): current high takes out the prior swing high but
//!   the close falls back below it.
//! - Bullish failure (-1): current low takes out the prior swing low but
//!   the close recovers above it.
//! - 0 otherwise. Lookback bars of warm-up (`NaN`).

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct SwingSignal {
    lookback: usize,
    name: String,
}

impl SwingSignal {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "swing lookback must be >= 1");
        Self {
            lookback,
            name: format!("swing_signal_{lookback}"),
        }
    }
}

impl Indicator for SwingSignal {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        for i in self.lookback..n {
            let window = &bars[i - self.lookback..i];
            let swing_high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let swing_low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);

            result[i] = if bars[i].high > swing_high && bars[i].close < swing_high {
                1.0
            } else if bars[i].low < swing_low && bars[i].close > swing_low {
                -1.0
            } else {
                0.0
            };
        }
        result
    }
}
