//! Stochastic oscillator %K, smoothed.
//!
//! Raw %K: 100 * (close - lowest_low) / (highest_high - lowest_low) over
//! `period` bars, then an SMA of length `smooth` over the raw series.
//! A flat window (highest == lowest) yields 50.0, the neutral reading.
//! Lookback: period + smooth - 2.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct StochasticK {
    period: usize,
    smooth: usize,
    name: String,
}

impl StochasticK {
    pub fn new(period: usize, smooth: usize) -> Self {
        assert!(period >= 1, "stochastic period must be >= 1");
        assert!(smooth >= 1, "stochastic smoothing must be >= 1");
        Self {
            period,
            smooth,
            name: format!("stoch_k_{period}_{smooth}"),
        }
    }
}

impl Indicator for StochasticK {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period + self.smooth - 2
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut raw = vec![f64::NAN; n];

        for i in (self.period - 1)..n {
            let window = &bars[i + 1 - self.period..=i];
            let hh = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let ll = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            raw[i] = if hh - ll <= f64::EPSILON {
                50.0
            } else {
                100.0 * (bars[i].close - ll) / (hh - ll)
            };
        }

        // SMA smoothing over the raw %K.
        let mut result = vec![f64::NAN; n];
        let first = self.period - 1 + self.smooth - 1;
        for i in first..n {
            let window = &raw[i + 1 - self.smooth..=i];
            result[i] = window.iter().sum::<f64>() / self.smooth as f64;
        }
        result
    }
}
