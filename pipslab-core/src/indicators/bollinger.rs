//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! Three bands, separate `Indicator` instances sharing one computation:
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N). Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Lower)
    }

    fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        let tag = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{tag}_{period}"),
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &bars[i + 1 - self.period..=i];
            let mean = window.iter().map(|b| b.close).sum::<f64>() / self.period as f64;
            result[i] = match self.band {
                BollingerBand::Middle => mean,
                BollingerBand::Upper | BollingerBand::Lower => {
                    let var = window
                        .iter()
                        .map(|b| (b.close - mean).powi(2))
                        .sum::<f64>()
                        / self.period as f64;
                    let offset = self.multiplier * var.sqrt();
                    match self.band {
                        BollingerBand::Upper => mean + offset,
                        _ => mean - offset,
                    }
                }
            };
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn middle_band_is_sma() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        let mid = Bollinger::middle(3, 2.0).compute(&bars);
        assert_approx(mid[2], 11.0, DEFAULT_EPSILON);
        assert_approx(mid[3], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bands_straddle_middle_symmetrically() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 13.0, 12.0]);
        let mid = Bollinger::middle(4, 2.0).compute(&bars);
        let up = Bollinger::upper(4, 2.0).compute(&bars);
        let low = Bollinger::lower(4, 2.0).compute(&bars);

        for i in 3..bars.len() {
            assert!(up[i] > mid[i]);
            assert!(low[i] < mid[i]);
            assert_approx(up[i] - mid[i], mid[i] - low[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn zero_variance_bands_collapse() {
        let bars = make_bars(&[10.0; 6]);
        let up = Bollinger::upper(4, 2.0).compute(&bars);
        let low = Bollinger::lower(4, 2.0).compute(&bars);
        assert_approx(up[5], 10.0, DEFAULT_EPSILON);
        assert_approx(low[5], 10.0, DEFAULT_EPSILON);
    }
}
