//! Run identity — one immutable description per engine run.
//!
//! A `RunSpec` fully determines a run: strategy variant with parameters,
//! symbol, timeframe, and sizing. Its blake3 hash is the run id used to key
//! sweep results and exports.

use serde::{Deserialize, Serialize};

use pipslab_core::engine::EngineConfig;
use pipslab_core::strategy::StrategyKind;

/// Bar timeframe of the feed a run consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl Timeframe {
    /// Bar periods per year, for annualizing per-bar return statistics.
    /// Assumes 252 trading days on a 24-hour market.
    pub fn periods_per_year(self) -> f64 {
        const DAYS: f64 = 252.0;
        match self {
            Self::M1 => DAYS * 24.0 * 60.0,
            Self::M5 => DAYS * 24.0 * 12.0,
            Self::M15 => DAYS * 24.0 * 4.0,
            Self::M30 => DAYS * 24.0 * 2.0,
            Self::H1 => DAYS * 24.0,
            Self::H4 => DAYS * 6.0,
            Self::D1 => DAYS,
        }
    }

    /// Stable name used in feed file names and exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M5 => "M5",
            Self::M15 => "M15",
            Self::M30 => "M30",
            Self::H1 => "H1",
            Self::H4 => "H4",
            Self::D1 => "D1",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    #[serde(flatten)]
    pub strategy: StrategyKind,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub starting_cash: f64,
    pub lot_units: f64,
    pub pip_size: f64,
}

impl RunSpec {
    /// Deterministic run id: blake3 over the canonical JSON form.
    /// Equal specs always produce equal ids.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("RunSpec serializes");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            starting_cash: self.starting_cash,
            lot_units: self.lot_units,
            pip_size: self.pip_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipslab_core::strategy::MaCrossoverParams;

    fn sample_spec() -> RunSpec {
        RunSpec {
            strategy: StrategyKind::MaCrossover(MaCrossoverParams::default()),
            symbol: "EURUSD".to_string(),
            timeframe: Timeframe::M5,
            starting_cash: 100_000.0,
            lot_units: 1_000.0,
            pip_size: 0.0001,
        }
    }

    #[test]
    fn run_id_is_deterministic() {
        let spec = sample_spec();
        assert_eq!(spec.run_id(), spec.run_id());
        assert_eq!(spec.run_id().len(), 64);
    }

    #[test]
    fn run_id_changes_with_params() {
        let a = sample_spec();
        let mut b = sample_spec();
        b.strategy = StrategyKind::MaCrossover(MaCrossoverParams {
            fast_period: 20,
            ..Default::default()
        });
        assert_ne!(a.run_id(), b.run_id());

        let mut c = sample_spec();
        c.symbol = "GBPUSD".to_string();
        assert_ne!(a.run_id(), c.run_id());
    }

    #[test]
    fn periods_per_year_scales_with_timeframe() {
        assert_eq!(Timeframe::D1.periods_per_year(), 252.0);
        assert_eq!(
            Timeframe::M1.periods_per_year(),
            Timeframe::M5.periods_per_year() * 5.0
        );
        assert_eq!(Timeframe::H4.periods_per_year(), 252.0 * 6.0);
    }
}
