//! Sweep configuration — the TOML surface of a parameter sweep.
//!
//! A config names the symbols and timeframe, account sizing, normalization
//! scheme, and one grid per strategy. Grid values are lists per parameter
//! name; unlisted parameters keep the strategy's defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ranking::Normalization;
use crate::spec::Timeframe;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sweep config")]
    Parse(#[from] toml::de::Error),

    #[error("sweep config names no symbols")]
    NoSymbols,

    #[error("sweep config names no strategies")]
    NoStrategies,

    #[error("starting cash must be positive, got {0}")]
    NonPositiveCash(f64),
}

/// Grid of candidate values for one strategy's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyGrid {
    /// Strategy id ("ma_crossover", "crash_boom", ...).
    pub strategy: String,
    /// Candidate values per parameter name. An empty map sweeps the single
    /// all-defaults combination.
    #[serde(default)]
    pub grid: BTreeMap<String, Vec<serde_json::Value>>,
}

/// Top-level sweep configuration, usually loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    pub symbols: Vec<String>,
    pub timeframe: Timeframe,
    #[serde(default = "default_starting_cash")]
    pub starting_cash: f64,
    #[serde(default = "default_lot_units")]
    pub lot_units: f64,
    #[serde(default = "default_pip_size")]
    pub pip_size: f64,
    /// Worker thread cap for the sweep; 0 means one thread per core.
    #[serde(default)]
    pub max_concurrency: usize,
    #[serde(default)]
    pub normalization: Normalization,
    pub strategies: Vec<StrategyGrid>,
}

fn default_starting_cash() -> f64 {
    100_000.0
}

fn default_lot_units() -> f64 {
    1_000.0
}

fn default_pip_size() -> f64 {
    0.0001
}

impl SweepConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        if self.starting_cash <= 0.0 {
            return Err(ConfigError::NonPositiveCash(self.starting_cash));
        }
        Ok(())
    }
}
