//! Strategy trait and the five concrete variants.
//!
//! All strategies share one shape: declare indicators, evaluate an entry
//! predicate per bar, optionally manage a trailing stop. The state machine
//! in `engine` is shared generic code — a strategy only ever sees the
//! `BarContext` and answers "enter here, with these protective levels?".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, OrderSide};
use crate::error::EngineError;
use crate::indicators::{Indicator, IndicatorColumns};

pub mod crash_boom;
pub mod ma_crossover;
pub mod mean_reversion;
pub mod swing_failure;
pub mod trend_following;

pub use crash_boom::{CrashBoom, CrashBoomParams};
pub use ma_crossover::{MaCrossover, MaCrossoverParams};
pub use mean_reversion::{MeanReversion, MeanReversionParams};
pub use swing_failure::{SwingFailure, SwingFailureParams};
pub use trend_following::{TrendFollowing, TrendFollowingParams};

/// Read-only view of one bar plus the precomputed indicator columns.
pub struct BarContext<'a> {
    pub bars: &'a [Bar],
    pub index: usize,
    pub columns: &'a IndicatorColumns,
    pub pip_size: f64,
}

impl BarContext<'_> {
    pub fn bar(&self) -> &Bar {
        &self.bars[self.index]
    }

    pub fn close(&self) -> f64 {
        self.bars[self.index].close
    }

    /// Current indicator value, `None` during warm-up.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.columns.value(name, self.index)
    }

    /// Indicator value one bar back, `None` during warm-up.
    pub fn previous(&self, name: &str) -> Option<f64> {
        self.columns.previous(name, self.index)
    }
}

/// A satisfied entry predicate: direction plus protective levels for the
/// bracket order.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySignal {
    pub side: OrderSide,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Trailing-stop policy a strategy opts into.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailSpec {
    /// Name of the ATR column used to scale the trailing offset.
    pub atr: String,
    /// Unrealized profit in pips required before the stop starts moving.
    pub trigger_pips: f64,
    /// ATR multiplier for the trailing offset.
    pub atr_mult: f64,
}

/// One strategy variant: indicator wiring, entry predicate, risk levels.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Indicators this strategy needs, computed once before the bar loop.
    fn indicators(&self) -> Vec<Box<dyn Indicator>>;

    /// Entry predicate. `None` means stay flat this bar. The engine calls
    /// this only when flat, warm and with no order in flight.
    fn entry(&self, ctx: &BarContext) -> Option<EntrySignal>;

    /// Trailing-stop policy, if the strategy uses one.
    fn trailing(&self) -> Option<TrailSpec> {
        None
    }
}

/// Tagged strategy configuration: variant plus its parameter set.
///
/// This is the serializable identity of a strategy inside a `RunSpec`;
/// `build` turns it into the trait object the engine drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyKind {
    MaCrossover(MaCrossoverParams),
    MeanReversion(MeanReversionParams),
    TrendFollowing(TrendFollowingParams),
    CrashBoom(CrashBoomParams),
    SwingFailure(SwingFailureParams),
}

impl StrategyKind {
    /// Stable string id, matching the serde tag.
    pub fn id(&self) -> &'static str {
        match self {
            Self::MaCrossover(_) => "ma_crossover",
            Self::MeanReversion(_) => "mean_reversion",
            Self::TrendFollowing(_) => "trend_following",
            Self::CrashBoom(_) => "crash_boom",
            Self::SwingFailure(_) => "swing_failure",
        }
    }

    /// Build a kind from a strategy id and a named parameter assignment.
    /// Unlisted parameters keep their defaults; unknown names are a
    /// configuration error.
    pub fn from_params(
        id: &str,
        params: &BTreeMap<String, serde_json::Value>,
    ) -> Result<Self, EngineError> {
        let object = serde_json::Value::Object(
            params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        let invalid = |source| EngineError::InvalidParams {
            strategy: id.to_string(),
            source,
        };
        match id {
            "ma_crossover" => serde_json::from_value(object)
                .map(Self::MaCrossover)
                .map_err(invalid),
            "mean_reversion" => serde_json::from_value(object)
                .map(Self::MeanReversion)
                .map_err(invalid),
            "trend_following" => serde_json::from_value(object)
                .map(Self::TrendFollowing)
                .map_err(invalid),
            "crash_boom" => serde_json::from_value(object)
                .map(Self::CrashBoom)
                .map_err(invalid),
            "swing_failure" => serde_json::from_value(object)
                .map(Self::SwingFailure)
                .map_err(invalid),
            other => Err(EngineError::UnknownStrategy(other.to_string())),
        }
    }

    /// Parameter combinations a grid can produce that make no sense
    /// (e.g. a fast average at least as slow as the slow one).
    pub fn is_valid(&self) -> bool {
        match self {
            Self::MaCrossover(p) => p.fast_period < p.slow_period,
            _ => true,
        }
    }

    pub fn build(&self) -> Box<dyn Strategy> {
        match self {
            Self::MaCrossover(p) => Box::new(MaCrossover::new(p.clone())),
            Self::MeanReversion(p) => Box::new(MeanReversion::new(p.clone())),
            Self::TrendFollowing(p) => Box::new(TrendFollowing::new(p.clone())),
            Self::CrashBoom(p) => Box::new(CrashBoom::new(p.clone())),
            Self::SwingFailure(p) => Box::new(SwingFailure::new(p.clone())),
        }
    }
}
