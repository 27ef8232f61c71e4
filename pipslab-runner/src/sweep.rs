//! Sweep orchestration — grid expansion and parallel run execution.
//!
//! Expansion is the cartesian product of each strategy's grid, crossed with
//! the configured symbols. Combinations a strategy rejects as nonsensical
//! are dropped during expansion. Execution fans runs out over a bounded
//! rayon pool; one failing run is recorded and skipped, never fatal for
//! the sweep.

use std::collections::BTreeMap;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use pipslab_core::engine;
use pipslab_core::strategy::StrategyKind;
use pipslab_core::EngineError;

use crate::config::{StrategyGrid, SweepConfig};
use crate::feed::BarFeed;
use crate::metrics::MetricsRecord;
use crate::spec::RunSpec;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("grid for {strategy} produced an invalid combination")]
    InvalidGrid {
        strategy: String,
        #[source]
        source: EngineError,
    },

    #[error("sweep expanded to zero runs")]
    EmptyPlan,

    #[error("failed to build the worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A run the sweep gave up on, with the reason it failed.
#[derive(Debug, Clone)]
pub struct RunFailure {
    pub spec: RunSpec,
    pub error: String,
}

/// Everything a finished sweep produced.
#[derive(Debug)]
pub struct SweepOutcome {
    pub records: Vec<(RunSpec, MetricsRecord)>,
    pub failures: Vec<RunFailure>,
}

/// Expand one strategy's grid into concrete strategy variants.
///
/// Parameters absent from the grid keep their defaults. Combinations the
/// strategy rejects (`is_valid`) are skipped. Unknown parameter names or
/// strategy ids are configuration errors.
pub fn expand_grid(grid: &StrategyGrid) -> Result<Vec<StrategyKind>, SweepError> {
    let names: Vec<&String> = grid.grid.keys().collect();
    let mut kinds = Vec::new();
    let mut assignment = BTreeMap::new();
    expand_recursive(grid, &names, 0, &mut assignment, &mut kinds)?;
    Ok(kinds)
}

fn expand_recursive(
    grid: &StrategyGrid,
    names: &[&String],
    depth: usize,
    assignment: &mut BTreeMap<String, serde_json::Value>,
    out: &mut Vec<StrategyKind>,
) -> Result<(), SweepError> {
    if depth == names.len() {
        let kind = StrategyKind::from_params(&grid.strategy, assignment).map_err(|source| {
            SweepError::InvalidGrid {
                strategy: grid.strategy.clone(),
                source,
            }
        })?;
        if kind.is_valid() {
            out.push(kind);
        } else {
            debug!(strategy = %grid.strategy, ?assignment, "nonsensical combination skipped");
        }
        return Ok(());
    }
    let name = names[depth];
    for value in &grid.grid[name] {
        assignment.insert(name.clone(), value.clone());
        expand_recursive(grid, names, depth + 1, assignment, out)?;
    }
    assignment.remove(name);
    Ok(())
}

/// Expand the whole config into the run plan: every surviving grid
/// combination, crossed with every symbol.
pub fn expand_runs(config: &SweepConfig) -> Result<Vec<RunSpec>, SweepError> {
    let mut specs = Vec::new();
    for grid in &config.strategies {
        for kind in expand_grid(grid)? {
            for symbol in &config.symbols {
                specs.push(RunSpec {
                    strategy: kind.clone(),
                    symbol: symbol.clone(),
                    timeframe: config.timeframe,
                    starting_cash: config.starting_cash,
                    lot_units: config.lot_units,
                    pip_size: config.pip_size,
                });
            }
        }
    }
    if specs.is_empty() {
        return Err(SweepError::EmptyPlan);
    }
    Ok(specs)
}

/// Run every expanded spec against the feed and aggregate metrics.
///
/// Each run loads its own bar series, so a symbol with broken data fails
/// only its own runs. Results come back in plan order regardless of the
/// worker schedule.
pub fn run_sweep(config: &SweepConfig, feed: &dyn BarFeed) -> Result<SweepOutcome, SweepError> {
    let specs = expand_runs(config)?;
    info!(
        runs = specs.len(),
        threads = config.max_concurrency,
        "sweep starting"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_concurrency)
        .build()?;

    let results: Vec<Result<(RunSpec, MetricsRecord), RunFailure>> = pool.install(|| {
        specs
            .into_par_iter()
            .map(|spec| execute_run(spec, feed))
            .collect()
    });

    let mut records = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(record) => records.push(record),
            Err(failure) => failures.push(failure),
        }
    }
    info!(
        succeeded = records.len(),
        failed = failures.len(),
        "sweep finished"
    );
    Ok(SweepOutcome { records, failures })
}

fn execute_run(
    spec: RunSpec,
    feed: &dyn BarFeed,
) -> Result<(RunSpec, MetricsRecord), RunFailure> {
    let fail = |spec: RunSpec, error: String| {
        warn!(
            run_id = %spec.run_id(),
            strategy = spec.strategy.id(),
            symbol = %spec.symbol,
            %error,
            "run failed, skipping"
        );
        Err(RunFailure { spec, error })
    };

    let bars = match feed.load(&spec.symbol, spec.timeframe) {
        Ok(bars) => bars,
        Err(e) => return fail(spec, e.to_string()),
    };
    let strategy = spec.strategy.build();
    let output = match engine::run(strategy.as_ref(), &bars, &spec.engine_config()) {
        Ok(output) => output,
        Err(e) => return fail(spec, e.to_string()),
    };
    let metrics = MetricsRecord::from_run(&output, spec.timeframe);
    Ok((spec, metrics))
}
