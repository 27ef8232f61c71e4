//! PipsLab runner — sweep orchestration, metrics, and ranking.
//!
//! This crate builds on `pipslab-core` to provide:
//! - Bar feeds (CSV layout and in-memory) with ingestion validation
//! - Run identity (`RunSpec` with a blake3 run id)
//! - Per-run metric aggregation (balance, Sharpe, drawdown, SQN, win rate)
//! - Grid expansion and parallel sweep execution over rayon
//! - Multi-criteria ranking with min-max or z-score normalization
//! - Leaderboard CSV export

pub mod config;
pub mod export;
pub mod feed;
pub mod metrics;
pub mod ranking;
pub mod spec;
pub mod sweep;

pub use config::{ConfigError, StrategyGrid, SweepConfig};
pub use export::{export_leaderboard_csv, write_leaderboard_csv};
pub use feed::{BarFeed, CsvBarFeed, FeedError, MemoryFeed};
pub use metrics::MetricsRecord;
pub use ranking::{rank, Normalization, RankedRow};
pub use spec::{RunSpec, Timeframe};
pub use sweep::{expand_runs, run_sweep, RunFailure, SweepError, SweepOutcome};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn sweep_types_are_send_sync() {
        assert_send::<RunSpec>();
        assert_sync::<RunSpec>();
        assert_send::<MetricsRecord>();
        assert_sync::<MetricsRecord>();
        assert_send::<SweepConfig>();
        assert_sync::<SweepConfig>();
        assert_send::<RankedRow>();
        assert_sync::<RankedRow>();
    }
}
