//! Multi-criteria ranking of sweep results.
//!
//! Runs that never traded or ended with a non-positive Sharpe are filtered
//! out before scoring. The surviving metrics are normalized column-wise,
//! drawdown is sign-inverted first so that smaller drawdowns score higher,
//! and the composite is a fixed weighted sum. Ties on the composite break
//! by final balance. Ranking the same records twice yields the same order.

use serde::{Deserialize, Serialize};

use crate::metrics::MetricsRecord;
use crate::spec::RunSpec;

pub const WEIGHT_BALANCE: f64 = 0.40;
pub const WEIGHT_SHARPE: f64 = 0.20;
pub const WEIGHT_SQN: f64 = 0.10;
pub const WEIGHT_DRAWDOWN: f64 = 0.30;

/// Column normalization scheme applied before the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Rescale to [0, 1] over the column's observed range.
    #[default]
    MinMax,
    /// Standard score: (x - mean) / std.
    ZScore,
}

impl Normalization {
    /// Normalize a column. A degenerate column (identical values, so the
    /// denominator vanishes) maps every entry to 0.0.
    pub fn apply(self, values: &[f64]) -> Vec<f64> {
        if values.is_empty() {
            return Vec::new();
        }
        match self {
            Self::MinMax => {
                let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                if range < 1e-15 {
                    return vec![0.0; values.len()];
                }
                values.iter().map(|v| (v - min) / range).collect()
            }
            Self::ZScore => {
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                if std < 1e-15 {
                    return vec![0.0; values.len()];
                }
                values.iter().map(|v| (v - mean) / std).collect()
            }
        }
    }
}

/// One row of the ranked leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedRow {
    pub rank: usize,
    pub spec: RunSpec,
    pub metrics: MetricsRecord,
    pub norm_balance: f64,
    pub norm_sharpe: f64,
    pub norm_sqn: f64,
    /// Normalized inverted drawdown: higher means a shallower drawdown.
    pub norm_drawdown: f64,
    pub composite: f64,
}

/// Rank sweep results by the weighted composite score.
///
/// Records with zero trades or without a positive Sharpe never appear in
/// the output, whatever their balance.
pub fn rank(
    records: Vec<(RunSpec, MetricsRecord)>,
    normalization: Normalization,
) -> Vec<RankedRow> {
    let survivors: Vec<(RunSpec, MetricsRecord)> = records
        .into_iter()
        .filter(|(_, m)| m.total_trades > 0 && m.sharpe.is_some_and(|s| s > 0.0))
        .collect();
    if survivors.is_empty() {
        return Vec::new();
    }

    let balances: Vec<f64> = survivors.iter().map(|(_, m)| m.final_balance).collect();
    let sharpes: Vec<f64> = survivors
        .iter()
        .map(|(_, m)| m.sharpe.unwrap_or(0.0))
        .collect();
    let sqns: Vec<f64> = survivors.iter().map(|(_, m)| m.sqn.unwrap_or(0.0)).collect();
    // Invert before normalizing so shallow drawdowns come out on top.
    let drawdowns: Vec<f64> = survivors.iter().map(|(_, m)| -m.max_drawdown).collect();

    let norm_balance = normalization.apply(&balances);
    let norm_sharpe = normalization.apply(&sharpes);
    let norm_sqn = normalization.apply(&sqns);
    let norm_drawdown = normalization.apply(&drawdowns);

    let mut rows: Vec<RankedRow> = survivors
        .into_iter()
        .enumerate()
        .map(|(i, (spec, metrics))| RankedRow {
            rank: 0,
            spec,
            metrics,
            norm_balance: norm_balance[i],
            norm_sharpe: norm_sharpe[i],
            norm_sqn: norm_sqn[i],
            norm_drawdown: norm_drawdown[i],
            composite: WEIGHT_BALANCE * norm_balance[i]
                + WEIGHT_SHARPE * norm_sharpe[i]
                + WEIGHT_SQN * norm_sqn[i]
                + WEIGHT_DRAWDOWN * norm_drawdown[i],
        })
        .collect();

    rows.sort_by(|a, b| {
        b.composite
            .partial_cmp(&a.composite)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                b.metrics
                    .final_balance
                    .partial_cmp(&a.metrics.final_balance)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Timeframe;
    use pipslab_core::strategy::{MaCrossoverParams, StrategyKind};

    fn spec(fast: usize) -> RunSpec {
        RunSpec {
            strategy: StrategyKind::MaCrossover(MaCrossoverParams {
                fast_period: fast,
                ..Default::default()
            }),
            symbol: "EURUSD".to_string(),
            timeframe: Timeframe::M5,
            starting_cash: 100_000.0,
            lot_units: 1_000.0,
            pip_size: 0.0001,
        }
    }

    fn metrics(
        final_balance: f64,
        sharpe: Option<f64>,
        max_drawdown: f64,
        sqn: Option<f64>,
        total_trades: usize,
    ) -> MetricsRecord {
        MetricsRecord {
            final_balance,
            sharpe,
            max_drawdown,
            sqn,
            total_trades,
            win_rate: 50.0,
        }
    }

    #[test]
    fn higher_balance_does_not_beat_shallower_drawdown_alone() {
        // A: higher balance, much deeper drawdown. B: slightly lower
        // balance, shallow drawdown, better sharpe. B must rank first.
        let a = metrics(130_000.0, Some(0.8), 20_000.0, Some(1.0), 20);
        let b = metrics(125_000.0, Some(1.6), 4_000.0, Some(2.0), 20);

        let rows = rank(vec![(spec(10), a), (spec(20), b)], Normalization::MinMax);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].metrics.final_balance, 125_000.0);
        // Hand-check: A gets 0.40 (balance), B gets 0.20+0.10+0.30.
        assert!((rows[1].composite - 0.40).abs() < 1e-12);
        assert!((rows[0].composite - 0.60).abs() < 1e-12);
    }

    #[test]
    fn drawdown_weight_dominates_a_modest_balance_edge() {
        // With equal SQN the drawdown and sharpe columns decide: B takes
        // 0.20 + 0.30, A only 0.40 for the balance column.
        let a = metrics(120_000.0, Some(1.2), 5_000.0, Some(1.0), 10);
        let b = metrics(110_000.0, Some(1.8), 2_000.0, Some(1.0), 10);

        let rows = rank(vec![(spec(10), a), (spec(20), b)], Normalization::MinMax);
        assert_eq!(rows[0].metrics.final_balance, 110_000.0);
        assert!((rows[0].composite - 0.50).abs() < 1e-12);
        assert!((rows[1].composite - 0.40).abs() < 1e-12);
    }

    #[test]
    fn zero_trade_and_non_positive_sharpe_runs_are_excluded() {
        let traded = metrics(110_000.0, Some(1.0), 2_000.0, Some(1.5), 10);
        let idle = metrics(100_000.0, None, 0.0, None, 0);
        let bleeding = metrics(150_000.0, Some(-0.2), 1_000.0, Some(0.5), 10);

        let rows = rank(
            vec![(spec(10), traded), (spec(20), idle), (spec(30), bleeding)],
            Normalization::MinMax,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metrics.final_balance, 110_000.0);
    }

    #[test]
    fn degenerate_columns_normalize_to_zero() {
        // Identical metrics across the board: every normalized column and
        // composite is exactly 0.0, and ties break by final balance (equal
        // here, so input order survives via stable sort).
        let m = metrics(110_000.0, Some(1.0), 2_000.0, Some(1.5), 10);
        let rows = rank(
            vec![(spec(10), m.clone()), (spec(20), m)],
            Normalization::MinMax,
        );
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.composite, 0.0);
            assert_eq!(row.norm_balance, 0.0);
            assert_eq!(row.norm_drawdown, 0.0);
        }
    }

    #[test]
    fn zscore_centers_the_columns() {
        let values = vec![1.0, 2.0, 3.0];
        let scored = Normalization::ZScore.apply(&values);
        assert!((scored.iter().sum::<f64>()).abs() < 1e-12);
        assert!(scored[0] < scored[1] && scored[1] < scored[2]);
    }

    #[test]
    fn ranking_is_idempotent() {
        let records: Vec<(RunSpec, MetricsRecord)> = vec![
            (spec(10), metrics(120_000.0, Some(1.2), 5_000.0, Some(1.8), 15)),
            (spec(20), metrics(115_000.0, Some(0.9), 3_000.0, Some(1.1), 12)),
            (spec(30), metrics(108_000.0, Some(1.5), 1_000.0, Some(2.4), 30)),
        ];
        let first = rank(records.clone(), Normalization::MinMax);
        let second = rank(records, Normalization::MinMax);
        let order_a: Vec<f64> = first.iter().map(|r| r.metrics.final_balance).collect();
        let order_b: Vec<f64> = second.iter().map(|r| r.metrics.final_balance).collect();
        assert_eq!(order_a, order_b);
        assert_eq!(first.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
