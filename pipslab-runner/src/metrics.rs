//! Performance metrics — pure functions over equity curves and trade lists.
//!
//! Every metric is a pure function: equity curve and/or trade list in,
//! scalar out. Undefined statistics (too few observations, zero variance)
//! come back as `None` rather than a sentinel, so the ranking layer can
//! filter on definedness instead of guessing.

use serde::{Deserialize, Serialize};

use pipslab_core::domain::TradeRecord;
use pipslab_core::engine::RunOutput;

use crate::spec::Timeframe;

/// Aggregate statistics for one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Realized balance at stream end.
    pub final_balance: f64,
    /// Annualized Sharpe ratio of per-bar equity returns. `None` when
    /// fewer than two returns exist or the returns have zero variance.
    pub sharpe: Option<f64>,
    /// Largest peak-to-trough equity decline, as a positive currency amount.
    pub max_drawdown: f64,
    /// System Quality Number over per-trade P&L. `None` when there are no
    /// trades or the P&L series has zero variance.
    pub sqn: Option<f64>,
    pub total_trades: usize,
    /// Winning trades as a percentage of all trades; 0.0 when none closed.
    pub win_rate: f64,
}

impl MetricsRecord {
    /// Compute all metrics from an engine run.
    pub fn from_run(output: &RunOutput, timeframe: Timeframe) -> Self {
        Self {
            final_balance: output.final_balance,
            sharpe: sharpe_ratio(&output.equity, timeframe.periods_per_year()),
            max_drawdown: max_drawdown(&output.equity),
            sqn: sqn(&output.trades),
            total_trades: output.trades.len(),
            win_rate: win_rate(&output.trades),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Annualized Sharpe ratio from per-bar equity returns.
///
/// Sharpe = mean(returns) / std(returns) * sqrt(periods_per_year).
/// `None` if fewer than two returns or zero variance.
pub fn sharpe_ratio(equity: &[f64], periods_per_year: f64) -> Option<f64> {
    let returns = bar_returns(equity);
    if returns.len() < 2 {
        return None;
    }
    let mean = mean_f64(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return None;
    }
    Some((mean / std) * periods_per_year.sqrt())
}

/// Maximum drawdown as a positive currency magnitude.
///
/// Returns 0.0 for constant or monotonically rising equity.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        let dd = peak - eq;
        if dd > max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// System Quality Number: mean(trade P&L) / std(trade P&L) * sqrt(n).
///
/// `None` for zero trades or a zero-variance P&L series.
pub fn sqn(trades: &[TradeRecord]) -> Option<f64> {
    if trades.is_empty() {
        return None;
    }
    let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
    let mean = mean_f64(&pnls);
    let std = std_dev(&pnls);
    if std < 1e-15 {
        return None;
    }
    Some((mean / std) * (pnls.len() as f64).sqrt())
}

/// Winning trades as a percentage of all trades; 0.0 when no trades closed.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// Per-bar fractional returns of an equity curve.
fn bar_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean_f64(values);
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}
