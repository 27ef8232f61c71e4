//! Leaderboard export — CSV of the ranked sweep results.
//!
//! One row per ranked run, with raw metrics, normalized sub-scores, and the
//! composite. Strategy parameters are embedded as a JSON object so a row is
//! reproducible without the original config.

use std::path::Path;

use anyhow::{Context, Result};

use crate::ranking::RankedRow;

/// Serialize a ranked leaderboard to CSV.
///
/// Columns: rank, run_id, strategy, params, symbol, timeframe,
/// final_balance, sharpe, max_drawdown, sqn, total_trades, win_rate,
/// norm_balance, norm_sharpe, norm_sqn, norm_drawdown, composite.
pub fn export_leaderboard_csv(rows: &[RankedRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "rank",
        "run_id",
        "strategy",
        "params",
        "symbol",
        "timeframe",
        "final_balance",
        "sharpe",
        "max_drawdown",
        "sqn",
        "total_trades",
        "win_rate",
        "norm_balance",
        "norm_sharpe",
        "norm_sqn",
        "norm_drawdown",
        "composite",
    ])?;

    for row in rows {
        wtr.write_record([
            row.rank.to_string(),
            row.spec.run_id(),
            row.spec.strategy.id().to_string(),
            params_json(&row.spec.strategy)?,
            row.spec.symbol.clone(),
            row.spec.timeframe.to_string(),
            format!("{:.2}", row.metrics.final_balance),
            optional(row.metrics.sharpe),
            format!("{:.2}", row.metrics.max_drawdown),
            optional(row.metrics.sqn),
            row.metrics.total_trades.to_string(),
            format!("{:.1}", row.metrics.win_rate),
            format!("{:.6}", row.norm_balance),
            format!("{:.6}", row.norm_sharpe),
            format!("{:.6}", row.norm_sqn),
            format!("{:.6}", row.norm_drawdown),
            format!("{:.6}", row.composite),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write the leaderboard CSV to a file.
pub fn write_leaderboard_csv(rows: &[RankedRow], path: &Path) -> Result<()> {
    let csv = export_leaderboard_csv(rows)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Strategy parameters as a JSON object, without the strategy tag.
fn params_json(kind: &pipslab_core::strategy::StrategyKind) -> Result<String> {
    let mut value = serde_json::to_value(kind).context("strategy serializes")?;
    if let Some(object) = value.as_object_mut() {
        object.remove("strategy");
    }
    serde_json::to_string(&value).context("params serialize")
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_default()
}
