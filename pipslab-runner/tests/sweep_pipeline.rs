//! End-to-end sweep: config in, ranked leaderboard CSV out.

use chrono::NaiveDate;

use pipslab_core::domain::Bar;
use pipslab_runner::{
    export_leaderboard_csv, rank, run_sweep, MemoryFeed, Normalization, SweepConfig, SweepError,
    Timeframe,
};

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                time: base + chrono::Duration::minutes(i as i64 * 5),
                open,
                high: open.max(close) + 0.0001,
                low: open.min(close) - 0.0001,
                close,
                volume: 1_000,
            }
        })
        .collect()
}

/// Rising series long enough for the crossover strategies to act.
fn trending_feed() -> MemoryFeed {
    let closes: Vec<f64> = (0..150).map(|i| 1.1000 + i as f64 * 0.0010).collect();
    let mut feed = MemoryFeed::new();
    feed.insert("EURUSD", Timeframe::M5, bars_from_closes(&closes));
    feed
}

const CONFIG: &str = r#"
symbols = ["EURUSD"]
timeframe = "M5"
max_concurrency = 2

[[strategies]]
strategy = "ma_crossover"
[strategies.grid]
fast_period = [5, 10]
slow_period = [20, 50]
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn sweep_produces_one_record_per_expanded_run() {
    init_tracing();
    let config = SweepConfig::from_toml_str(CONFIG).unwrap();
    let feed = trending_feed();

    let outcome = run_sweep(&config, &feed).unwrap();
    // 2x2 grid, all combinations valid (fast < slow throughout).
    assert_eq!(outcome.records.len(), 4);
    assert!(outcome.failures.is_empty());

    // Every run id is distinct.
    let mut ids: Vec<String> = outcome.records.iter().map(|(s, _)| s.run_id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);

    // A one-way rising market leaves every run profitable or flat.
    for (_, metrics) in &outcome.records {
        assert!(metrics.final_balance >= 100_000.0);
    }
}

#[test]
fn missing_symbol_fails_its_runs_without_killing_the_sweep() {
    let toml = r#"
symbols = ["EURUSD", "GBPUSD"]
timeframe = "M5"

[[strategies]]
strategy = "ma_crossover"
[strategies.grid]
fast_period = [5]
slow_period = [20]
"#;
    let config = SweepConfig::from_toml_str(toml).unwrap();
    let feed = trending_feed(); // only EURUSD has data

    let outcome = run_sweep(&config, &feed).unwrap();
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].spec.symbol, "GBPUSD");
    assert!(outcome.failures[0].error.contains("no data"));
}

#[test]
fn grid_that_expands_to_nothing_is_an_error() {
    // Every combination has fast >= slow, so expansion drops them all.
    let toml = r#"
symbols = ["EURUSD"]
timeframe = "M5"

[[strategies]]
strategy = "ma_crossover"
[strategies.grid]
fast_period = [50]
slow_period = [20, 50]
"#;
    let config = SweepConfig::from_toml_str(toml).unwrap();
    let feed = trending_feed();
    let err = run_sweep(&config, &feed).unwrap_err();
    assert!(matches!(err, SweepError::EmptyPlan));
}

#[test]
fn idle_runs_never_reach_the_leaderboard() {
    // 40 bars is under the default slow period's warm-up: the run completes
    // with zero trades and is filtered out of the ranking.
    let closes: Vec<f64> = (0..40).map(|i| 1.1000 + i as f64 * 0.0010).collect();
    let mut feed = MemoryFeed::new();
    feed.insert("EURUSD", Timeframe::M5, bars_from_closes(&closes));

    let toml = r#"
symbols = ["EURUSD"]
timeframe = "M5"

[[strategies]]
strategy = "ma_crossover"
"#;
    let config = SweepConfig::from_toml_str(toml).unwrap();
    let outcome = run_sweep(&config, &feed).unwrap();
    assert_eq!(outcome.records.len(), 1);
    let (_, metrics) = &outcome.records[0];
    assert_eq!(metrics.total_trades, 0);
    assert_eq!(metrics.final_balance, 100_000.0);
    assert_eq!(metrics.sharpe, None);

    let rows = rank(outcome.records, config.normalization);
    assert!(rows.is_empty());
}

#[test]
fn sweep_to_csv_pipeline() {
    let config = SweepConfig::from_toml_str(CONFIG).unwrap();
    let feed = trending_feed();

    let outcome = run_sweep(&config, &feed).unwrap();
    let rows = rank(outcome.records, Normalization::MinMax);
    let csv = export_leaderboard_csv(&rows).unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), rows.len() + 1);
    if let Some(first) = lines.get(1) {
        assert!(first.starts_with("1,"));
        assert!(first.contains("ma_crossover"));
    }

    // Ranks are 1..=n in order.
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.rank, i + 1);
    }
    // Composite never increases down the board.
    for pair in rows.windows(2) {
        assert!(pair[0].composite >= pair[1].composite);
    }
}
