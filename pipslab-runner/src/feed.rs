//! Bar feeds — injected providers of validated price history.
//!
//! The sweep never touches the filesystem directly; it asks a `BarFeed` for
//! the bars of a symbol/timeframe pair. `CsvBarFeed` reads the on-disk CSV
//! layout, `MemoryFeed` backs tests and embedded callers. Both validate at
//! ingestion so the engine only ever sees sane, strictly ordered bars.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::debug;

use pipslab_core::domain::Bar;

use crate::spec::Timeframe;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("no data for {symbol} {timeframe}")]
    NotFound { symbol: String, timeframe: Timeframe },

    #[error("feed for {symbol} {timeframe} is empty")]
    Empty { symbol: String, timeframe: Timeframe },

    #[error("bad timestamp at row {row}: {value}")]
    BadTimestamp { row: usize, value: String },

    #[error("bar at index {index} is not strictly after its predecessor")]
    NonMonotonic { index: usize },

    #[error("bar at index {index} has inconsistent or non-positive prices")]
    InsanePrices { index: usize },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV row")]
    Csv(#[from] csv::Error),
}

/// Source of validated bar history for one symbol/timeframe pair.
pub trait BarFeed: Send + Sync {
    fn load(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>, FeedError>;
}

/// Reject feeds the engine cannot process: empty, out of order, or with
/// bars whose prices are internally inconsistent.
pub fn validate_bars(bars: &[Bar], symbol: &str, timeframe: Timeframe) -> Result<(), FeedError> {
    if bars.is_empty() {
        return Err(FeedError::Empty {
            symbol: symbol.to_string(),
            timeframe,
        });
    }
    for (i, bar) in bars.iter().enumerate() {
        if !bar.is_sane() {
            return Err(FeedError::InsanePrices { index: i });
        }
        if i > 0 && bar.time <= bars[i - 1].time {
            return Err(FeedError::NonMonotonic { index: i });
        }
    }
    Ok(())
}

// ─── CSV feed ───────────────────────────────────────────────────────

/// On-disk feed: one file per symbol and timeframe under a root directory,
/// named `{symbol}_{timeframe}.csv` with columns
/// `time,open,high,low,close,volume`.
#[derive(Debug, Clone)]
pub struct CsvBarFeed {
    root: PathBuf,
}

impl CsvBarFeed {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.root.join(format!("{symbol}_{timeframe}.csv"))
    }
}

impl BarFeed for CsvBarFeed {
    fn load(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>, FeedError> {
        let path = self.path_for(symbol, timeframe);
        if !path.exists() {
            return Err(FeedError::NotFound {
                symbol: symbol.to_string(),
                timeframe,
            });
        }
        let bars = read_bars_csv(&path)?;
        validate_bars(&bars, symbol, timeframe)?;
        debug!(symbol, %timeframe, bars = bars.len(), "feed loaded");
        Ok(bars)
    }
}

#[derive(Debug, serde::Deserialize)]
struct BarRow {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

fn read_bars_csv(path: &Path) -> Result<Vec<Bar>, FeedError> {
    let file = std::fs::File::open(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let mut bars = Vec::new();
    for (row, record) in reader.deserialize::<BarRow>().enumerate() {
        let record = record?;
        let time = NaiveDateTime::parse_from_str(&record.time, TIME_FORMAT).map_err(|_| {
            FeedError::BadTimestamp {
                row,
                value: record.time.clone(),
            }
        })?;
        bars.push(Bar {
            time,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }
    Ok(bars)
}

// ─── In-memory feed ─────────────────────────────────────────────────

/// In-memory feed keyed by symbol and timeframe.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed {
    series: HashMap<(String, Timeframe), Vec<Bar>>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, timeframe: Timeframe, bars: Vec<Bar>) {
        self.series.insert((symbol.into(), timeframe), bars);
    }
}

impl BarFeed for MemoryFeed {
    fn load(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>, FeedError> {
        let bars = self
            .series
            .get(&(symbol.to_string(), timeframe))
            .cloned()
            .ok_or_else(|| FeedError::NotFound {
                symbol: symbol.to_string(),
                timeframe,
            })?;
        validate_bars(&bars, symbol, timeframe)?;
        Ok(bars)
    }
}
