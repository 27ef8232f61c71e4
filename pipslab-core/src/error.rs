//! Error types for the engine and its data boundary.

use thiserror::Error;

/// Errors surfaced by a single engine run.
///
/// Order rejections are *not* errors — they are recovered locally and the
/// engine returns to FLAT. These variants cover data and configuration
/// problems that make the run itself meaningless.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("bar feed is empty")]
    EmptyFeed,

    #[error("bar timestamps are not strictly increasing at index {index}")]
    NonMonotonicFeed { index: usize },

    #[error("unknown strategy id '{0}'")]
    UnknownStrategy(String),

    #[error("invalid parameters for strategy '{strategy}': {source}")]
    InvalidParams {
        strategy: String,
        source: serde_json::Error,
    },

    #[error("indicator '{0}' was requested but never computed")]
    MissingIndicator(String),
}
