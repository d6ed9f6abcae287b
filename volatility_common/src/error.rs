//! Error types shared by the reader, the workers and the binary.
//!
//! The `VolatilityError` enum covers the three recoverable failure levels of the
//! pipeline (a single line, a single file, the whole run producing nothing) plus
//! the plumbing failures of I/O, serialization, channels and locks.
use std::io;
use std::path::PathBuf;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type for the volatility pipeline.
#[derive(Error, Debug)]
pub enum VolatilityError {
    /// I/O error originating from the standard library (directory walk, stdout).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A single malformed trade line. Recovered by skipping the line.
    #[error("Malformed line <{line}>: {reason}")]
    LineParse {
        /// The offending line as read from the file.
        line: String,
        /// Human-readable parse failure.
        reason: String,
    },

    /// A trade file could not be opened or read. Recovered by skipping the file.
    #[error("Failed to read trade file {}: {source}", path.display())]
    FileRead {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A trade file mixes records of several tickers while strict checking is on.
    #[error("Trade file {} mixes tickers {first} and {other}", path.display())]
    MixedTickers {
        /// Path of the rejected file.
        path: PathBuf,
        /// Ticker of the first well-formed line.
        first: String,
        /// First ticker that disagreed with it.
        other: String,
    },

    /// The run produced no statistics at all.
    #[error("No data to analyze.")]
    NoData,

    /// The aggregator was touched after it was frozen; contains what was attempted.
    #[error("Aggregator is already frozen: {0}")]
    AggregatorFrozen(String),

    /// Invalid startup configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure while encoding the report as JSON.
    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Crossbeam/channel receive failed (e.g., a worker died before reporting).
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for VolatilityError {
    fn from(err: PoisonError<T>) -> Self {
        VolatilityError::MutexLock(err.to_string())
    }
}

impl VolatilityError {
    /// Shorthand for a `LineParse` error.
    pub fn line_parse(line: &str, reason: impl Into<String>) -> Self {
        VolatilityError::LineParse {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}
