//! Startup configuration shared by the scanner and its workers.
//!
//! Every value is fixed once at startup (the binary builds a `Config` from its
//! command-line arguments) and never changes during a run.
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::VolatilityError;

/// Default root directory with trade files, relative to the working directory.
pub const DEFAULT_TRADES_DIR: &str = "trades";
/// Number of tickers reported in the maximum and minimum groups.
pub const DEFAULT_TOP_K: usize = 3;
/// Upper bound on concurrently running workers.
pub const DEFAULT_MAX_WORKERS: usize = 10;
/// Number of leading lines skipped in every trade file.
pub const DEFAULT_HEADER_LINES: usize = 1;

/// How workers hand their results back to the aggregator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Display, EnumString,
)]
#[clap(rename_all = "lower")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Strategy {
    /// Threads append into one mutex-protected aggregate.
    #[default]
    Shared,
    /// Threads share nothing and deliver results over a one-shot channel each.
    Isolated,
}

/// Text decoding applied to trade file lines.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Encoding {
    /// Strict UTF-8; undecodable lines are reported and skipped.
    #[default]
    #[value(name = "utf8")]
    #[strum(serialize = "utf8")]
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD.
    #[value(name = "utf8-lossy")]
    #[strum(serialize = "utf8-lossy")]
    Utf8Lossy,
}

/// Which ticker a file's statistic is attributed to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Display, EnumString,
)]
#[clap(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive, serialize_all = "kebab-case")]
pub enum TickerPolicy {
    /// The ticker of the last well-formed line wins; disagreement is only logged.
    #[default]
    LastSeen,
    /// A file whose lines disagree on the ticker is rejected.
    Strict,
}

/// Output format of the final report.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Display, EnumString,
)]
#[clap(rename_all = "lower")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Fixed console layout.
    #[default]
    Text,
    /// `RankedReport` encoded with serde_json.
    Json,
}

/// Per-file reading options, cloned into every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Leading lines skipped before trade records start.
    pub header_lines: usize,
    /// Line decoding.
    pub encoding: Encoding,
    /// Ticker attribution rule.
    pub ticker_policy: TickerPolicy,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            header_lines: DEFAULT_HEADER_LINES,
            encoding: Encoding::default(),
            ticker_policy: TickerPolicy::default(),
        }
    }
}

/// Complete configuration of one scanner run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory walked for trade files.
    pub trades_dir: PathBuf,
    /// Size of the maximum and minimum groups.
    pub top_k: usize,
    /// Upper bound on concurrently running workers.
    pub max_workers: usize,
    /// Concurrency strategy.
    pub strategy: Strategy,
    /// Per-file reading options.
    pub reader: ReaderOptions,
    /// Optional deadline for the gather phase.
    pub timeout: Option<Duration>,
    /// Report format.
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trades_dir: PathBuf::from(DEFAULT_TRADES_DIR),
            top_k: DEFAULT_TOP_K,
            max_workers: DEFAULT_MAX_WORKERS,
            strategy: Strategy::default(),
            reader: ReaderOptions::default(),
            timeout: None,
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), VolatilityError> {
        if self.max_workers == 0 {
            return Err(VolatilityError::Config(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(VolatilityError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
