//! Command-line arguments for the volatility scanner.
//!
//! This module defines the CLI interface using `clap`. Every flag has a default,
//! so a bare `volatility_scanner` scans `./trades` with the standard settings.
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use volatility_common::Config;
use volatility_common::config::{
    DEFAULT_HEADER_LINES, DEFAULT_MAX_WORKERS, DEFAULT_TOP_K, DEFAULT_TRADES_DIR, Encoding,
    OutputFormat, ReaderOptions, Strategy, TickerPolicy,
};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory walked recursively for trade files.
    #[clap(long, default_value = DEFAULT_TRADES_DIR)]
    pub trades_dir: String,

    /// Number of tickers in the maximum and minimum groups.
    #[clap(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Upper bound on concurrently running workers.
    #[clap(long, default_value_t = DEFAULT_MAX_WORKERS)]
    pub max_workers: usize,

    /// How workers hand results back: a shared locked collection or one channel each.
    #[clap(long, value_enum, default_value_t = Strategy::Shared)]
    pub strategy: Strategy,

    /// Leading lines skipped in every trade file.
    #[clap(long, default_value_t = DEFAULT_HEADER_LINES)]
    pub header_lines: usize,

    /// Trade file text encoding.
    #[clap(long, value_enum, default_value_t = Encoding::Utf8)]
    pub encoding: Encoding,

    /// What to do when one file contains several tickers.
    #[clap(long, value_enum, default_value_t = TickerPolicy::LastSeen)]
    pub ticker_policy: TickerPolicy,

    /// Stop waiting for workers after this many seconds and report what arrived.
    #[clap(long)]
    pub timeout_secs: Option<u64>,

    /// Report format.
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            trades_dir: normalize_path(&args.trades_dir),
            top_k: args.top_k,
            max_workers: args.max_workers,
            strategy: args.strategy,
            reader: ReaderOptions {
                header_lines: args.header_lines,
                encoding: args.encoding,
                ticker_policy: args.ticker_policy,
            },
            timeout: args.timeout_secs.map(Duration::from_secs),
            format: args.format,
        }
    }
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}
