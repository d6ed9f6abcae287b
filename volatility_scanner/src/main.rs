//! Volatility scanner.
//!
//! This binary reads a session's trade files, computes per-ticker volatility and
//! prints the instruments with the highest, lowest and zero volatility.
//! Internally, it wires together four building blocks:
//!
//! - `discovery` — walks the trades directory and returns a sorted file list.
//! - `Dispatcher` — splits the list into at most `--max-workers` contiguous chunks
//!   and runs one worker thread per chunk.
//! - `Worker` — reads every file of its chunk, reduces it to a `VolatilityStat`
//!   and hands the result back either through the shared `Aggregator`
//!   (`--strategy shared`) or through its own one-shot channel
//!   (`--strategy isolated`).
//! - `RankedReport` — built from the frozen aggregate once every worker is done,
//!   then printed by `volatility_common::report`.
//!
//! Malformed lines and unreadable files are logged to stderr and skipped; they
//! never abort the run. Log verbosity follows `RUST_LOG` (default `info`).
//!
//! Usage example:
//! ```bash
//! volatility_scanner --trades-dir ./trades --max-workers 8 --strategy isolated
//! ```
#![warn(missing_docs)]
use crate::args::Args;
use crate::timer::RunTimer;
use clap::Parser;
use log::error;
use std::io;
use volatility_common::report;
use volatility_common::{Config, Result, VolatilityError};

mod args;
mod discovery;
mod dispatcher;
pub mod model;
mod pipeline;
mod timer;

fn main() -> Result<(), VolatilityError> {
    init_logger();
    let config: Config = Args::parse().into();

    let ranked = {
        let _timer = RunTimer::start("Volatility scan");
        pipeline::run(&config)
    };

    match ranked {
        Ok(report) => {
            let stdout = io::stdout();
            report::print(&mut stdout.lock(), report.as_ref(), config.format)
        }
        Err(e) => {
            error!("Scan failed: {}", e);
            Err(e)
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
