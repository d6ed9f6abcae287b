//! End-to-end run: discover, scatter, gather, rank.
use log::{info, warn};
use std::sync::Arc;
use volatility_common::config::Strategy;
use volatility_common::{Config, RankedReport, Result};

use crate::discovery::discover;
use crate::dispatcher::Dispatcher;
use crate::model::aggregator::{Aggregator, SharedAggregator};
use crate::model::worker::{IsolatedWorker, SharedMemoryWorker, Worker};

/// Build the worker for the configured strategy.
///
/// Only the shared-memory worker receives a handle to the aggregator.
pub fn build_worker(config: &Config, aggregator: &SharedAggregator) -> Arc<dyn Worker> {
    match config.strategy {
        Strategy::Shared => Arc::new(SharedMemoryWorker::new(
            Arc::clone(aggregator),
            config.reader.clone(),
        )),
        Strategy::Isolated => Arc::new(IsolatedWorker::new(config.reader.clone())),
    }
}

/// Scan `config.trades_dir` and rank the result.
///
/// `Ok(None)` means there was nothing to analyze: no files, or no file with a
/// single well-formed trade.
pub fn run(config: &Config) -> Result<Option<RankedReport>> {
    config.validate()?;

    let files = discover(&config.trades_dir)?;
    info!(
        "Found {} trade file(s) in {}",
        files.len(),
        config.trades_dir.display()
    );
    if files.is_empty() {
        return Ok(None);
    }

    let aggregator = Aggregator::shared();
    let worker = build_worker(config, &aggregator);
    let (stats, summary) =
        Dispatcher::new(config.max_workers, config.timeout).run(files, worker, &aggregator)?;
    if summary.crashed_workers > 0 || summary.timed_out_workers > 0 {
        warn!(
            "Report is partial: {} worker(s) crashed, {} timed out",
            summary.crashed_workers, summary.timed_out_workers
        );
    }
    if stats.is_empty() {
        info!("None of {} file(s) produced a statistic", summary.files);
    }

    Ok(RankedReport::select(stats.as_slice(), config.top_k))
}
