//! Worker strategies.
//!
//! A `Worker` processes one `Chunk` of trade files on the calling thread and
//! returns a `PartialResult`. The dispatcher runs each `submit` call on its own
//! thread. The two implementations differ only in where per-file statistics go:
//!
//! - `SharedMemoryWorker` appends every statistic to the shared aggregator,
//!   holding the lock for the append only.
//! - `IsolatedWorker` keeps its statistics and returns them in the
//!   `PartialResult`, which the dispatcher receives over a channel dedicated to
//!   that worker.
//!
//! Line and file failures never escape `submit`: they are logged, counted and
//! skipped.
use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use volatility_common::config::ReaderOptions;
use volatility_common::trade::PriceSeries;
use volatility_common::{Result, VolatilityStat};

use crate::model::aggregator::SharedAggregator;

/// Contiguous slice of the discovered files handed to one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based worker index.
    pub worker_id: usize,
    /// Files with their discovery ordinals.
    pub files: Vec<(usize, PathBuf)>,
}

impl Chunk {
    /// Number of files in the chunk.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// `true` for a chunk without files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// What a worker reports back once its chunk is done.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialResult {
    /// Worker that produced the result.
    pub worker_id: usize,
    /// Files in the chunk.
    pub files: usize,
    /// Files that produced a statistic.
    pub produced: usize,
    /// Files that could not be read or were rejected.
    pub failed_files: usize,
    /// Malformed lines skipped across the chunk.
    pub skipped_lines: usize,
    /// Statistics carried back to the dispatcher; always empty for shared workers.
    pub stats: Vec<(usize, VolatilityStat)>,
}

/// One concurrency strategy.
pub trait Worker: Send + Sync {
    /// Strategy name used in logs.
    fn name(&self) -> &'static str;

    /// Process every file of `chunk`.
    fn submit(&self, chunk: Chunk) -> PartialResult;
}

/// Read and reduce one file, updating the chunk counters.
fn process_file(path: &Path, options: &ReaderOptions, partial: &mut PartialResult) -> Option<VolatilityStat> {
    let series = match PriceSeries::from_file(path, options) {
        Ok(series) => series,
        Err(e) => {
            warn!("Skipping file: {}", e);
            partial.failed_files += 1;
            return None;
        }
    };
    partial.skipped_lines += series.skipped;

    match VolatilityStat::from_series(series) {
        Some(stat) => {
            debug!(
                "{}: {} volatility {:.2} %",
                path.display(),
                stat.ticker,
                stat.volatility
            );
            Some(stat)
        }
        None => {
            debug!("{}: no trades, no statistic", path.display());
            None
        }
    }
}

/// Threads appending into one mutex-protected aggregator.
pub struct SharedMemoryWorker {
    aggregator: SharedAggregator,
    options: ReaderOptions,
}

impl SharedMemoryWorker {
    /// Create a worker that appends into `aggregator`.
    pub fn new(aggregator: SharedAggregator, options: ReaderOptions) -> Self {
        Self { aggregator, options }
    }

    fn append(&self, ordinal: usize, stat: VolatilityStat) -> Result<()> {
        self.aggregator.lock()?.append(ordinal, stat)
    }
}

impl Worker for SharedMemoryWorker {
    fn name(&self) -> &'static str {
        "shared"
    }

    fn submit(&self, chunk: Chunk) -> PartialResult {
        let mut partial = PartialResult {
            worker_id: chunk.worker_id,
            files: chunk.len(),
            ..PartialResult::default()
        };
        for (ordinal, path) in chunk.files {
            let Some(stat) = process_file(&path, &self.options, &mut partial) else {
                continue;
            };
            match self.append(ordinal, stat) {
                Ok(()) => partial.produced += 1,
                Err(e) => error!("Worker {}: {}: {}", chunk.worker_id, path.display(), e),
            }
        }
        partial
    }
}

/// Threads that share nothing and return their statistics.
pub struct IsolatedWorker {
    options: ReaderOptions,
}

impl IsolatedWorker {
    /// Create a worker with its own copy of the reader options.
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }
}

impl Worker for IsolatedWorker {
    fn name(&self) -> &'static str {
        "isolated"
    }

    fn submit(&self, chunk: Chunk) -> PartialResult {
        let mut partial = PartialResult {
            worker_id: chunk.worker_id,
            files: chunk.len(),
            ..PartialResult::default()
        };
        for (ordinal, path) in chunk.files {
            if let Some(stat) = process_file(&path, &self.options, &mut partial) {
                partial.stats.push((ordinal, stat));
                partial.produced += 1;
            }
        }
        partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::aggregator::Aggregator;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn chunk(dir: &TempDir) -> Chunk {
        let files = vec![
            write(dir, "a.csv", "SECID,TRADETIME,PRICE,QUANTITY\nAAA,10:00,11,1\nAAA,10:01,12,1\n"),
            write(dir, "b.csv", "SECID,TRADETIME,PRICE,QUANTITY\nbroken\nalso,broken\n"),
            write(dir, "c.csv", "SECID,TRADETIME,PRICE,QUANTITY\nCCC,10:00,5,1\nbad line\n"),
            dir.path().join("missing.csv"),
        ];
        Chunk {
            worker_id: 7,
            files: files.into_iter().enumerate().collect(),
        }
    }

    #[test]
    fn test_isolated_worker_returns_stats() {
        let dir = TempDir::new().unwrap();
        let partial = IsolatedWorker::new(ReaderOptions::default()).submit(chunk(&dir));

        assert_eq!(partial.worker_id, 7);
        assert_eq!(partial.files, 4);
        assert_eq!(partial.produced, 2);
        assert_eq!(partial.failed_files, 1);
        assert_eq!(partial.skipped_lines, 3);
        let ordinals: Vec<usize> = partial.stats.iter().map(|(o, _)| *o).collect();
        assert_eq!(ordinals, vec![0, 2]);
        assert_eq!(partial.stats[1].1, VolatilityStat::new("CCC", 0.0));
    }

    #[test]
    fn test_shared_worker_appends_into_aggregator() {
        let dir = TempDir::new().unwrap();
        let aggregator = Aggregator::shared();
        let worker = SharedMemoryWorker::new(aggregator.clone(), ReaderOptions::default());
        let partial = worker.submit(chunk(&dir));

        assert!(partial.stats.is_empty());
        assert_eq!(partial.produced, 2);
        assert_eq!(partial.failed_files, 1);

        let frozen = aggregator.lock().unwrap().freeze().unwrap();
        let tickers: Vec<&str> = frozen.as_slice().iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAA", "CCC"]);
    }

    #[test]
    fn test_shared_worker_after_freeze_loses_results_without_panicking() {
        let dir = TempDir::new().unwrap();
        let aggregator = Aggregator::shared();
        aggregator.lock().unwrap().freeze().unwrap();

        let worker = SharedMemoryWorker::new(aggregator, ReaderOptions::default());
        let partial = worker.submit(chunk(&dir));
        assert_eq!(partial.produced, 0);
    }
}
