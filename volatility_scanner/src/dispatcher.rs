//! Scatter-gather over trade files.
//!
//! The dispatcher splits the discovered files into contiguous chunks, spawns one
//! thread per chunk and runs the configured `Worker` on it. Each thread owns the
//! sending half of a one-shot `crossbeam_channel::bounded(1)` channel and sends
//! its `PartialResult` there when the chunk is done; the dispatcher waits on
//! every channel in turn, which is the gather barrier. Only then is the
//! aggregator frozen.
//!
//! Failure handling:
//! - A worker that panics drops its sender without sending. The dispatcher sees
//!   the disconnect, joins the thread and logs how many files were affected.
//! - With a timeout, workers that have not reported by the deadline are logged
//!   and left running detached; the aggregator is frozen with what has arrived,
//!   so their late appends are rejected.
use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use volatility_common::{Result, VolatilityError};

use crate::model::aggregator::{FrozenStats, SharedAggregator};
use crate::model::worker::{Chunk, PartialResult, Worker};

/// Split `files` into at most `max_workers` contiguous chunks.
///
/// With more files than workers every chunk gets `files / max_workers` files and
/// the last one also takes the remainder. Otherwise a single chunk holds all
/// files. Every file lands in exactly one chunk; no files means no chunks.
pub fn partition(files: Vec<PathBuf>, max_workers: usize) -> Vec<Chunk> {
    let total = files.len();
    if total == 0 {
        return Vec::new();
    }
    let max_workers = max_workers.max(1);
    let (workers, chunk_size) = if total > max_workers {
        (max_workers, total / max_workers)
    } else {
        (1, total)
    };

    let mut indexed = files.into_iter().enumerate();
    (0..workers)
        .map(|worker_id| {
            let files: Vec<(usize, PathBuf)> = if worker_id == workers - 1 {
                indexed.by_ref().collect()
            } else {
                indexed.by_ref().take(chunk_size).collect()
            };
            Chunk { worker_id, files }
        })
        .collect()
}

/// Totals of one gather phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Workers spawned.
    pub workers: usize,
    /// Files handed to workers.
    pub files: usize,
    /// Files that produced a statistic.
    pub produced: usize,
    /// Files that could not be read or were rejected.
    pub failed_files: usize,
    /// Malformed lines skipped.
    pub skipped_lines: usize,
    /// Workers that crashed before reporting.
    pub crashed_workers: usize,
    /// Workers still running when the timeout expired.
    pub timed_out_workers: usize,
}

struct Running {
    worker_id: usize,
    files: usize,
    result_rx: Receiver<PartialResult>,
    handle: JoinHandle<()>,
}

/// Runs one worker per chunk and gathers their results.
pub struct Dispatcher {
    max_workers: usize,
    timeout: Option<Duration>,
}

impl Dispatcher {
    /// Create a dispatcher bounded by `max_workers` threads.
    pub fn new(max_workers: usize, timeout: Option<Duration>) -> Self {
        Self {
            max_workers,
            timeout,
        }
    }

    /// Process `files` with `worker` and freeze `aggregator` once all workers reported.
    pub fn run(
        &self,
        files: Vec<PathBuf>,
        worker: Arc<dyn Worker>,
        aggregator: &SharedAggregator,
    ) -> Result<(FrozenStats, RunSummary)> {
        let mut summary = RunSummary {
            files: files.len(),
            ..RunSummary::default()
        };

        let chunks = partition(files, self.max_workers);
        summary.workers = chunks.len();
        info!(
            "Dispatching {} files to {} {} worker(s)",
            summary.files,
            summary.workers,
            worker.name()
        );

        let mut running = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            running.push(spawn(chunk, Arc::clone(&worker))?);
        }

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        for task in running {
            let received = match deadline {
                Some(deadline) => task.result_rx.recv_deadline(deadline),
                None => task
                    .result_rx
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(partial) => {
                    absorb(&mut summary, &partial);
                    if !partial.stats.is_empty() {
                        aggregator.lock()?.extend(partial.stats)?;
                    }
                    if task.handle.join().is_err() {
                        error!("Worker {} panicked after reporting", task.worker_id);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    summary.crashed_workers += 1;
                    let reason = match task.handle.join() {
                        Err(panic) => panic_message(panic.as_ref()),
                        Ok(()) => "exited without reporting".to_string(),
                    };
                    error!(
                        "Worker {} crashed ({}); results of its {} file(s) may be missing",
                        task.worker_id, reason, task.files
                    );
                }
                Err(RecvTimeoutError::Timeout) => {
                    summary.timed_out_workers += 1;
                    warn!(
                        "Worker {} did not finish before the timeout; its {} file(s) are not fully reported",
                        task.worker_id, task.files
                    );
                }
            }
        }

        if summary.timed_out_workers > 0 {
            warn!(
                "Timeout expired with {} worker(s) outstanding, reporting partial results",
                summary.timed_out_workers
            );
        }

        let frozen = aggregator.lock()?.freeze()?;
        info!(
            "Gathered {} statistic(s): {} file(s) failed, {} line(s) skipped",
            frozen.len(),
            summary.failed_files,
            summary.skipped_lines
        );
        Ok((frozen, summary))
    }
}

fn spawn(chunk: Chunk, worker: Arc<dyn Worker>) -> Result<Running> {
    let worker_id = chunk.worker_id;
    let files = chunk.len();
    let (result_tx, result_rx) = bounded::<PartialResult>(1);

    let handle = thread::Builder::new()
        .name(format!("volatility-worker-{}", worker_id))
        .spawn(move || {
            let partial = worker.submit(chunk);
            // The dispatcher stops listening only after a timeout.
            let _ = result_tx.send(partial);
        })
        .map_err(VolatilityError::Io)?;

    Ok(Running {
        worker_id,
        files,
        result_rx,
        handle,
    })
}

fn absorb(summary: &mut RunSummary, partial: &PartialResult) {
    debug!(
        "Worker {} done: {} of {} file(s) produced a statistic",
        partial.worker_id, partial.produced, partial.files
    );
    summary.produced += partial.produced;
    summary.failed_files += partial.failed_files;
    summary.skipped_lines += partial.skipped_lines;
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
