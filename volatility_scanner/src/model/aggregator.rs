//! Gather side of the pipeline.
//!
//! The `Aggregator` only grows while workers run and exposes no way to read its
//! contents other than `freeze`, which is called once after the gather barrier.
//! Every entry carries the discovery ordinal of its file, so the frozen view is
//! ordered the same way on every run, whatever order the workers finished in.
//!
//! The aggregator is not synchronized; the shared-memory strategy wraps it in
//! `Arc<Mutex<_>>` (see `SharedAggregator`).
use std::sync::{Arc, Mutex};

use volatility_common::{Result, VolatilityError, VolatilityStat};

/// Aggregator shared between the dispatcher and shared-memory workers.
pub type SharedAggregator = Arc<Mutex<Aggregator>>;

/// Collects per-file statistics until frozen.
#[derive(Debug, Default)]
pub struct Aggregator {
    entries: Vec<(usize, VolatilityStat)>,
    frozen: bool,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty aggregator ready to be shared between threads.
    pub fn shared() -> SharedAggregator {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Add the statistic of the file with discovery position `ordinal`.
    pub fn append(&mut self, ordinal: usize, stat: VolatilityStat) -> Result<()> {
        if self.frozen {
            return Err(VolatilityError::AggregatorFrozen(format!(
                "append of {} rejected",
                stat.ticker
            )));
        }
        self.entries.push((ordinal, stat));
        Ok(())
    }

    /// Add a batch of entries delivered by one worker.
    pub fn extend<I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (usize, VolatilityStat)>,
    {
        if self.frozen {
            return Err(VolatilityError::AggregatorFrozen(
                "batch append rejected".to_string(),
            ));
        }
        self.entries.extend(entries);
        Ok(())
    }

    /// `true` once `freeze` has been called.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Close the aggregator and hand out its contents ordered by ordinal.
    pub fn freeze(&mut self) -> Result<FrozenStats> {
        if self.frozen {
            return Err(VolatilityError::AggregatorFrozen(
                "freeze called twice".to_string(),
            ));
        }
        self.frozen = true;
        let mut entries = std::mem::take(&mut self.entries);
        entries.sort_by_key(|(ordinal, _)| *ordinal);
        Ok(FrozenStats(entries.into_iter().map(|(_, stat)| stat).collect()))
    }
}

/// Read-only statistics of a finished gather phase.
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenStats(Vec<VolatilityStat>);

impl FrozenStats {
    /// Statistics in file discovery order.
    pub fn as_slice(&self) -> &[VolatilityStat] {
        &self.0
    }

    /// Number of files that produced a statistic.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no file produced a statistic.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn stat(ticker: &str, volatility: f64) -> VolatilityStat {
        VolatilityStat::new(ticker, volatility)
    }

    #[test]
    fn test_freeze_orders_by_ordinal() {
        let mut aggregator = Aggregator::new();
        aggregator.append(2, stat("CCC", 3.0)).unwrap();
        aggregator.append(0, stat("AAA", 1.0)).unwrap();
        aggregator
            .extend(vec![(1, stat("BBB", 2.0))])
            .unwrap();

        let frozen = aggregator.freeze().unwrap();
        let tickers: Vec<&str> = frozen.as_slice().iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAA", "BBB", "CCC"]);
        assert_eq!(frozen.len(), 3);
    }

    #[test]
    fn test_append_after_freeze_is_rejected() {
        let mut aggregator = Aggregator::new();
        aggregator.append(0, stat("AAA", 1.0)).unwrap();
        let frozen = aggregator.freeze().unwrap();
        assert!(aggregator.is_frozen());

        assert!(matches!(
            aggregator.append(1, stat("BBB", 2.0)),
            Err(VolatilityError::AggregatorFrozen(_))
        ));
        assert!(matches!(
            aggregator.extend(vec![(1, stat("BBB", 2.0))]),
            Err(VolatilityError::AggregatorFrozen(_))
        ));
        assert!(matches!(
            aggregator.freeze(),
            Err(VolatilityError::AggregatorFrozen(_))
        ));
        assert_eq!(frozen.len(), 1);
    }

    #[test]
    fn test_empty_freeze() {
        let mut aggregator = Aggregator::new();
        assert!(aggregator.freeze().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_appends() {
        let aggregator = Aggregator::shared();
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let aggregator = Arc::clone(&aggregator);
                thread::spawn(move || {
                    for i in 0..50 {
                        let ordinal = worker * 50 + i;
                        aggregator
                            .lock()
                            .unwrap()
                            .append(ordinal, stat(&format!("T{}", ordinal), i as f64))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let frozen = aggregator.lock().unwrap().freeze().unwrap();
        assert_eq!(frozen.len(), 400);
        assert_eq!(frozen.as_slice()[0].ticker, "T0");
        assert_eq!(frozen.as_slice()[399].ticker, "T399");
    }
}
