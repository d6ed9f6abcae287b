//! Selection of the maximum, minimum and zero volatility groups.
//!
//! All sorts are stable, so instruments with equal volatility keep the order in
//! which their files were discovered. Zero entries never appear in the minimum
//! group; both volatility groups are returned highest first.
use serde::Serialize;

use crate::volatility::VolatilityStat;

/// The three report groups derived from the frozen statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedReport {
    /// Highest volatility first.
    pub top: Vec<VolatilityStat>,
    /// The `K` lowest nonzero volatilities, highest first.
    pub bottom: Vec<VolatilityStat>,
    /// Zero volatility instruments ordered by ticker.
    pub zeros: Vec<VolatilityStat>,
}

impl RankedReport {
    /// Rank `stats`, or `None` when there is nothing to rank.
    pub fn select(stats: &[VolatilityStat], k: usize) -> Option<Self> {
        if stats.is_empty() {
            return None;
        }
        Some(Self {
            top: top_k(stats, k),
            bottom: bottom_k(stats, k),
            zeros: zeros(stats),
        })
    }
}

/// The `k` highest volatilities, descending.
pub fn top_k(stats: &[VolatilityStat], k: usize) -> Vec<VolatilityStat> {
    let mut sorted = stats.to_vec();
    sort_descending(&mut sorted);
    sorted.truncate(k);
    sorted
}

/// The `k` lowest nonzero volatilities, returned descending.
pub fn bottom_k(stats: &[VolatilityStat], k: usize) -> Vec<VolatilityStat> {
    let mut nonzero: Vec<VolatilityStat> = stats.iter().filter(|s| !s.is_zero()).cloned().collect();
    nonzero.sort_by(|a, b| a.volatility.total_cmp(&b.volatility));
    nonzero.truncate(k);
    sort_descending(&mut nonzero);
    nonzero
}

/// Every zero volatility entry, ordered by ticker.
pub fn zeros(stats: &[VolatilityStat]) -> Vec<VolatilityStat> {
    let mut zeros: Vec<VolatilityStat> = stats.iter().filter(|s| s.is_zero()).cloned().collect();
    zeros.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    zeros
}

fn sort_descending(stats: &mut [VolatilityStat]) {
    stats.sort_by(|a, b| b.volatility.total_cmp(&a.volatility));
}
