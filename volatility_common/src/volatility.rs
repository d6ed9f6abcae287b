//! Per-file volatility statistic.
//!
//! Volatility here is the spread of a session's prices relative to their
//! midpoint: `(max - min) / ((max + min) / 2) * 100`. It is not rounded; the
//! report rounds to two decimals when printing.
use serde::{Deserialize, Serialize};

use crate::trade::PriceSeries;

/// Volatility of one ticker over one trade file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityStat {
    /// Security code.
    pub ticker: String,
    /// Spread in percent of the midpoint price.
    pub volatility: f64,
}

impl VolatilityStat {
    /// Create a statistic from already computed parts.
    pub fn new(ticker: impl Into<String>, volatility: f64) -> Self {
        Self {
            ticker: ticker.into(),
            volatility,
        }
    }

    /// Reduce a file's series to its statistic. `None` when the file had no usable trades.
    pub fn from_series(series: PriceSeries) -> Option<Self> {
        let volatility = volatility(&series.prices)?;
        let ticker = series.ticker?;
        Some(Self { ticker, volatility })
    }

    /// `true` for instruments whose price never moved.
    pub fn is_zero(&self) -> bool {
        self.volatility == 0.0
    }
}

/// Volatility of `prices` in percent, or `None` for an empty slice.
///
/// A zero midpoint (every price is zero) yields `0`.
pub fn volatility(prices: &[f64]) -> Option<f64> {
    let (min, max) = prices
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &price| match acc {
            None => Some((price, price)),
            Some((min, max)) => Some((min.min(price), max.max(price))),
        })?;

    // Halve first: `max + min` overflows near `f64::MAX`.
    let avg = min / 2.0 + max / 2.0;
    if avg == 0.0 {
        return Some(0.0);
    }
    Some((max - min) / avg * 100.0)
}
