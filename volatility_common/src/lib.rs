//!
//! Common types and routines shared by the volatility scanner.
//!
//! This crate aggregates:
//! - `error` — unified error type `VolatilityError` used across the workspace.
//! - `result` — handy `Result<T, VolatilityError>` alias.
//! - `config` — startup configuration and its defaults.
//! - `trade` — trade records and the lazy per-file trade reader.
//! - `volatility` — the per-file volatility statistic.
//! - `rank` — top/bottom/zero selection over the frozen statistics.
//! - `report` — console and JSON rendering of a ranked report.
#![warn(missing_docs)]
pub mod config;
pub mod error;
pub mod rank;
pub mod report;
pub mod result;
pub mod trade;
pub mod volatility;

pub use config::Config;
pub use error::VolatilityError;
pub use rank::RankedReport;
pub use result::Result;
pub use volatility::VolatilityStat;
