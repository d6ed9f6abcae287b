//! Gather-side state and worker strategies of the scanner.
//!
//! - `aggregator` — the append-only collection of per-file statistics and its
//!   frozen, read-only view.
//! - `worker` — the `Worker` trait, the file chunk type and the shared-memory
//!   and isolated implementations.

pub mod aggregator;
pub mod worker;
