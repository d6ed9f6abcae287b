//! Result type alias shared across the workspace.
//!
//! Defaults the error type to `VolatilityError`, so functions can simply
//! return `Result<T>`.
use crate::error::VolatilityError;

/// Workspace-wide `Result` alias with `VolatilityError` as the default error.
pub type Result<T, E = VolatilityError> = std::result::Result<T, E>;
