//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]` where they surface configuration problems.

use thiserror::Error;

/// Errors produced by `rn-core` (configuration validation).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `rn-core`.
pub type CoreResult<T> = Result<T, CoreError>;
