//! Core error type.
//!
//! Sub-crates define their own error enums (`ComponentError`, `ScheduleError`,
//! `LocalizationError`, ...) for the error kinds specific to their domain and
//! convert them into `OpCoreError` via `From`, or keep them separate and wrap
//! `OpCoreError` as one variant. Both patterns are acceptable; prefer
//! whichever keeps error sites clean.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `op-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum OpCoreError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `op-core` and sub-crates that don't need a more
/// specific error enum.
pub type OpCoreResult<T> = Result<T, OpCoreError>;
