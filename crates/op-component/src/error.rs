//! Error kinds surfaced by the component bus.

use op_core::ComponentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("component {0}: unknown port {1}")]
    InvalidLink(ComponentId, u8),

    #[error("component {0}: signal variant does not match port {1}'s expected type")]
    InvalidSignalType(ComponentId, u8),

    #[error("component {0}: could not construct outgoing signal for port {1}")]
    AllocationFailed(ComponentId, u8),
}

pub type ComponentResult<T> = Result<T, ComponentError>;
