//! Error kinds surfaced by the simulation orchestrator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// An input configuration is missing, malformed, or internally
    /// inconsistent — detected only at startup, before the tick loop runs.
    #[error("simulation configuration error: {0}")]
    ConfigurationError(String),

    #[error("unknown agent id {0}")]
    UnknownAgent(op_core::AgentId),

    #[error(transparent)]
    World(#[from] op_world::WorldError),

    #[error(transparent)]
    Component(#[from] op_component::ComponentError),
}

pub type SimResult<T> = Result<T, SimError>;
