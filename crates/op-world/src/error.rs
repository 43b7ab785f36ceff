//! Error kinds surfaced by the world model and localization engine.

use op_core::{AgentId, RoadId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("road {0} not found")]
    RoadNotFound(RoadId),

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type WorldResult<T> = Result<T, WorldError>;

/// Localization failed to place an agent on the road network.
///
/// This is locally recoverable: the caller marks the agent invalid and
/// schedules it for removal at the tick boundary rather than treating this
/// as a hard error for the run.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LocalizationError {
    #[error("no candidate point fell inside any lane element")]
    OffRoad,

    #[error("fewer than both front corners and both rear corners were located")]
    NotLocalizable,
}
