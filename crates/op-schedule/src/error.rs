//! Error kinds surfaced by the scheduler and the spawn gate.

use op_core::AgentId;
use thiserror::Error;

use crate::task::TaskType;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("task {task_type:?} for agent {agent_id:?} returned false at tick {tick_ms}")]
    TaskFailed {
        task_type: TaskType,
        agent_id: Option<AgentId>,
        tick_ms: i64,
    },

    #[error(transparent)]
    SpawnControl(#[from] SpawnControlError),

    #[error("no scheduled timestamp exists after {0}ms")]
    NoTimestampAfter(i64),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// A spawn-point policy could not produce a feasible agent.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpawnControlError {
    /// A scenario-named (non-common) agent could not be placed even after
    /// exhausting the hold-back window. The invocation cannot continue
    /// meaningfully without it.
    #[error("scenario agent could not be placed without a collision")]
    IncompleteScenario,

    /// A common (traffic-generator) agent could not be placed. The run can
    /// continue without it, but the attempt is abandoned for this invocation.
    #[error("agent blueprint could not be generated without a collision")]
    AgentGenerationError,
}

pub type SpawnControlResult<T> = Result<T, SpawnControlError>;
