//! `op-schedule` — the tick scheduler: task ordering, the pre-computed
//! timestamp window, the agent spawning gate, and the component-graph task
//! parser that feeds it.
//!
//! # What lives here
//!
//! | Module            | Contents                                             |
//! |--------------------|-------------------------------------------------------|
//! | [`task`]           | `TaskType`, `TaskItem`, `Tasks`                        |
//! | [`scheduler_tasks`]| `SchedulerTasks`, the sliding timestamp window         |
//! | [`agent_parser`]   | `parse_agent`, walks a component graph into task items |
//! | [`spawn_control`]  | `SpawnControl`, the hold-back/collision gate           |
//! | [`scheduler`]      | `Scheduler`, the main run loop                         |
//! | [`error`]          | `ScheduleError`, `SpawnControlError`                   |

pub mod agent_parser;
pub mod error;
pub mod scheduler;
pub mod scheduler_tasks;
pub mod spawn_control;
pub mod task;

pub use agent_parser::{parse_agent, ParsedAgentTasks};
pub use error::{ScheduleError, ScheduleResult, SpawnControlError, SpawnControlResult};
pub use scheduler::{EndCondition, Scheduler, SchedulerReturnState, SpawnHandler, TaskExecutor};
pub use scheduler_tasks::SchedulerTasks;
pub use spawn_control::{
    adapt_velocity_for_agent_blueprint, calculate_holdback_time, driving_corridor_does_not_overlap, AgentBlueprint,
    LeadAgentQuery, LeadAgentState, SpawnControl, SpawnPoint,
};
pub use task::{
    TaskItem, TaskType, Tasks, PRIORITY_EVENTDETECTOR, PRIORITY_MANIPULATOR, PRIORITY_OBSERVATION, PRIORITY_SPAWNING,
    PRIORITY_SYNCGLOBALDATA, PRIORITY_UPDATEGLOBALDRIVINGVIEW,
};
