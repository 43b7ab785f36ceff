//! The main tick loop: bootstrap, then alternate common/spawn/agent tasks
//! until an end condition or run boundary, then finalize.

use op_component::EventNetwork;
use op_core::{AgentId, Tick};

use crate::agent_parser::ParsedAgentTasks;
use crate::error::SpawnControlError;
use crate::scheduler_tasks::SchedulerTasks;
use crate::spawn_control::{LeadAgentQuery, SpawnControl};
use crate::task::{TaskItem, TaskType};

/// Outcome of a full `Scheduler::run` invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerReturnState {
    NoError,
    /// A scenario-critical condition could not be satisfied; the invocation
    /// (this particular run attempt) should be abandoned, but the caller may
    /// retry with a different seed or configuration.
    AbortInvocation,
    /// An unrecoverable failure occurred; the whole simulation should stop.
    AbortSimulation,
}

/// Executes a single task item against the live component/world state.
/// Returns `false` if the task failed — this is fatal for the invocation.
pub trait TaskExecutor {
    fn execute(&mut self, item: &TaskItem, t: Tick) -> bool;
}

/// Turns a cleared `AgentBlueprint` into a registered agent and its parsed
/// task items. Implemented by the simulation layer, which owns the world
/// and component graph that `op-schedule` only reasons about abstractly.
pub trait SpawnHandler {
    fn instantiate(&mut self, blueprint: crate::spawn_control::AgentBlueprint, t: Tick) -> (AgentId, ParsedAgentTasks);
}

/// Tells the scheduler whether the run has reached a natural stopping point
/// (e.g. the ego agent finished its route, or a collision ended the run).
pub trait EndCondition {
    fn is_finished(&self) -> bool;
}

struct FailedTask {
    task_type: TaskType,
    agent_id: Option<AgentId>,
    tick_ms: i64,
}

pub struct Scheduler {
    tasks: SchedulerTasks,
}

impl Scheduler {
    pub fn new(tasks: SchedulerTasks) -> Self {
        Self { tasks }
    }

    pub fn tasks_mut(&mut self) -> &mut SchedulerTasks {
        &mut self.tasks
    }

    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        start: Tick,
        end: Tick,
        executor: &mut dyn TaskExecutor,
        spawn_control: &mut SpawnControl,
        world_query: &dyn LeadAgentQuery,
        spawn_handler: &mut dyn SpawnHandler,
        end_condition: &dyn EndCondition,
        events: &mut EventNetwork,
    ) -> SchedulerReturnState {
        if let Some(failure) = self.execute_tasks(self.tasks.bootstrap_tasks().clone_items(), start, executor) {
            return self.classify_failure(failure);
        }

        let mut t = start;
        loop {
            if let Some(failure) = self.execute_tasks(self.tasks.common_tasks(t.0), t, executor) {
                return self.classify_failure(failure);
            }

            match spawn_control.execute(t.0, world_query) {
                Ok(()) => {}
                Err(SpawnControlError::IncompleteScenario) => return SchedulerReturnState::AbortInvocation,
                Err(SpawnControlError::AgentGenerationError) => return SchedulerReturnState::AbortSimulation,
            }
            for blueprint in spawn_control.pull_new_agents() {
                let (agent_id, parsed) = spawn_handler.instantiate(blueprint, t);
                self.tasks.schedule_new_recurring_tasks(parsed.recurring);
                self.tasks.schedule_new_non_recurring_tasks(parsed.non_recurring);
                let _ = agent_id;
            }

            if let Some(failure) = self.execute_tasks(self.tasks.consume_non_recurring_tasks(t.0), t, executor) {
                return self.classify_failure(failure);
            }

            if let Some(failure) = self.execute_tasks(self.tasks.recurring_tasks(t.0), t, executor) {
                return self.classify_failure(failure);
            }
            if let Some(failure) = self.execute_tasks(self.tasks.finalize_recurring_tasks(t.0), t, executor) {
                return self.classify_failure(failure);
            }

            if end_condition.is_finished() {
                return SchedulerReturnState::NoError;
            }

            events.clear_active_events();

            if t >= end {
                break;
            }
            t = match self.tasks.next_timestamp(t.0) {
                Ok(next) => Tick(next),
                Err(_) => break,
            };
            if t > end {
                break;
            }
        }

        if let Some(failure) = self.execute_tasks(self.tasks.finalize_tasks().clone_items(), t, executor) {
            return self.classify_failure(failure);
        }

        SchedulerReturnState::NoError
    }

    fn execute_tasks(&self, items: Vec<TaskItem>, t: Tick, executor: &mut dyn TaskExecutor) -> Option<FailedTask> {
        for item in &items {
            if !executor.execute(item, t) {
                return Some(FailedTask {
                    task_type: item.task_type,
                    agent_id: item.agent_id,
                    tick_ms: t.0,
                });
            }
        }
        None
    }

    fn classify_failure(&self, failure: FailedTask) -> SchedulerReturnState {
        tracing::error!(
            tick = failure.tick_ms,
            task_type = ?failure.task_type,
            agent_id = ?failure.agent_id,
            "task execution failed, aborting simulation"
        );
        SchedulerReturnState::AbortSimulation
    }
}
