//! The pre-computed timestamp window: a sliding `[lower_bound, upper_bound)`
//! range of scheduled ticks, regenerated from the live task population
//! whenever the window needs to grow.
//!
//! Keeping only a bounded window of timestamps (rather than the whole run's
//! schedule) keeps `next_timestamp` lookups cheap on a small sorted set
//! regardless of how long the run lasts.

use std::collections::BTreeSet;

use op_core::AgentId;

use crate::error::{ScheduleError, ScheduleResult};
use crate::task::{TaskItem, Tasks};

/// Tasks that exist for the whole run and never change: the framework's
/// spawning/event-detection/manipulation/observation/sync cadence.
#[derive(Clone, Debug, Default)]
pub struct SchedulerTasks {
    common: Tasks,
    recurring: Tasks,
    non_recurring: Tasks,
    finalize_recurring: Tasks,
    bootstrap: Tasks,
    finalize: Tasks,

    interval_ms: i64,
    lower_bound_ms: i64,
    upper_bound_ms: i64,
    scheduled_timestamps: BTreeSet<i64>,
}

impl SchedulerTasks {
    /// `start_time_ms` anchors the first window; `interval_ms` is the
    /// framework update rate (100ms by default) bounding its width.
    pub fn new(common: Tasks, start_time_ms: i64, interval_ms: i64) -> Self {
        let mut tasks = Self {
            common,
            recurring: Tasks::new(),
            non_recurring: Tasks::new(),
            finalize_recurring: Tasks::new(),
            bootstrap: Tasks::new(),
            finalize: Tasks::new(),
            interval_ms,
            lower_bound_ms: start_time_ms,
            upper_bound_ms: start_time_ms + interval_ms,
            scheduled_timestamps: BTreeSet::new(),
        };
        tasks.create_new_scheduled_timestamps();
        tasks
    }

    pub fn set_bootstrap_tasks(&mut self, tasks: Tasks) {
        self.bootstrap = tasks;
    }

    pub fn set_finalize_tasks(&mut self, tasks: Tasks) {
        self.finalize = tasks;
    }

    pub fn bootstrap_tasks(&self) -> &Tasks {
        &self.bootstrap
    }

    pub fn finalize_tasks(&self) -> &Tasks {
        &self.finalize
    }

    pub fn common_tasks(&self, timestamp_ms: i64) -> Vec<TaskItem> {
        self.common.due_at(timestamp_ms)
    }

    /// Pull every non-recurring task due at `timestamp_ms` and drop them
    /// from the internal list — each fires at most once per agent.
    pub fn consume_non_recurring_tasks(&mut self, timestamp_ms: i64) -> Vec<TaskItem> {
        let due = self.non_recurring.due_at(timestamp_ms);
        let remaining: Vec<TaskItem> = self
            .non_recurring
            .iter()
            .copied()
            .filter(|i| !i.fires_at(timestamp_ms))
            .collect();
        self.non_recurring.clear();
        self.non_recurring.extend(remaining);
        due
    }

    pub fn recurring_tasks(&self, timestamp_ms: i64) -> Vec<TaskItem> {
        self.recurring.due_at(timestamp_ms)
    }

    pub fn finalize_recurring_tasks(&self, timestamp_ms: i64) -> Vec<TaskItem> {
        self.finalize_recurring.due_at(timestamp_ms)
    }

    pub fn schedule_new_recurring_tasks(&mut self, items: impl IntoIterator<Item = TaskItem>) {
        for item in items {
            self.update_scheduled_timestamps(item.cycle_time_ms, item.delay_ms);
            self.recurring.push(item);
        }
    }

    pub fn schedule_new_non_recurring_tasks(&mut self, items: impl IntoIterator<Item = TaskItem>) {
        for item in items {
            self.update_scheduled_timestamps(item.cycle_time_ms, item.delay_ms);
            self.non_recurring.push(item);
        }
    }

    pub fn schedule_new_finalize_recurring_tasks(&mut self, items: impl IntoIterator<Item = TaskItem>) {
        for item in items {
            self.update_scheduled_timestamps(item.cycle_time_ms, item.delay_ms);
            self.finalize_recurring.push(item);
        }
    }

    /// Remove every recurring/non-recurring task belonging to `agent_ids`,
    /// then rebuild the timestamp window from scratch — a removal may have
    /// eliminated the only reason a timestamp was scheduled, so an
    /// incremental update can't be trusted to notice.
    pub fn delete_agent_tasks(&mut self, agent_ids: &[AgentId]) {
        self.recurring.remove_agents(agent_ids);
        self.non_recurring.remove_agents(agent_ids);
        self.finalize_recurring.remove_agents(agent_ids);
        self.create_new_scheduled_timestamps();
    }

    /// The smallest scheduled timestamp strictly greater than `timestamp_ms`,
    /// expanding the window forward first if necessary.
    pub fn next_timestamp(&mut self, timestamp_ms: i64) -> ScheduleResult<i64> {
        self.expand_upper_boundary(timestamp_ms);
        self.scheduled_timestamps
            .range((timestamp_ms + 1)..)
            .next()
            .copied()
            .ok_or(ScheduleError::NoTimestampAfter(timestamp_ms))
    }

    /// Whether `timestamp_ms` is itself a scheduled timestamp, expanding the
    /// window forward first if necessary.
    pub fn is_scheduled(&mut self, timestamp_ms: i64) -> bool {
        self.expand_upper_boundary(timestamp_ms);
        self.scheduled_timestamps.contains(&timestamp_ms)
    }

    fn expand_upper_boundary(&mut self, timestamp_ms: i64) {
        while timestamp_ms >= self.upper_bound_ms {
            self.lower_bound_ms += self.interval_ms;
            self.upper_bound_ms += self.interval_ms;
            self.create_new_scheduled_timestamps();
        }
    }

    /// Clear and rebuild the whole window from the current task population:
    /// both bounds themselves, then every common/recurring/non-recurring
    /// task's contribution within `[lower_bound, upper_bound)`.
    fn create_new_scheduled_timestamps(&mut self) {
        self.scheduled_timestamps.clear();
        self.scheduled_timestamps.insert(self.lower_bound_ms);
        self.scheduled_timestamps.insert(self.upper_bound_ms);

        let lower = self.lower_bound_ms;
        let upper = self.upper_bound_ms;
        let mut insert_for = |cycle_time_ms: i64, delay_ms: i64, set: &mut BTreeSet<i64>| {
            if delay_ms > lower && delay_ms < upper {
                set.insert(delay_ms);
            }
            if cycle_time_ms == 0 {
                return;
            }
            let mut current = cycle_time_ms + delay_ms;
            if current < lower {
                let skipped = ((lower - current) + cycle_time_ms - 1) / cycle_time_ms;
                current += skipped.max(0) * cycle_time_ms;
            }
            while current < upper {
                set.insert(current);
                current += cycle_time_ms;
            }
        };

        for item in self
            .common
            .iter()
            .chain(self.recurring.iter())
            .chain(self.non_recurring.iter())
            .chain(self.finalize_recurring.iter())
        {
            insert_for(item.cycle_time_ms, item.delay_ms, &mut self.scheduled_timestamps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskType;

    fn common() -> Tasks {
        let mut tasks = Tasks::new();
        tasks.push(TaskItem::spawning(100, 0));
        tasks
    }

    #[test]
    fn window_contains_bounds_and_common_cycle() {
        let mut scheduler_tasks = SchedulerTasks::new(common(), 0, 100);
        assert!(scheduler_tasks.is_scheduled(0));
        assert_eq!(scheduler_tasks.next_timestamp(0).unwrap(), 100);
    }

    #[test]
    fn recurring_task_beyond_first_window_expands() {
        let mut scheduler_tasks = SchedulerTasks::new(common(), 0, 100);
        scheduler_tasks.schedule_new_recurring_tasks([TaskItem::update(AgentId(0), 0, 250, 0)]);
        assert!(scheduler_tasks.is_scheduled(250));
    }

    #[test]
    fn delete_agent_tasks_removes_timestamp_that_only_that_agent_needed() {
        let mut scheduler_tasks = SchedulerTasks::new(common(), 0, 100);
        scheduler_tasks.schedule_new_recurring_tasks([TaskItem::update(AgentId(1), 0, 370, 0)]);
        assert!(scheduler_tasks.is_scheduled(370));
        scheduler_tasks.delete_agent_tasks(&[AgentId(1)]);
        assert!(!scheduler_tasks.is_scheduled(370));
    }

    #[test]
    fn non_recurring_task_consumed_once() {
        let mut scheduler_tasks = SchedulerTasks::new(common(), 0, 100);
        scheduler_tasks.schedule_new_non_recurring_tasks([TaskItem::trigger(AgentId(0), 0, 0, 0)]);
        let due = scheduler_tasks.consume_non_recurring_tasks(0);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].task_type, TaskType::Trigger);
        assert!(scheduler_tasks.consume_non_recurring_tasks(0).is_empty());
    }
}
