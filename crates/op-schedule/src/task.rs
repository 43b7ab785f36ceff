//! Scheduling data: what runs, at what priority, how often.
//!
//! A `TaskItem` carries no callable — unlike the reference model's task
//! object, which closes over the concrete invocation. Binding a captured
//! closure to a value that also needs duplicate-preserving, stably-ordered
//! storage (the reference model's `multiset<TaskItem>`) doesn't translate
//! cleanly: there's no natural `Ord` for "two closures at the same priority
//! and task type, in insertion order". Instead a `TaskItem` is pure data —
//! `(agent_id, priority, cycle_time, delay, task_type)` — and the executing
//! side resolves the actual dispatch by matching `task_type`/`agent_id`
//! against the live component/channel graph when the task comes due. Channel
//! delivery is idempotent within a tick, so a redundant `UpdateTaskItem`
//! dispatch for the same target is harmless.

use std::cmp::Reverse;

use op_core::AgentId;

/// Mirrors the reference model's `TaskType` ordinals exactly: the scheduler's
/// tie-break (`priority` descending, then `task_type` ascending) depends on
/// this order, not just the names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskType {
    Trigger = 0,
    Update = 1,
    Spawning = 2,
    EventDetector = 3,
    Manipulator = 4,
    Observation = 5,
    UpdateGlobalDrivingView = 6,
    SyncGlobalData = 7,
}

pub const PRIORITY_SPAWNING: i32 = 5;
pub const PRIORITY_EVENTDETECTOR: i32 = 4;
pub const PRIORITY_MANIPULATOR: i32 = 3;
pub const PRIORITY_SYNCGLOBALDATA: i32 = 2;
pub const PRIORITY_UPDATEGLOBALDRIVINGVIEW: i32 = 1;
pub const PRIORITY_OBSERVATION: i32 = 0;

/// One entry in the schedule: what kind of task, for which agent (if any),
/// at what priority, firing on what cycle.
///
/// `cycle_time_ms == 0` marks an init task: it fires exactly once, at
/// `delay_ms`, and is never rescheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskItem {
    pub agent_id: Option<AgentId>,
    pub priority: i32,
    pub cycle_time_ms: i64,
    pub delay_ms: i64,
    pub task_type: TaskType,
}

impl TaskItem {
    pub fn new(
        agent_id: Option<AgentId>,
        priority: i32,
        cycle_time_ms: i64,
        delay_ms: i64,
        task_type: TaskType,
    ) -> Self {
        Self {
            agent_id,
            priority,
            cycle_time_ms,
            delay_ms,
            task_type,
        }
    }

    pub fn trigger(agent_id: AgentId, priority: i32, cycle_time_ms: i64, offset_ms: i64) -> Self {
        Self::new(Some(agent_id), priority, cycle_time_ms, offset_ms, TaskType::Trigger)
    }

    pub fn update(agent_id: AgentId, priority: i32, cycle_time_ms: i64, delay_ms: i64) -> Self {
        Self::new(Some(agent_id), priority, cycle_time_ms, delay_ms, TaskType::Update)
    }

    pub fn spawning(cycle_time_ms: i64, delay_ms: i64) -> Self {
        Self::new(None, PRIORITY_SPAWNING, cycle_time_ms, delay_ms, TaskType::Spawning)
    }

    pub fn event_detector(cycle_time_ms: i64, delay_ms: i64) -> Self {
        Self::new(None, PRIORITY_EVENTDETECTOR, cycle_time_ms, delay_ms, TaskType::EventDetector)
    }

    pub fn manipulator(cycle_time_ms: i64, delay_ms: i64) -> Self {
        Self::new(None, PRIORITY_MANIPULATOR, cycle_time_ms, delay_ms, TaskType::Manipulator)
    }

    pub fn observation(cycle_time_ms: i64, delay_ms: i64) -> Self {
        Self::new(None, PRIORITY_OBSERVATION, cycle_time_ms, delay_ms, TaskType::Observation)
    }

    pub fn update_global_driving_view(cycle_time_ms: i64, delay_ms: i64) -> Self {
        Self::new(
            None,
            PRIORITY_UPDATEGLOBALDRIVINGVIEW,
            cycle_time_ms,
            delay_ms,
            TaskType::UpdateGlobalDrivingView,
        )
    }

    pub fn sync_global_data(cycle_time_ms: i64, delay_ms: i64) -> Self {
        Self::new(None, PRIORITY_SYNCGLOBALDATA, cycle_time_ms, delay_ms, TaskType::SyncGlobalData)
    }

    pub fn is_init(&self) -> bool {
        self.cycle_time_ms == 0
    }

    /// Whether this item fires at `timestamp_ms`, given it was scheduled for
    /// a window that already confirmed `timestamp_ms` as a candidate.
    pub fn fires_at(&self, timestamp_ms: i64) -> bool {
        if self.cycle_time_ms == 0 {
            return timestamp_ms == self.delay_ms;
        }
        (timestamp_ms - self.delay_ms) % self.cycle_time_ms == 0 && timestamp_ms >= self.delay_ms
    }
}

/// An unordered bag of task items, sorted on retrieval rather than on
/// insertion.
///
/// A `BTreeSet`-style ordered container would silently collapse items that
/// compare equal (same priority and task type but distinct agents), so
/// storage is a plain `Vec` and the ordering — descending priority, then
/// ascending task type, ties broken by insertion order — is applied only
/// when tasks are pulled for execution. `Vec::sort_by_key` is a stable sort,
/// so equal keys keep their relative insertion order without a custom `Ord`
/// on `TaskItem` itself.
#[derive(Clone, Debug, Default)]
pub struct Tasks {
    items: Vec<TaskItem>,
}

impl Tasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: TaskItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = TaskItem>) {
        self.items.extend(items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop every item belonging to one of `agent_ids`.
    pub fn remove_agents(&mut self, agent_ids: &[AgentId]) {
        self.items.retain(|item| match item.agent_id {
            Some(id) => !agent_ids.contains(&id),
            None => true,
        });
    }

    /// Items due at `timestamp_ms`, in execution order: descending priority,
    /// ascending task type, stable on ties.
    pub fn due_at(&self, timestamp_ms: i64) -> Vec<TaskItem> {
        let mut due: Vec<TaskItem> = self.items.iter().copied().filter(|i| i.fires_at(timestamp_ms)).collect();
        due.sort_by_key(|i| (Reverse(i.priority), i.task_type));
        due
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskItem> {
        self.items.iter()
    }

    pub fn clone_items(&self) -> Vec<TaskItem> {
        self.items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_at_orders_by_priority_then_task_type_stable() {
        let mut tasks = Tasks::new();
        tasks.push(TaskItem::manipulator(100, 0));
        tasks.push(TaskItem::spawning(100, 0));
        tasks.push(TaskItem::event_detector(100, 0));
        tasks.push(TaskItem::manipulator(100, 0));

        let due = tasks.due_at(0);
        let kinds: Vec<TaskType> = due.iter().map(|i| i.task_type).collect();
        assert_eq!(
            kinds,
            vec![
                TaskType::Spawning,
                TaskType::EventDetector,
                TaskType::Manipulator,
                TaskType::Manipulator,
            ]
        );
    }

    #[test]
    fn init_task_fires_once_at_delay() {
        let item = TaskItem::trigger(AgentId(0), 0, 0, 250);
        assert!(item.is_init());
        assert!(!item.fires_at(0));
        assert!(item.fires_at(250));
        assert!(!item.fires_at(350));
    }

    #[test]
    fn recurring_task_fires_on_cycle() {
        let item = TaskItem::update(AgentId(0), 0, 100, 50);
        assert!(!item.fires_at(0));
        assert!(item.fires_at(50));
        assert!(item.fires_at(150));
        assert!(!item.fires_at(120));
    }
}
