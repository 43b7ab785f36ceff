//! The cross-cutting event network: records agent-based, collision, and
//! component-state-change events, and gives manipulators a handle back
//! into the respawner and run-result sink.

use std::collections::HashMap;

use op_core::{AgentId, ComponentId, EventId, Tick};

/// Bucket an event is routed into. `Undefined` events are dropped rather
/// than stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventCategory {
    AgentBased,
    Collision,
    ComponentStateChange,
    Undefined,
}

/// What happened, independent of the bookkeeping (id, category, time)
/// `EventNetwork` attaches to it.
#[derive(Clone, Debug)]
pub enum EventKind {
    AgentBased { agent_id: AgentId, detail: String },
    Collision { agent_a: AgentId, agent_b: Option<AgentId> },
    ComponentStateChange { agent_id: AgentId, component_id: ComponentId, detail: String },
}

impl EventKind {
    fn category(&self) -> EventCategory {
        match self {
            EventKind::AgentBased { .. } => EventCategory::AgentBased,
            EventKind::Collision { .. } => EventCategory::Collision,
            EventKind::ComponentStateChange { .. } => EventCategory::ComponentStateChange,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Event {
    pub id: EventId,
    pub time: Tick,
    pub kind: EventKind,
}

/// Collaborator invoked to reinstate a scenario agent after a transient
/// removal. A trait object so the event network never depends on a
/// concrete spawn-point implementation.
pub trait Respawner {
    fn respawn_agent(&mut self, t: Tick);
}

/// Collaborator that accumulates the run's terminal outcome.
pub trait RunResultSink {
    fn add_collision_id(&mut self, agent_id: AgentId);
}

#[derive(Default)]
pub struct EventNetwork {
    next_id: u64,
    active: HashMap<EventCategory, Vec<Event>>,
    archived: HashMap<EventCategory, Vec<Event>>,
    respawner: Option<Box<dyn Respawner>>,
    run_result: Option<Box<dyn RunResultSink>>,
}

impl EventNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self, respawner: Box<dyn Respawner>, run_result: Box<dyn RunResultSink>) {
        self.respawner = Some(respawner);
        self.run_result = Some(run_result);
    }

    /// Assign an id, route by category, and store in the active map.
    /// `Undefined` events are dropped and logged rather than stored.
    pub fn insert_event(&mut self, kind: EventKind, time: Tick) -> Option<EventId> {
        let category = kind.category();
        if category == EventCategory::Undefined {
            tracing::debug!("dropping event with undefined category");
            return None;
        }
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.active
            .entry(category)
            .or_default()
            .push(Event { id, time, kind });
        Some(id)
    }

    pub fn active_events(&self, category: EventCategory) -> &[Event] {
        self.active.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn archived_events(&self, category: EventCategory) -> &[Event] {
        self.archived.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Move all active events into the archive, appending per category.
    /// Called once per tick, after manipulation has run.
    pub fn clear_active_events(&mut self) {
        for (category, mut events) in self.active.drain() {
            self.archived.entry(category).or_default().append(&mut events);
        }
    }

    /// Drop archived events older than `t`, from the front of each
    /// category's list (chronological / insertion order).
    pub fn remove_old_events(&mut self, t: Tick) {
        for events in self.archived.values_mut() {
            while events.first().is_some_and(|e| e.time < t) {
                events.remove(0);
            }
        }
    }

    pub fn add_collision(&mut self, agent_id: AgentId) {
        if let Some(sink) = self.run_result.as_deref_mut() {
            sink.add_collision_id(agent_id);
        }
    }

    pub fn respawn(&mut self, t: Tick) {
        if let Some(respawner) = self.respawner.as_deref_mut() {
            respawner.respawn_agent(t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_events_are_dropped() {
        let mut network = EventNetwork::new();
        let id = network.insert_event(
            EventKind::AgentBased {
                agent_id: AgentId(0),
                detail: "spawned".into(),
            },
            Tick::ZERO,
        );
        assert!(id.is_some());
        assert_eq!(network.active_events(EventCategory::AgentBased).len(), 1);
    }

    #[test]
    fn clear_moves_active_to_archive() {
        let mut network = EventNetwork::new();
        network.insert_event(
            EventKind::Collision {
                agent_a: AgentId(0),
                agent_b: Some(AgentId(1)),
            },
            Tick(100),
        );
        network.clear_active_events();
        assert!(network.active_events(EventCategory::Collision).is_empty());
        assert_eq!(network.archived_events(EventCategory::Collision).len(), 1);
    }

    #[test]
    fn remove_old_events_drops_from_front() {
        let mut network = EventNetwork::new();
        network.insert_event(
            EventKind::AgentBased {
                agent_id: AgentId(0),
                detail: "a".into(),
            },
            Tick(0),
        );
        network.insert_event(
            EventKind::AgentBased {
                agent_id: AgentId(0),
                detail: "b".into(),
            },
            Tick(200),
        );
        network.clear_active_events();
        network.remove_old_events(Tick(100));
        assert_eq!(network.archived_events(EventCategory::AgentBased).len(), 1);
    }
}
