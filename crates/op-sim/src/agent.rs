//! Per-agent state as the simulation layer sees it: the world-facing half
//! (`WorldObject`), its component graph, and the channels wiring them
//! together.

use op_component::{Channel, Component, ComponentMap};
use op_core::SectionId;
use op_dynamics::DynamicsComponent;
use op_world::WorldObject;

/// Everything the simulation owns for one agent, beyond the task items
/// already registered with the scheduler.
pub struct AgentRecord {
    pub world: WorldObject,
    pub components: ComponentMap,
    pub channels: Vec<Channel>,
    /// Section of the agent's last successful localization hit, fed back
    /// into `locate`'s quickstart search next tick.
    pub search_initializer: Option<SectionId>,
}

impl AgentRecord {
    pub fn new(world: WorldObject, components: ComponentMap, channels: Vec<Channel>) -> Self {
        Self {
            world,
            components,
            channels,
            search_initializer: None,
        }
    }

    /// Resolve the component instance carrying `priority`, the key the
    /// scheduler's `TaskItem`s use to identify which component within this
    /// agent a dispatched Trigger/Update task targets (see `task.rs`'s
    /// doc comment on why `TaskItem` carries no component id directly).
    pub fn component_with_priority(&self, priority: i32) -> Option<op_core::ComponentId> {
        self.components.ids().find(|&id| self.components.get(id).is_some_and(|c| c.meta().priority == priority))
    }

    /// Copy the dynamics component's just-integrated pose into `self.world`,
    /// the one authoritative place the rest of the simulation (localization,
    /// the observer snapshot) reads an agent's position from.
    ///
    /// `component_id` is whichever component was just triggered; this is a
    /// no-op unless it downcasts to the dynamics component, since that's the
    /// sole writer of kinematic state.
    pub fn sync_world_from_dynamics(&mut self, component_id: op_core::ComponentId) {
        let Some(dynamics) = self.components.downcast_ref::<DynamicsComponent>(component_id) else {
            return;
        };
        let state = dynamics.kinematic_state();
        self.world.position = state.position;
        self.world.yaw = state.yaw;
        self.world.velocity = state.velocity;
        self.world.yaw_rate = state.yaw_rate;
        self.world.acceleration = state.acceleration;
        self.world.yaw_acceleration = state.yaw_acceleration;
    }
}
