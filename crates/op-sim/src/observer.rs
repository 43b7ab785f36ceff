//! The observation hook: a trait-object seam fed from the scheduler's
//! `Observation` framework task (the lowest-priority per-tick slot, see
//! `op-schedule::task::TaskType`), so an output backend can snapshot agent
//! state once every tick without this crate depending on one.

use op_core::{AgentId, Tick, Vector2d};

/// One agent's pose and motion at the tick an observation snapshot was taken.
#[derive(Clone, Copy, Debug)]
pub struct AgentSnapshot {
    pub agent_id: AgentId,
    pub position: Vector2d,
    pub yaw: f64,
    pub velocity: Vector2d,
    pub acceleration: f64,
}

/// Everything an observer needs from one tick: every live agent's snapshot,
/// and whether a collision was recorded up to this point.
#[derive(Clone, Debug, Default)]
pub struct TickSnapshot {
    pub agents: Vec<AgentSnapshot>,
    pub collision: bool,
}

/// Collaborator notified once per tick (via the `Observation` task) and once
/// more at the end of the run. A trait object so `op-sim` doesn't depend on
/// any particular output backend.
pub trait SimObserver {
    fn on_tick(&mut self, t: Tick, snapshot: &TickSnapshot);
    fn on_sim_end(&mut self, t: Tick);
}

/// The default observer: does nothing. Used when no output backend is
/// registered.
#[derive(Default)]
pub struct NoopObserver;

impl SimObserver for NoopObserver {
    fn on_tick(&mut self, _t: Tick, _snapshot: &TickSnapshot) {}
    fn on_sim_end(&mut self, _t: Tick) {}
}
