//! Default collaborators for the trait-object seams `op-schedule` and
//! `op-component` leave open: reinstating a scenario agent after a
//! transient removal, and producing spawn candidates on a fixed cadence.
//!
//! Scenario definitions and spawn-point policies are themselves out of
//! scope (XML configuration loading, §1) — these are minimal, dependency-free
//! implementations of the trait boundary, suitable for tests and as a
//! starting point for a real scenario-driven policy.

use op_component::Respawner;
use op_core::{LaneId, RoadId, Tick};
use op_schedule::{AgentBlueprint, SpawnPoint};

/// A [`Respawner`] that only logs the request. Scenario-aware respawn
/// (reinstating a specific named agent at a specific position) requires
/// knowledge this crate doesn't have — a real implementation plugs in here.
#[derive(Default)]
pub struct LoggingRespawner;

impl Respawner for LoggingRespawner {
    fn respawn_agent(&mut self, t: Tick) {
        tracing::debug!(tick = t.0, "respawn requested, no respawn policy configured");
    }
}

/// Produces a blueprint at `road`/`lane`/`s` every `cycle_time_ms`, stopping
/// after `count` have been produced (or never, if `count` is `None`).
pub struct FixedIntervalSpawnPoint {
    road: RoadId,
    lane: LaneId,
    s: f64,
    velocity: f64,
    length: f64,
    is_scenario_member: bool,
    cycle_time_ms: i64,
    remaining: Option<u32>,
}

impl FixedIntervalSpawnPoint {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        road: RoadId,
        lane: LaneId,
        s: f64,
        velocity: f64,
        length: f64,
        is_scenario_member: bool,
        cycle_time_ms: i64,
        count: Option<u32>,
    ) -> Self {
        Self {
            road,
            lane,
            s,
            velocity,
            length,
            is_scenario_member,
            cycle_time_ms,
            remaining: count,
        }
    }
}

impl SpawnPoint for FixedIntervalSpawnPoint {
    fn next_blueprint(&mut self, _now_ms: i64) -> Option<AgentBlueprint> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        Some(AgentBlueprint {
            road: self.road,
            lane: self.lane,
            s: self.s,
            velocity: self.velocity,
            length: self.length,
            is_scenario_member: self.is_scenario_member,
        })
    }

    fn cycle_time_ms(&self) -> i64 {
        self.cycle_time_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_count_stops_producing_blueprints() {
        let mut spawn_point = FixedIntervalSpawnPoint::new(RoadId(0), LaneId(0), 0.0, 20.0, 5.0, false, 1000, Some(1));
        assert!(spawn_point.next_blueprint(0).is_some());
        assert!(spawn_point.next_blueprint(1000).is_none());
    }

    #[test]
    fn unbounded_count_keeps_producing() {
        let mut spawn_point = FixedIntervalSpawnPoint::new(RoadId(0), LaneId(0), 0.0, 20.0, 5.0, false, 1000, None);
        for _ in 0..5 {
            assert!(spawn_point.next_blueprint(0).is_some());
        }
    }
}
