//! Mediates between spawn-point policies and the scheduler: pulls blueprints
//! due this tick, checks whether placing them would cause an immediate
//! collision with a leading agent, and either instantiates them, delays them,
//! or reports the attempt as infeasible.
//!
//! The collision check (`driving_corridor_does_not_overlap`,
//! `calculate_holdback_time`) is a from-scratch reconstruction: the upstream
//! header this is grounded on documents the behaviour precisely enough to
//! reconstruct it — "extends the current bounding boxes of ego and opponent
//! by the assumed motion within a time to brake under a homogeneous motion
//! assumption and checks for overlap", hold-back search capped at 5000ms —
//! but its implementation file isn't in the reference material this was
//! built from. The formulas below follow that description literally using
//! standard longitudinal kinematics (constant-acceleration extrapolation,
//! `v²/2a` braking distance) rather than copying an unavailable original.

use op_core::{LaneId, RoadId};

use crate::error::{SpawnControlError, SpawnControlResult};

pub const MAX_HOLDBACK_TIME_MS: i64 = 5000;
pub const HOLDBACK_STEP_MS: i64 = 100;

/// A candidate agent a spawn point wants placed, before it has been
/// instantiated in the world.
#[derive(Clone, Debug)]
pub struct AgentBlueprint {
    pub road: RoadId,
    pub lane: LaneId,
    pub s: f64,
    pub velocity: f64,
    pub length: f64,
    /// Scenario-named agents (ego, explicitly placed actors) cannot simply
    /// be dropped if they don't fit; common traffic-generator agents can.
    pub is_scenario_member: bool,
}

/// State of the nearest agent ahead of a spawn position on the same lane,
/// as needed to project where it will be after some elapsed time.
#[derive(Clone, Copy, Debug)]
pub struct LeadAgentState {
    pub s: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub length: f64,
}

/// Collaborator that answers "what's ahead of this spawn point". A trait
/// object so `SpawnControl` doesn't depend on the concrete world/network
/// types; the scheduler only needs the longitudinal facts.
pub trait LeadAgentQuery {
    fn find_lead_agent(&self, road: RoadId, lane: LaneId, s: f64) -> Option<LeadAgentState>;
}

/// Produces candidate blueprints on demand. A trait object standing in for
/// the spawn-point network, which this crate treats as a black box.
pub trait SpawnPoint {
    fn next_blueprint(&mut self, now_ms: i64) -> Option<AgentBlueprint>;
    fn cycle_time_ms(&self) -> i64;
}

struct Policy {
    spawn_point: Box<dyn SpawnPoint>,
    next_due_ms: i64,
    held_back: Option<(AgentBlueprint, i64)>,
}

/// Extend `lead`'s position forward by the motion it's assumed to undergo
/// over `ttb_s` seconds (homogeneous acceleration), never letting it roll
/// backward.
fn project_lead_position(lead: &LeadAgentState, ttb_s: f64) -> f64 {
    let displacement = lead.velocity * ttb_s + 0.5 * lead.acceleration * ttb_s * ttb_s;
    lead.s + displacement.max(0.0)
}

/// Whether the ego's braking-extended footprint and the lead's
/// motion-extended footprint, both measured forward from ego's spawn `s`,
/// overlap. `false` means safe to spawn.
fn driving_corridor_overlaps(ego_s: f64, ego_length: f64, full_braking_distance_ego: f64, lead: &LeadAgentState, ttb_s: f64) -> bool {
    let ego_front_edge = ego_s + ego_length + full_braking_distance_ego;
    let lead_rear_edge = project_lead_position(lead, ttb_s);
    ego_front_edge >= lead_rear_edge
}

fn full_braking_distance(velocity: f64, max_deceleration: f64) -> f64 {
    if max_deceleration <= 0.0 {
        return f64::INFINITY;
    }
    (velocity * velocity) / (2.0 * max_deceleration)
}

/// Whether `blueprint`, placed now at its candidate velocity, would
/// immediately overlap `lead`'s assumed motion within `assumed_ttb_s`.
pub fn driving_corridor_does_not_overlap(
    blueprint: &AgentBlueprint,
    lead: &LeadAgentState,
    max_deceleration: f64,
    assumed_ttb_s: f64,
) -> bool {
    let full_braking_distance_ego = full_braking_distance(blueprint.velocity, max_deceleration);
    !driving_corridor_overlaps(blueprint.s, blueprint.length, full_braking_distance_ego, lead, assumed_ttb_s)
}

/// Reduce `blueprint.velocity` in 1 m/s steps until its corridor no longer
/// overlaps `lead`'s, or until it reaches zero. Returns the adapted
/// blueprint, or `None` if even a stationary placement still overlaps.
pub fn adapt_velocity_for_agent_blueprint(
    blueprint: &AgentBlueprint,
    lead: Option<&LeadAgentState>,
    max_deceleration: f64,
    assumed_ttb_s: f64,
) -> Option<AgentBlueprint> {
    let Some(lead) = lead else {
        return Some(blueprint.clone());
    };

    let mut candidate = blueprint.clone();
    loop {
        if driving_corridor_does_not_overlap(&candidate, lead, max_deceleration, assumed_ttb_s) {
            return Some(candidate);
        }
        if candidate.velocity <= 0.0 {
            return None;
        }
        candidate.velocity = (candidate.velocity - 1.0).max(0.0);
    }
}

/// Search up to [`MAX_HOLDBACK_TIME_MS`] of delay, in [`HOLDBACK_STEP_MS`]
/// steps, for a hold-back duration after which the lead agent (continuing
/// its own motion throughout the hold-back) has moved far enough that
/// `blueprint` no longer overlaps it. Returns the delay in ms, or `None` if
/// no delay within the window avoids the overlap.
pub fn calculate_holdback_time(
    blueprint: &AgentBlueprint,
    lead: &LeadAgentState,
    max_deceleration: f64,
    assumed_ttb_s: f64,
) -> Option<i64> {
    let mut holdback_ms = 0;
    while holdback_ms <= MAX_HOLDBACK_TIME_MS {
        let holdback_s = holdback_ms as f64 / 1000.0;
        let shifted_lead = LeadAgentState {
            s: project_lead_position(lead, holdback_s),
            velocity: lead.velocity,
            acceleration: lead.acceleration,
            length: lead.length,
        };
        if driving_corridor_does_not_overlap(blueprint, &shifted_lead, max_deceleration, assumed_ttb_s) {
            return Some(holdback_ms);
        }
        holdback_ms += HOLDBACK_STEP_MS;
    }
    None
}

/// Mediates between spawn-point policies and the scheduler.
pub struct SpawnControl {
    policies: Vec<Policy>,
    max_deceleration: f64,
    assumed_ttb_s: f64,
    pending: Vec<AgentBlueprint>,
}

impl SpawnControl {
    pub fn new(max_deceleration: f64, assumed_ttb_s: f64) -> Self {
        Self {
            policies: Vec::new(),
            max_deceleration,
            assumed_ttb_s,
            pending: Vec::new(),
        }
    }

    pub fn register(&mut self, spawn_point: Box<dyn SpawnPoint>, start_ms: i64) {
        self.policies.push(Policy {
            spawn_point,
            next_due_ms: start_ms,
            held_back: None,
        });
    }

    /// Run one tick: pull due blueprints, gate each through the velocity
    /// adaptation and hold-back search, and either queue it for spawning or
    /// propagate a fatal error for scenario-critical agents.
    pub fn execute(&mut self, now_ms: i64, world: &dyn LeadAgentQuery) -> SpawnControlResult<()> {
        for policy in &mut self.policies {
            if let Some((blueprint, deadline_ms)) = policy.held_back.take() {
                if now_ms >= deadline_ms {
                    self.pending.push(blueprint);
                } else {
                    policy.held_back = Some((blueprint, deadline_ms));
                }
                continue;
            }

            if now_ms < policy.next_due_ms {
                continue;
            }
            policy.next_due_ms += policy.spawn_point.cycle_time_ms().max(1);

            let Some(blueprint) = policy.spawn_point.next_blueprint(now_ms) else {
                continue;
            };

            let lead = world.find_lead_agent(blueprint.road, blueprint.lane, blueprint.s);
            if let Some(adapted) = adapt_velocity_for_agent_blueprint(&blueprint, lead.as_ref(), self.max_deceleration, self.assumed_ttb_s) {
                self.pending.push(adapted);
                continue;
            }

            let Some(lead) = lead else {
                unreachable!("adapt_velocity_for_agent_blueprint only fails when a lead agent exists");
            };
            match calculate_holdback_time(&blueprint, &lead, self.max_deceleration, self.assumed_ttb_s) {
                Some(holdback_ms) => policy.held_back = Some((blueprint, now_ms + holdback_ms)),
                None if blueprint.is_scenario_member => return Err(SpawnControlError::IncompleteScenario),
                None => return Err(SpawnControlError::AgentGenerationError),
            }
        }
        Ok(())
    }

    /// Drain and return every blueprint cleared for instantiation this tick.
    pub fn pull_new_agents(&mut self) -> Vec<AgentBlueprint> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint(s: f64, velocity: f64) -> AgentBlueprint {
        AgentBlueprint {
            road: RoadId(0),
            lane: LaneId(0),
            s,
            velocity,
            length: 5.0,
            is_scenario_member: false,
        }
    }

    #[test]
    fn no_lead_agent_is_always_feasible() {
        let bp = blueprint(0.0, 30.0);
        assert!(driving_corridor_does_not_overlap(
            &bp,
            &LeadAgentState { s: 1_000_000.0, velocity: 0.0, acceleration: 0.0, length: 5.0 },
            6.0,
            2.0,
        ));
    }

    #[test]
    fn close_stationary_lead_triggers_velocity_reduction() {
        let bp = blueprint(0.0, 30.0);
        let lead = LeadAgentState { s: 20.0, velocity: 0.0, acceleration: 0.0, length: 5.0 };
        let adapted = adapt_velocity_for_agent_blueprint(&bp, Some(&lead), 6.0, 2.0).unwrap();
        assert!(adapted.velocity < bp.velocity);
        assert!(driving_corridor_does_not_overlap(&adapted, &lead, 6.0, 2.0));
    }

    #[test]
    fn lead_driving_away_shortens_required_holdback() {
        let bp = blueprint(0.0, 30.0);
        let stationary = LeadAgentState { s: 8.0, velocity: 0.0, acceleration: 0.0, length: 5.0 };
        let departing = LeadAgentState { s: 8.0, velocity: 20.0, acceleration: 0.0, length: 5.0 };

        let stationary_holdback = calculate_holdback_time(&bp, &stationary, 6.0, 2.0);
        let departing_holdback = calculate_holdback_time(&bp, &departing, 6.0, 2.0);
        assert!(departing_holdback.unwrap_or(i64::MAX) <= stationary_holdback.unwrap_or(i64::MAX));
    }
}
