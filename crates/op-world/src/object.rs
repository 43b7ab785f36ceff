//! World-side agent state: kinematics, geometry, and lane assignments.

use std::collections::BTreeSet;

use op_core::{AgentId, LaneId, RoadId, Vector2d};

/// Static geometric and mass parameters of an agent's vehicle, set exactly
/// once at construction.
#[derive(Clone, Debug)]
pub struct VehicleParameters {
    pub length: f64,
    pub width: f64,
    pub weight: f64,
    pub wheelbase: f64,
    pub distance_cog_to_front_axle: f64,
    pub track_width: f64,
    pub friction_coeff: f64,
}

/// The reference-point-relative road coordinate of an agent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RoadPosition {
    pub road: RoadId,
    pub lane: LaneId,
    pub s: f64,
    pub t: f64,
    pub heading: f64,
}

/// The world-facing half of an agent: position, motion state, geometry, and
/// the lanes it currently occupies.
///
/// Invariant (i): `reference_position` is always either within a known lane
/// polygon (`valid == true`) or the agent is flagged invalid.
/// Invariant (ii): `assigned_lanes` is mutually consistent with the bounding
/// box — maintained solely by the localization engine, which is the only
/// writer of both fields.
#[derive(Clone, Debug)]
pub struct WorldObject {
    pub id: AgentId,
    pub position: Vector2d,
    pub velocity: Vector2d,
    pub acceleration: Vector2d,
    pub yaw: f64,
    pub yaw_rate: f64,
    pub yaw_acceleration: f64,
    pub vehicle: VehicleParameters,
    pub reference_position: Option<RoadPosition>,
    pub main_lane: Option<(RoadId, LaneId)>,
    pub assigned_lanes: BTreeSet<LaneId>,
    pub valid: bool,
}

impl WorldObject {
    pub fn new(id: AgentId, vehicle: VehicleParameters) -> Self {
        Self {
            id,
            position: Vector2d::ZERO,
            velocity: Vector2d::ZERO,
            acceleration: Vector2d::ZERO,
            yaw: 0.0,
            yaw_rate: 0.0,
            yaw_acceleration: 0.0,
            vehicle,
            reference_position: None,
            main_lane: None,
            assigned_lanes: BTreeSet::new(),
            valid: true,
        }
    }

    /// The agent's four bounding-box corners (front-left, front-right,
    /// rear-left, rear-right) in world coordinates. The reference point is
    /// the rear-axle center, so the box extends forward from it.
    pub fn bounding_box_corners(&self) -> [Vector2d; 4] {
        let half_width = self.vehicle.width / 2.0;
        let length = self.vehicle.length;
        let local = [
            Vector2d::new(0.0, half_width),   // front-left
            Vector2d::new(0.0, -half_width),  // front-right
            Vector2d::new(-length, half_width),  // rear-left
            Vector2d::new(-length, -half_width), // rear-right
        ];
        local.map(|p| p.rotated(-self.yaw) + self.position)
    }

    /// Clear lane assignments, e.g. when the agent leaves the world or fails
    /// localization on a subsequent tick.
    pub fn clear_lane_assignments(&mut self) {
        self.assigned_lanes.clear();
        self.main_lane = None;
        self.reference_position = None;
    }

    pub fn mark_invalid(&mut self) {
        self.valid = false;
        self.clear_lane_assignments();
    }
}
