//! Bridges `op_world`'s localization engine into an agent's world state:
//! runs the per-tick point search and writes the result back.

use op_world::{locate, searchable_points, PointType, RoadNetwork, RoadPosition, WorldObject};

use crate::agent::AgentRecord;

/// Localization search budget: how far past an agent's footprint the point
/// search is allowed to look before giving up (§4.7).
const MAX_SEARCH_DISTANCE: f64 = 200.0;

/// Re-locate one agent on the network, writing its reference position, main
/// lane, and touched-lane set back onto `record.world`, and updating
/// `record.search_initializer` for next tick's quickstart.
///
/// A failed search — no candidate point inside any quadrilateral, or the
/// full scan itself fails — marks the agent invalid rather than panicking;
/// invalid agents are the scheduler's cue to retire them.
pub fn sync_agent_localization(network: &RoadNetwork, record: &mut AgentRecord) {
    let points = searchable_points(&record.world);
    match locate(network, points, record.search_initializer, MAX_SEARCH_DISTANCE) {
        Ok(result) => {
            record.search_initializer = result.next_initializer;
            apply_locate_result(&mut record.world, &result.aggregator);
        }
        Err(_) => {
            record.world.mark_invalid();
            record.search_initializer = None;
        }
    }
}

fn apply_locate_result(world: &mut WorldObject, aggregator: &op_world::PointAggregator) {
    let Some(reference) = aggregator.reference() else {
        world.mark_invalid();
        return;
    };

    world.valid = true;
    world.reference_position = Some(RoadPosition {
        road: reference.road,
        lane: reference.lane,
        s: reference.s,
        t: reference.t,
        heading: reference.heading,
    });
    world.assigned_lanes = aggregator.touched_lanes().clone();
    world.main_lane = aggregator.get(PointType::MainLaneLocator).map(|p| (p.road, p.lane));
}
