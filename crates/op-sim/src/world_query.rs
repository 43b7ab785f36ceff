//! Answers `SpawnControl`'s "what's ahead of this spawn point" query by
//! scanning currently registered agents for the nearest one ahead, on the
//! same road and lane.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use op_core::{AgentId, LaneId, RoadId};
use op_schedule::{LeadAgentQuery, LeadAgentState};

use crate::agent::AgentRecord;

pub struct WorldQuery {
    pub agents: Rc<RefCell<HashMap<AgentId, AgentRecord>>>,
}

impl LeadAgentQuery for WorldQuery {
    fn find_lead_agent(&self, road: RoadId, lane: LaneId, s: f64) -> Option<LeadAgentState> {
        self.agents
            .borrow()
            .values()
            .filter_map(|record| {
                let position = record.world.reference_position?;
                if position.road != road || position.lane != lane || position.s <= s {
                    return None;
                }
                Some((
                    position.s,
                    LeadAgentState {
                        s: position.s,
                        velocity: record.world.velocity.length(),
                        acceleration: record.world.acceleration.length(),
                        length: record.world.vehicle.length,
                    },
                ))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, state)| state)
    }
}
