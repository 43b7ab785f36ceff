//! The end-of-run sink: collision bookkeeping and the manipulator-settable
//! end condition the scheduler loop polls every tick.

use op_core::AgentId;
use op_component::RunResultSink;

#[derive(Clone, Debug, Default)]
pub struct RunResult {
    collision: bool,
    collision_agent_ids: Vec<AgentId>,
    end_condition: bool,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collision(&self) -> bool {
        self.collision
    }

    pub fn collision_agent_ids(&self) -> &[AgentId] {
        &self.collision_agent_ids
    }

    pub fn is_end_condition(&self) -> bool {
        self.end_condition
    }

    /// Set by a manipulator once the scenario's stop criterion is met.
    pub fn set_end_condition(&mut self) {
        self.end_condition = true;
    }
}

impl RunResultSink for RunResult {
    fn add_collision_id(&mut self, agent_id: AgentId) {
        self.collision = true;
        if !self.collision_agent_ids.contains(&agent_id) {
            self.collision_agent_ids.push(agent_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collisions_record_unique_ids() {
        let mut result = RunResult::new();
        result.add_collision_id(AgentId(0));
        result.add_collision_id(AgentId(0));
        result.add_collision_id(AgentId(1));
        assert!(result.collision());
        assert_eq!(result.collision_agent_ids(), &[AgentId(0), AgentId(1)]);
    }
}
