//! The central simulation object: owns the road network, the agent
//! population, and the scheduler, and wires them together through the three
//! trait seams `op-schedule` leaves open (`TaskExecutor`, `SpawnHandler`,
//! `EndCondition`) plus the `LeadAgentQuery` `op-schedule`'s spawn gate needs.
//!
//! Dispatch itself is priority-based: a `TaskItem` carries an agent id and a
//! priority but no component id (see `op-schedule`'s `task.rs`), so resolving
//! a Trigger/Update task to a concrete component goes through
//! `AgentRecord::component_with_priority`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use op_component::{Channel, Component, ComponentMap, ComponentMeta, EventNetwork};
use op_core::{AgentId, ComponentId, Tick};
use op_dynamics::{DynamicsComponent, VehicleGeometry};
use op_schedule::{
    AgentBlueprint, EndCondition, LeadAgentQuery, ParsedAgentTasks, Scheduler, SchedulerReturnState, SpawnControl,
    SpawnHandler, TaskExecutor, TaskItem, TaskType,
};
use op_world::{RoadNetwork, VehicleParameters, WorldObject};

use crate::agent::AgentRecord;
use crate::config::SimConfig;
use crate::localization::sync_agent_localization;
use crate::observer::{AgentSnapshot, NoopObserver, SimObserver, TickSnapshot};
use crate::respawn::LoggingRespawner;
use crate::result::RunResult;
use crate::world_query::WorldQuery;

/// Fixed vehicle shape every spawned agent is instantiated with. A real
/// deployment would derive this per-agent from a vehicle catalog; vehicle
/// catalog / scenario loading is out of scope here (§1), so one template
/// stands in for all of them.
#[derive(Clone, Debug)]
pub struct VehicleTemplate {
    pub world: VehicleParameters,
    pub dynamics: VehicleGeometry,
}

/// Priority the sole dynamics component is constructed with. Agents built by
/// this crate have exactly one component, so any fixed value works; a richer
/// component graph would need distinct priorities per component, which is
/// what `AgentRecord::component_with_priority` relies on.
const DYNAMICS_PRIORITY: i32 = 0;

/// Newtype so `RunResultSink` (an `op-component` trait) can be implemented
/// for a shared handle without running into the orphan rule — `Rc<RefCell<T>>`
/// itself is foreign, so the impl has to land on a local wrapper.
struct SharedRunResult(Rc<RefCell<RunResult>>);

impl op_component::RunResultSink for SharedRunResult {
    fn add_collision_id(&mut self, agent_id: AgentId) {
        self.0.borrow_mut().add_collision_id(agent_id);
    }
}

struct EndConditionView(Rc<RefCell<RunResult>>);

impl EndCondition for EndConditionView {
    fn is_finished(&self) -> bool {
        self.0.borrow().is_end_condition()
    }
}

/// Resolves Trigger/Update task items against the live agent population.
struct Executor {
    agents: Rc<RefCell<HashMap<AgentId, AgentRecord>>>,
    network: Rc<RoadNetwork>,
    observer: Rc<RefCell<Box<dyn SimObserver>>>,
    run_result: Rc<RefCell<RunResult>>,
}

impl TaskExecutor for Executor {
    fn execute(&mut self, item: &TaskItem, t: Tick) -> bool {
        match item.task_type {
            TaskType::Trigger => self.dispatch_trigger(item, t),
            TaskType::Update => self.dispatch_update(item, t),
            TaskType::SyncGlobalData => {
                let mut agents = self.agents.borrow_mut();
                for record in agents.values_mut() {
                    sync_agent_localization(&self.network, record);
                }
                true
            }
            TaskType::Observation => {
                let snapshot = self.build_tick_snapshot();
                self.observer.borrow_mut().on_tick(t, &snapshot);
                true
            }
            // Individual driver/ADAS behavior models, event detectors, and
            // manipulators are out of scope (§1); these framework task slots
            // exist so a future implementation has somewhere to hook in.
            TaskType::EventDetector | TaskType::Manipulator | TaskType::UpdateGlobalDrivingView => {
                tracing::trace!(task_type = ?item.task_type, tick = t.0, "no behavior model registered for this task slot");
                true
            }
            // Agent instantiation happens through `SpawnControl` directly,
            // not through a dispatched task item.
            TaskType::Spawning => true,
        }
    }
}

impl Executor {
    fn dispatch_trigger(&mut self, item: &TaskItem, t: Tick) -> bool {
        let Some(agent_id) = item.agent_id else { return true };
        let mut agents = self.agents.borrow_mut();
        let Some(record) = agents.get_mut(&agent_id) else { return true };
        let Some(component_id) = record.component_with_priority(item.priority) else { return true };
        let Some(component) = record.components.get_mut(component_id) else { return true };

        match component.trigger(t) {
            Ok(()) => {
                record.sync_world_from_dynamics(component_id);
                true
            }
            Err(err) => {
                tracing::error!(?err, ?agent_id, "component trigger failed");
                false
            }
        }
    }

    fn dispatch_update(&mut self, item: &TaskItem, t: Tick) -> bool {
        let Some(agent_id) = item.agent_id else { return true };
        let mut agents = self.agents.borrow_mut();
        let Some(record) = agents.get_mut(&agent_id) else { return true };
        let Some(component_id) = record.component_with_priority(item.priority) else { return true };

        let channel_specs: Vec<(u8, Vec<(ComponentId, u8)>)> = record
            .channels
            .iter()
            .filter(|channel| channel.producer == component_id)
            .map(|channel| (channel.producer_port, channel.targets.clone()))
            .collect();

        for (producer_port, targets) in channel_specs {
            let signal = {
                let Some(producer) = record.components.get_mut(component_id) else { return true };
                match producer.update_output(producer_port, t) {
                    Ok(signal) => signal,
                    Err(err) => {
                        tracing::error!(?err, ?agent_id, "component update_output failed");
                        return false;
                    }
                }
            };
            for (target_id, port_id) in targets {
                let Some(target) = record.components.get_mut(target_id) else { continue };
                if let Err(err) = target.update_input(port_id, &signal, t) {
                    tracing::error!(?err, ?agent_id, "component update_input failed");
                    return false;
                }
            }
        }
        true
    }

    fn build_tick_snapshot(&self) -> TickSnapshot {
        let agents = self
            .agents
            .borrow()
            .values()
            .map(|record| AgentSnapshot {
                agent_id: record.world.id,
                position: record.world.position,
                yaw: record.world.yaw,
                velocity: record.world.velocity,
                acceleration: record.world.acceleration.length(),
            })
            .collect();
        TickSnapshot {
            agents,
            collision: self.run_result.borrow().collision(),
        }
    }
}

/// Turns a cleared `AgentBlueprint` into a registered agent: a `WorldObject`
/// placed at the blueprint's lane position, a single-component dynamics
/// graph, and the parsed task items the scheduler needs.
struct Spawner {
    agents: Rc<RefCell<HashMap<AgentId, AgentRecord>>>,
    network: Rc<RoadNetwork>,
    next_agent_id: Rc<RefCell<u32>>,
    vehicle_template: VehicleTemplate,
    cycle_time_ms: i64,
}

impl SpawnHandler for Spawner {
    fn instantiate(&mut self, blueprint: AgentBlueprint, _t: Tick) -> (AgentId, ParsedAgentTasks) {
        let agent_id = {
            let mut next = self.next_agent_id.borrow_mut();
            let id = AgentId(*next);
            *next += 1;
            id
        };

        let (position, yaw) = self.network.world_position(blueprint.lane, blueprint.s).unwrap_or_default();

        let mut world = WorldObject::new(agent_id, self.vehicle_template.world.clone());
        world.position = position;
        world.yaw = yaw;
        world.velocity = op_core::Vector2d::new(blueprint.velocity, 0.0);

        let dynamics_meta = ComponentMeta {
            id: ComponentId(0),
            kind: op_component::ComponentKind::Dynamics,
            priority: DYNAMICS_PRIORITY,
            cycle_time_ms: self.cycle_time_ms,
            offset_ms: 0,
            response_time_ms: 0,
            init: false,
        };
        let mut dynamics = DynamicsComponent::new(dynamics_meta, &self.vehicle_template.dynamics, blueprint.velocity);
        dynamics.set_pose(position, yaw);

        let mut components = ComponentMap::new();
        components.insert(Box::new(dynamics));
        let channels: Vec<Channel> = Vec::new();

        let parsed = op_schedule::parse_agent(agent_id, &components, &channels);
        self.agents.borrow_mut().insert(agent_id, AgentRecord::new(world, components, channels));

        (agent_id, parsed)
    }
}

/// Everything one slave invocation needs: the road network, the event
/// network, the scheduler and its spawn gate, and the live agent
/// population.
pub struct Sim {
    pub config: SimConfig,
    pub events: EventNetwork,
    network: Rc<RoadNetwork>,
    scheduler: Scheduler,
    spawn_control: SpawnControl,
    agents: Rc<RefCell<HashMap<AgentId, AgentRecord>>>,
    next_agent_id: Rc<RefCell<u32>>,
    vehicle_template: VehicleTemplate,
    run_result: Rc<RefCell<RunResult>>,
    observer: Rc<RefCell<Box<dyn SimObserver>>>,
}

impl Sim {
    pub fn new(config: SimConfig, network: RoadNetwork, scheduler: Scheduler, vehicle_template: VehicleTemplate) -> Self {
        let spawn_control = SpawnControl::new(config.max_deceleration, config.assumed_time_to_brake_s);
        let run_result = Rc::new(RefCell::new(RunResult::new()));

        let mut events = EventNetwork::new();
        events.initialize(Box::new(LoggingRespawner), Box::new(SharedRunResult(run_result.clone())));

        Self {
            config,
            events,
            network: Rc::new(network),
            scheduler,
            spawn_control,
            agents: Rc::new(RefCell::new(HashMap::new())),
            next_agent_id: Rc::new(RefCell::new(0)),
            vehicle_template,
            run_result,
            observer: Rc::new(RefCell::new(Box::new(NoopObserver))),
        }
    }

    /// Register a spawn point with the scheduler's spawn gate.
    pub fn register_spawn_point(&mut self, spawn_point: Box<dyn op_schedule::SpawnPoint>, start_ms: i64) {
        self.spawn_control.register(spawn_point, start_ms);
    }

    /// Replace the default no-op observer with `observer` — an output
    /// backend, typically.
    pub fn set_observer(&mut self, observer: Box<dyn SimObserver>) {
        self.observer = Rc::new(RefCell::new(observer));
    }

    pub fn agent_count(&self) -> usize {
        self.agents.borrow().len()
    }

    pub fn run_result(&self) -> std::cell::Ref<'_, RunResult> {
        self.run_result.borrow()
    }

    /// Force the run to stop at the next tick boundary, as a manipulator
    /// implementation would once its scenario's stop criterion is met.
    pub fn set_end_condition(&mut self) {
        self.run_result.borrow_mut().set_end_condition();
    }

    /// Run the full scheduler loop from `config.run`'s start to end tick.
    pub fn run(&mut self) -> SchedulerReturnState {
        let mut executor = Executor {
            agents: self.agents.clone(),
            network: self.network.clone(),
            observer: self.observer.clone(),
            run_result: self.run_result.clone(),
        };
        let mut spawner = Spawner {
            agents: self.agents.clone(),
            network: self.network.clone(),
            next_agent_id: self.next_agent_id.clone(),
            vehicle_template: self.vehicle_template.clone(),
            cycle_time_ms: self.config.run.framework_update_rate_ms,
        };
        let world_query = WorldQuery { agents: self.agents.clone() };
        let end_condition = EndConditionView(self.run_result.clone());

        let outcome = self.scheduler.run(
            self.config.run.start_tick(),
            self.config.run.end_tick(),
            &mut executor,
            &mut self.spawn_control,
            &world_query,
            &mut spawner,
            &end_condition,
            &mut self.events,
        );

        self.observer.borrow_mut().on_sim_end(self.config.run.end_tick());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use op_schedule::SchedulerTasks;
    use op_world::RoadNetworkBuilder;

    fn template() -> VehicleTemplate {
        VehicleTemplate {
            world: VehicleParameters {
                length: 5.0,
                width: 2.0,
                weight: 1500.0,
                wheelbase: 2.7,
                distance_cog_to_front_axle: 1.3,
                track_width: 1.6,
                friction_coeff: 1.0,
            },
            dynamics: VehicleGeometry {
                mass: 1500.0,
                power_engine: 100_000.0,
                torque_brake_limit: 6000.0,
                wheelbase: 2.7,
                distance_cog_to_front_axle: 1.3,
                track_width: 1.6,
                moment_inertia_yaw: 2500.0,
                tire_force_peak_max: 5000.0,
                tire_force_slide: 4000.0,
                tire_slip_peak_max: 0.1,
                tire_radius: 0.3,
                tire_friction_scale: 1.0,
                gravity: 9.81,
            },
        }
    }

    fn sim(end_time_ms: i64) -> Sim {
        let mut run = op_core::RunConfig::new(0, end_time_ms, 1);
        run.framework_update_rate_ms = 100;
        let config = SimConfig::new(run);
        let network = RoadNetworkBuilder::new().build();
        let scheduler = Scheduler::new(SchedulerTasks::new(op_schedule::Tasks::new(), 0, 100));
        Sim::new(config, network, scheduler, template())
    }

    #[test]
    fn a_spawned_agent_advances_its_dynamics_component_each_tick() {
        use op_core::{LaneId, RoadId};

        let mut sim = sim(300);
        sim.register_spawn_point(
            Box::new(crate::respawn::FixedIntervalSpawnPoint::new(RoadId(0), LaneId(0), 0.0, 10.0, 5.0, false, 10_000, Some(1))),
            0,
        );

        let outcome = sim.run();
        assert_eq!(outcome, SchedulerReturnState::NoError);
        assert_eq!(sim.agent_count(), 1);
    }

    #[test]
    fn triggered_dynamics_moves_the_agent_in_world_coordinates() {
        use op_core::{LaneId, RoadId};

        let mut sim = sim(500);
        sim.register_spawn_point(
            Box::new(crate::respawn::FixedIntervalSpawnPoint::new(RoadId(0), LaneId(0), 0.0, 10.0, 5.0, false, 10_000, Some(1))),
            0,
        );

        sim.run();
        assert_eq!(sim.agent_count(), 1);

        let agents = sim.agents.borrow();
        let record = agents.values().next().unwrap();
        assert!(record.world.position.x > 0.0);
    }

    #[test]
    fn end_condition_stops_the_run_early() {
        let mut sim = sim(10_000);
        sim.set_end_condition();
        let outcome = sim.run();
        assert_eq!(outcome, SchedulerReturnState::NoError);
    }
}
