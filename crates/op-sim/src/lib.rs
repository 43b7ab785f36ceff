//! `op-sim` — wires the scheduler, world, component bus, and dynamics crates
//! into a runnable simulation: the agent registry, the localization bridge,
//! the lead-agent query `SpawnControl` needs, and the `Sim` object tying it
//! all together through the `TaskExecutor`/`SpawnHandler`/`EndCondition`
//! trait seams `op-schedule` leaves open.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |------------------|---------------------------------------------------------|
//! | [`config`]       | `SimConfig`, the slave-command-line-derived run settings |
//! | [`agent`]        | `AgentRecord`, one agent's world + component state       |
//! | [`localization`] | `sync_agent_localization`, the per-tick relocation bridge |
//! | [`world_query`]  | `WorldQuery`, `LeadAgentQuery` over the live population   |
//! | [`respawn`]      | `LoggingRespawner`, `FixedIntervalSpawnPoint`             |
//! | [`result`]       | `RunResult`, the collision/end-condition sink             |
//! | [`observer`]     | `SimObserver`, the per-tick snapshot hook                 |
//! | [`sim`]          | `Sim`, the top-level object and its trait implementations |
//! | [`schema`]       | `MasterConfig`/`SlaveConfig`/`Scenario`/`Trajectory`, …    |
//! | [`error`]        | `SimError`                                                |

pub mod agent;
pub mod config;
pub mod error;
pub mod localization;
pub mod observer;
pub mod respawn;
pub mod result;
pub mod schema;
pub mod sim;
pub mod world_query;

pub use agent::AgentRecord;
pub use config::{SimConfig, SlaveArgs};
pub use error::{SimError, SimResult};
pub use localization::sync_agent_localization;
pub use observer::{AgentSnapshot, NoopObserver, SimObserver, TickSnapshot};
pub use respawn::{FixedIntervalSpawnPoint, LoggingRespawner};
pub use result::RunResult;
pub use schema::{
    AgentProfile, ChannelBlueprint, ComponentBlueprint, ExperimentLibraries, MasterConfig, ProfilesCatalog, Scenario,
    ScenarioAgent, SlaveConfig, SlaveConfigEntry, SystemConfigBlueprint, Trajectory, TrajectoryCoordinate, TrajectoryError,
    TrajectoryPoint,
};
pub use sim::{Sim, VehicleTemplate};
pub use world_query::WorldQuery;
