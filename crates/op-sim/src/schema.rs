//! Plain `serde`-deserializable data models for the external configuration
//! artifacts a slave invocation consumes (§6).
//!
//! The machinery that actually produces these — XML parsing, dynamic-library
//! resolution, the master process wrapper — is out of scope (§1); this
//! module only defines the shapes this crate receives from that external
//! importer, mirroring the teacher's `ScheduleRecord`/CSV-row pattern in
//! `dt-schedule::loader` (a plain `#[derive(Deserialize)]` struct per
//! external record, no parsing logic of its own beyond `serde`'s).

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

/// Framework configuration read once by the master process wrapper (itself
/// out of scope) and handed down to each slave invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct MasterConfig {
    #[serde(default)]
    pub log_level: u8,
    #[serde(default = "default_master_log_file")]
    pub log_file: String,
    #[serde(default = "default_slave_command")]
    pub slave_command: String,
    #[serde(default = "default_libraries_path")]
    pub libraries_path: String,
    pub slave_configs: Vec<SlaveConfigEntry>,
}

fn default_master_log_file() -> String {
    "OpenPassMaster.log".to_string()
}

fn default_slave_command() -> String {
    "OpenPassSlave".to_string()
}

fn default_libraries_path() -> String {
    "lib".to_string()
}

/// One entry in `MasterConfig::slave_configs`.
#[derive(Debug, Clone, Deserialize)]
pub struct SlaveConfigEntry {
    pub log_file: String,
    pub configurations: String,
    pub results: String,
}

/// Component graph template and channel topology read at slave startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfigBlueprint {
    pub components: Vec<ComponentBlueprint>,
    pub channels: Vec<ChannelBlueprint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentBlueprint {
    pub id: u32,
    pub kind: String,
    pub priority: i32,
    pub cycle_time_ms: i64,
    pub offset_ms: i64,
    pub response_time_ms: i64,
    #[serde(default)]
    pub parameters: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelBlueprint {
    pub producer: u32,
    pub producer_port: u8,
    pub targets: Vec<(u32, u8)>,
}

/// SlaveConfig: experiment library names, the scenario to run, and where the
/// profiles catalog lives.
#[derive(Debug, Clone, Deserialize)]
pub struct SlaveConfig {
    pub experiment_libraries: ExperimentLibraries,
    pub scenario_path: String,
    pub profiles_catalog_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentLibraries {
    pub event_detector: String,
    pub manipulator: String,
    pub observation: String,
    pub spawn_point: String,
    pub stochastics: String,
    pub world: String,
}

/// Maps agent profiles to system configs and parameter overlays.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilesCatalog {
    pub profiles: HashMap<String, AgentProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentProfile {
    pub system_config: String,
    #[serde(default)]
    pub parameter_overlay: HashMap<String, f64>,
}

/// References vehicle/pedestrian catalogs and scenery; defines the ego and
/// scenario agents and their initial placements.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub vehicle_catalog: String,
    pub pedestrian_catalog: String,
    pub scenery: String,
    pub ego_agent: ScenarioAgent,
    #[serde(default)]
    pub scenario_agents: Vec<ScenarioAgent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioAgent {
    pub name: String,
    pub profile: String,
    pub road: u32,
    pub lane: i32,
    pub s: f64,
    pub velocity: f64,
}

/// Either road coordinates (`S`, `T`, `Hdg`, absolute or relative) or world
/// coordinates (`X`, `Y`, `Yaw`) — never mixed within one trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TrajectoryCoordinate {
    Road { s: f64, t: f64, hdg: f64 },
    World { x: f64, y: f64, yaw: f64 },
}

/// One entry in a trajectory file: a timestamp and its coordinate.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrajectoryPoint {
    #[serde(rename = "Time")]
    pub time_ms: i64,
    #[serde(flatten)]
    pub coordinate: TrajectoryCoordinate,
}

/// A validated, time-ordered trajectory.
///
/// Construction enforces the bit-exact-compatibility invariants from §6:
/// every `time_ms` is unique, and every point uses the same coordinate
/// system. The XML reader that produces the raw points is out of scope;
/// this type only enforces the invariants the reader is required to reject
/// violations of.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn new(mut points: Vec<TrajectoryPoint>) -> Result<Self, TrajectoryError> {
        points.sort_by_key(|p| p.time_ms);

        for window in points.windows(2) {
            if window[0].time_ms == window[1].time_ms {
                return Err(TrajectoryError::DuplicateTime(window[0].time_ms));
            }
        }

        if let Some(first) = points.first() {
            let is_road = matches!(first.coordinate, TrajectoryCoordinate::Road { .. });
            let mixed = points.iter().any(|p| matches!(p.coordinate, TrajectoryCoordinate::Road { .. }) != is_road);
            if mixed {
                return Err(TrajectoryError::MixedCoordinateSystems);
            }
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }
}

#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("duplicate time {0}ms in trajectory")]
    DuplicateTime(i64),
    #[error("trajectory mixes road and world coordinate systems")]
    MixedCoordinateSystems,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_point(time_ms: i64, x: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            time_ms,
            coordinate: TrajectoryCoordinate::World { x, y: 0.0, yaw: 0.0 },
        }
    }

    #[test]
    fn duplicate_times_are_rejected() {
        let points = vec![world_point(0, 0.0), world_point(0, 1.0)];
        assert!(matches!(Trajectory::new(points), Err(TrajectoryError::DuplicateTime(0))));
    }

    #[test]
    fn mixed_coordinate_systems_are_rejected() {
        let points = vec![
            world_point(0, 0.0),
            TrajectoryPoint {
                time_ms: 100,
                coordinate: TrajectoryCoordinate::Road { s: 10.0, t: 0.0, hdg: 0.0 },
            },
        ];
        assert!(matches!(Trajectory::new(points), Err(TrajectoryError::MixedCoordinateSystems)));
    }

    #[test]
    fn valid_trajectory_sorts_by_time() {
        let points = vec![world_point(200, 2.0), world_point(0, 0.0), world_point(100, 1.0)];
        let trajectory = Trajectory::new(points).unwrap();
        let times: Vec<i64> = trajectory.points().iter().map(|p| p.time_ms).collect();
        assert_eq!(times, vec![0, 100, 200]);
    }
}
