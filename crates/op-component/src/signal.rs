//! The typed signal payloads exchanged between components.
//!
//! A tagged enum stands in for the reference model's dynamically downcast
//! signal base class: every producer/consumer pair agrees on a variant at
//! the port boundary, and a mismatch is an explicit `InvalidSignalType`
//! rather than a failed downcast discovered deep in a component.

use std::sync::Arc;

use op_core::Vector2d;
use op_world::VehicleParameters;

/// One point of a planned trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectoryPoint {
    pub time_ms: i64,
    pub position: Vector2d,
    pub velocity: f64,
    pub yaw: f64,
}

/// An agent's full kinematic state after a dynamics step, as published for
/// the world-sync task and any component needing the authoritative pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KinematicState {
    pub position: Vector2d,
    pub yaw: f64,
    pub velocity: Vector2d,
    pub yaw_rate: f64,
    pub acceleration: Vector2d,
    pub yaw_acceleration: f64,
}

/// Sensor-reported state of a single nearby vehicle, as assembled by a
/// sensor component for a driver/algorithm component downstream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarInfo {
    pub relative_position: Vector2d,
    pub relative_velocity: f64,
    pub lane_offset: f64,
}

/// Bundle a driver/algorithm component consumes: ego state plus the
/// sensed surrounding vehicles.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverSensorBundle {
    pub ego_velocity: f64,
    pub ego_acceleration: f64,
    pub lane_width: f64,
    pub surrounding: Vec<CarInfo>,
}

/// An immutable, shared payload produced by one component's
/// [`update_output`](crate::component::Component::update_output) and
/// consumed by zero or more others in the same tick via
/// [`update_input`](crate::component::Component::update_input).
///
/// Cloning a `Signal` is cheap: every variant either is `Copy` or wraps its
/// payload in an `Arc`, so fan-out to multiple consumers never duplicates
/// the underlying data.
#[derive(Clone, Debug)]
pub enum Signal {
    Scalar(f64),
    Vector(Vector2d),
    KinematicState(KinematicState),
    VehicleParameters(Arc<VehicleParameters>),
    DriverSensorBundle(Arc<DriverSensorBundle>),
    Trajectory(Arc<Vec<TrajectoryPoint>>),
    CarInfoList(Arc<Vec<CarInfo>>),
}

impl Signal {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Signal::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_driver_sensor_bundle(&self) -> Option<&DriverSensorBundle> {
        match self {
            Signal::DriverSensorBundle(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_trajectory(&self) -> Option<&[TrajectoryPoint]> {
        match self {
            Signal::Trajectory(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_car_info_list(&self) -> Option<&[CarInfo]> {
        match self {
            Signal::CarInfoList(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vehicle_parameters(&self) -> Option<&VehicleParameters> {
        match self {
            Signal::VehicleParameters(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vector2d> {
        match self {
            Signal::Vector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_kinematic_state(&self) -> Option<KinematicState> {
        match self {
            Signal::KinematicState(v) => Some(*v),
            _ => None,
        }
    }
}
