//! `op-dynamics` — the two-track vehicle model: a static tire model, rigid
//! body force/moment accumulation, semi-implicit Euler integration with a
//! zero-crossing velocity clamp, and the longitudinal gear/pedal algorithm
//! that turns a desired acceleration into pedal positions.
//!
//! # What lives here
//!
//! | Module         | Contents                                          |
//! |----------------|----------------------------------------------------|
//! | [`tire`]       | `Tire`, the piecewise adhesion/slide force model    |
//! | [`vehicle`]    | `VehicleSimpleTT`, drivetrain + per-tire force accumulation |
//! | [`component`]  | `DynamicsComponent`, the `Component` trait wrapper  |
//! | [`longitudinal`] | Gear search and pedal position calculation        |
//! | [`error`]      | `DynamicsError`, `DynamicsResult`                   |

pub mod component;
pub mod error;
pub mod longitudinal;
pub mod tire;
pub mod vehicle;

pub use component::{DynamicsComponent, VehicleGeometry, PORT_BRAKE, PORT_INERTIA_FORCE, PORT_KINEMATIC_STATE, PORT_STEERING_ANGLE, PORT_THROTTLE};
pub use error::{DynamicsError, DynamicsResult};
pub use longitudinal::{calculate_gear_and_engine_speed, calculate_pedal_positions, GearSolution, PedalPositions, VehicleModelParameters};
pub use tire::{Tire, TIRE_INERTIA};
pub use vehicle::VehicleSimpleTT;
