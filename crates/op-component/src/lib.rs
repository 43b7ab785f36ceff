//! `op-component` — the per-agent component graph: typed signals, the
//! channels that route them, the `Component` trait implementors plug into,
//! and the cross-module event network.
//!
//! # What lives here
//!
//! | Module       | Contents                                             |
//! |--------------|---------------------------------------------------------|
//! | [`signal`]   | `Signal`, its payload types                             |
//! | [`channel`]  | `Channel`, a single producer-port fan-out                |
//! | [`component`]| `Component` trait, `ComponentMeta`, `ComponentMap`       |
//! | [`event`]    | `EventNetwork`, `EventCategory`, `Respawner`              |
//! | [`error`]    | `ComponentError`, `ComponentResult`                      |

pub mod channel;
pub mod component;
pub mod error;
pub mod event;
pub mod signal;

pub use channel::Channel;
pub use component::{Component, ComponentKind, ComponentMap, ComponentMeta};
pub use error::{ComponentError, ComponentResult};
pub use event::{Event, EventCategory, EventKind, EventNetwork, Respawner, RunResultSink};
pub use signal::{CarInfo, DriverSensorBundle, KinematicState, Signal, TrajectoryPoint};
