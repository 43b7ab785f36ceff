//! `op-core` — foundational types shared by every simulation-core crate.
//!
//! This crate has no dependency on any sibling crate and minimal external
//! ones (`rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                          |
//! |-------------|----------------------------------------------------|
//! | [`ids`]     | `AgentId`, `RoadId`, `SectionId`, `LaneId`, ...     |
//! | [`geo`]     | `Vector2d`, angle/saturation helpers                |
//! | [`time`]    | `Tick`, `RunConfig`                                 |
//! | [`rng`]     | `AgentRng` (per-agent), `RunRng` (run-level)         |
//! | [`error`]   | `OpCoreError`, `OpCoreResult`                       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{OpCoreError, OpCoreResult};
pub use geo::{normalize_angle, saturate, Vector2d};
pub use ids::{AgentId, ComponentId, EventId, LaneId, RoadId, SectionId};
pub use rng::{AgentRng, RunRng};
pub use time::{RunConfig, Tick};
