//! `op-world` — the road network data model and the localization engine
//! that places agents on it.
//!
//! # What lives here
//!
//! | Module           | Contents                                             |
//! |------------------|-------------------------------------------------------|
//! | [`network`]      | `RoadNetwork`, `Road`, `Section`, `Lane` arenas        |
//! | [`geometry`]     | `LaneGeometryElement`, point-in-element tests          |
//! | [`object`]       | `WorldObject`, `VehicleParameters`, `RoadPosition`     |
//! | [`localization`] | `locate`, `PointAggregator`, `StreamKind`               |
//! | [`coverage`]     | Lateral remainder/coverage computation                |
//! | [`error`]        | `WorldError`, `LocalizationError`                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod coverage;
pub mod error;
pub mod geometry;
pub mod localization;
pub mod network;
pub mod object;

pub use error::{LocalizationError, WorldError, WorldResult};
pub use geometry::{bounding_box, LaneGeometryElement};
pub use localization::{
    is_crossing_lanes, locate, searchable_points, LocateResult, LocatedPoint, PointAggregator,
    PointType, SearchablePoint, StreamKind,
};
pub use network::{Lane, Road, RoadNetwork, RoadNetworkBuilder, Section};
pub use object::{RoadPosition, VehicleParameters, WorldObject};
