//! Row shapes shared by every output backend.
//!
//! One snapshot row is emitted per live agent per tick; one summary row is
//! emitted per tick. All three backends (CSV, SQLite, Parquet) write the same
//! two row shapes, so a downstream evaluation tool sees the same columns no
//! matter which backend produced them.

/// One agent's pose and motion at one tick.
///
/// Columns follow §6's minimum set (`Time, XPos, YPos, …`); `agent_id`
/// distinguishes rows belonging to different agents within the one shared
/// stream (see DESIGN.md for why this crate keeps one shared stream rather
/// than a file per agent).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshotRow {
    pub tick_ms: i64,
    pub agent_id: u32,
    pub x_pos: f64,
    pub y_pos: f64,
    pub yaw: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub acceleration: f64,
}

/// One row per tick: wall-clock timestamp, live agent count, and whether a
/// collision has been recorded as of this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickSummaryRow {
    pub tick_ms: i64,
    pub unix_time_secs: i64,
    pub agent_count: u64,
    pub collision: bool,
}
