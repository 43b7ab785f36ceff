//! The backend-agnostic seam every output format implements.

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::OutputResult;

/// A destination for simulation trace output.
///
/// Snapshots are written in batches (one batch per tick, covering every live
/// agent) so a columnar backend can build one record batch per call instead
/// of one row at a time. `finish` is idempotent: calling it more than once,
/// or on a writer that never received a row, must not error.
pub trait OutputWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;
    fn finish(&mut self) -> OutputResult<()>;
}
