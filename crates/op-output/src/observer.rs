//! `SimOutputObserver<W>` — bridges `op_sim::SimObserver` to an `OutputWriter`.

use op_sim::{SimObserver, TickSnapshot};

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes agent snapshots and tick summaries to any
/// [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value. After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    start_unix_secs: i64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`. `start_unix_secs` is the
    /// wall-clock time the run's `t = 0` corresponds to, used only to stamp
    /// tick summaries.
    pub fn new(writer: W, start_unix_secs: i64) -> Self {
        Self {
            writer,
            start_unix_secs,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn unix_time(&self, t: op_core::Tick) -> i64 {
        self.start_unix_secs + t.0 / 1000
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick(&mut self, t: op_core::Tick, snapshot: &TickSnapshot) {
        let summary = TickSummaryRow {
            tick_ms: t.0,
            unix_time_secs: self.unix_time(t),
            agent_count: snapshot.agents.len() as u64,
            collision: snapshot.collision,
        };
        let result = self.writer.write_tick_summary(&summary);
        self.store_err(result);

        if snapshot.agents.is_empty() {
            return;
        }
        let rows: Vec<AgentSnapshotRow> = snapshot
            .agents
            .iter()
            .map(|agent| AgentSnapshotRow {
                tick_ms: t.0,
                agent_id: agent.agent_id.0,
                x_pos: agent.position.x,
                y_pos: agent.position.y,
                yaw: agent.yaw,
                velocity_x: agent.velocity.x,
                velocity_y: agent.velocity.y,
                acceleration: agent.acceleration,
            })
            .collect();
        let result = self.writer.write_snapshots(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _t: op_core::Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
