//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `agent_snapshots` and `tick_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn: Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_snapshots (
                 tick_ms      INTEGER NOT NULL,
                 agent_id     INTEGER NOT NULL,
                 x_pos        REAL NOT NULL,
                 y_pos        REAL NOT NULL,
                 yaw          REAL NOT NULL,
                 velocity_x   REAL NOT NULL,
                 velocity_y   REAL NOT NULL,
                 acceleration REAL NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick_ms        INTEGER PRIMARY KEY,
                 unix_time_secs INTEGER NOT NULL,
                 agent_count    INTEGER NOT NULL,
                 collision      INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_snapshots \
                 (tick_ms, agent_id, x_pos, y_pos, yaw, velocity_x, velocity_y, acceleration) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick_ms,
                    row.agent_id,
                    row.x_pos,
                    row.y_pos,
                    row.yaw,
                    row.velocity_x,
                    row.velocity_y,
                    row.acceleration,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries (tick_ms, unix_time_secs, agent_count, collision) \
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![row.tick_ms, row.unix_time_secs, row.agent_count, row.collision as i64],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_accepts_a_round_trip_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = SqliteWriter::new(dir.path()).unwrap();
        writer
            .write_snapshots(&[AgentSnapshotRow {
                tick_ms: 0,
                agent_id: 0,
                x_pos: 0.0,
                y_pos: 0.0,
                yaw: 0.0,
                velocity_x: 10.0,
                velocity_y: 0.0,
                acceleration: 0.0,
            }])
            .unwrap();
        writer
            .write_tick_summary(&TickSummaryRow {
                tick_ms: 0,
                unix_time_secs: 1_700_000_000,
                agent_count: 1,
                collision: false,
            })
            .unwrap();
        writer.finish().unwrap();
        writer.finish().unwrap();
    }
}
