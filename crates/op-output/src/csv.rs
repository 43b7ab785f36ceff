//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`
//!
//! Both use `;` as the field delimiter (§6) rather than `csv`'s comma default.

use std::fs::File;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, TickSummaryRow};

fn semicolon_writer(path: std::path::PathBuf) -> OutputResult<Writer<File>> {
    Ok(WriterBuilder::new().delimiter(b';').from_path(path)?)
}

/// Writes simulation output to two `;`-delimited CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = semicolon_writer(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record(["Time", "AgentId", "XPos", "YPos", "Yaw", "VelocityX", "VelocityY", "Acceleration"])?;

        let mut summaries = semicolon_writer(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["Time", "UnixTimeSecs", "AgentCount", "Collision"])?;

        Ok(Self {
            snapshots,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick_ms.to_string(),
                row.agent_id.to_string(),
                row.x_pos.to_string(),
                row.y_pos.to_string(),
                row.yaw.to_string(),
                row.velocity_x.to_string(),
                row.velocity_y.to_string(),
                row.acceleration.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick_ms.to_string(),
            row.unix_time_secs.to_string(),
            row.agent_count.to_string(),
            (row.collision as u8).to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_uses_semicolon_delimiter_and_matches_row_width() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CsvWriter::new(dir.path()).unwrap();
        writer
            .write_snapshots(&[AgentSnapshotRow {
                tick_ms: 100,
                agent_id: 0,
                x_pos: 1.0,
                y_pos: 2.0,
                yaw: 0.0,
                velocity_x: 10.0,
                velocity_y: 0.0,
                acceleration: 0.0,
            }])
            .unwrap();
        writer.finish().unwrap();

        let contents = std::fs::read_to_string(dir.path().join("agent_snapshots.csv")).unwrap();
        let mut lines = contents.lines();
        let header = lines.next().unwrap();
        let row = lines.next().unwrap();
        assert_eq!(header.matches(';').count(), row.matches(';').count());
        assert!(header.starts_with("Time;AgentId;XPos;YPos"));
    }
}
