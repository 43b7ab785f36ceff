//! Parquet output backend (feature `parquet`).
//!
//! Creates two files in the configured output directory:
//! - `agent_snapshots.parquet`
//! - `tick_summaries.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{BooleanBuilder, Float64Builder, Int64Builder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, TickSummaryRow};

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick_ms", DataType::Int64, false),
        Field::new("agent_id", DataType::UInt32, false),
        Field::new("x_pos", DataType::Float64, false),
        Field::new("y_pos", DataType::Float64, false),
        Field::new("yaw", DataType::Float64, false),
        Field::new("velocity_x", DataType::Float64, false),
        Field::new("velocity_y", DataType::Float64, false),
        Field::new("acceleration", DataType::Float64, false),
    ]))
}

fn summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick_ms", DataType::Int64, false),
        Field::new("unix_time_secs", DataType::Int64, false),
        Field::new("agent_count", DataType::UInt64, false),
        Field::new("collision", DataType::Boolean, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder().set_compression(Compression::SNAPPY).build()
}

/// Writes simulation output to two Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    snapshots: Option<ArrowWriter<File>>,
    summaries: Option<ArrowWriter<File>>,
    snap_schema: Arc<Schema>,
    summ_schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create both Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let snap_schema = snapshot_schema();
        let summ_schema = summary_schema();

        let snap_file = File::create(dir.join("agent_snapshots.parquet"))?;
        let snapshots = ArrowWriter::try_new(snap_file, Arc::clone(&snap_schema), Some(snappy_props()))?;

        let summ_file = File::create(dir.join("tick_summaries.parquet"))?;
        let summaries = ArrowWriter::try_new(summ_file, Arc::clone(&summ_schema), Some(snappy_props()))?;

        Ok(Self {
            snapshots: Some(snapshots),
            summaries: Some(summaries),
            snap_schema,
            summ_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.snapshots.as_mut() else {
            return Ok(());
        };

        let mut ticks = Int64Builder::new();
        let mut agent_ids = UInt32Builder::new();
        let mut x_pos = Float64Builder::new();
        let mut y_pos = Float64Builder::new();
        let mut yaw = Float64Builder::new();
        let mut velocity_x = Float64Builder::new();
        let mut velocity_y = Float64Builder::new();
        let mut acceleration = Float64Builder::new();

        for row in rows {
            ticks.append_value(row.tick_ms);
            agent_ids.append_value(row.agent_id);
            x_pos.append_value(row.x_pos);
            y_pos.append_value(row.y_pos);
            yaw.append_value(row.yaw);
            velocity_x.append_value(row.velocity_x);
            velocity_y.append_value(row.velocity_y);
            acceleration.append_value(row.acceleration);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.snap_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(agent_ids.finish()),
                Arc::new(x_pos.finish()),
                Arc::new(y_pos.finish()),
                Arc::new(yaw.finish()),
                Arc::new(velocity_x.finish()),
                Arc::new(velocity_y.finish()),
                Arc::new(acceleration.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let Some(writer) = self.summaries.as_mut() else {
            return Ok(());
        };

        let mut ticks = Int64Builder::new();
        let mut unix_times = Int64Builder::new();
        let mut agent_counts = UInt64Builder::new();
        let mut collisions = BooleanBuilder::new();

        ticks.append_value(row.tick_ms);
        unix_times.append_value(row.unix_time_secs);
        agent_counts.append_value(row.agent_count);
        collisions.append_value(row.collision);

        let batch = RecordBatch::try_new(
            Arc::clone(&self.summ_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(unix_times.finish()),
                Arc::new(agent_counts.finish()),
                Arc::new(collisions.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.snapshots.take() {
            w.close()?;
        }
        if let Some(w) = self.summaries.take() {
            w.close()?;
        }
        Ok(())
    }
}
