//! Integration tests for op-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{AgentSnapshotRow, TickSummaryRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn snap_row(agent_id: u32, tick_ms: i64) -> AgentSnapshotRow {
        AgentSnapshotRow {
            tick_ms,
            agent_id,
            x_pos: agent_id as f64 * 10.0,
            y_pos: 0.0,
            yaw: 0.0,
            velocity_x: 20.0,
            velocity_y: 0.0,
            acceleration: 0.0,
        }
    }

    fn summary_row(tick_ms: i64) -> TickSummaryRow {
        TickSummaryRow {
            tick_ms,
            unix_time_secs: tick_ms / 1000,
            agent_count: 3,
            collision: false,
        }
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("agent_snapshots.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = ::csv::ReaderBuilder::new().delimiter(b';').from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["Time", "AgentId", "XPos", "YPos", "Yaw", "VelocityX", "VelocityY", "Acceleration"]);

        let mut rdr2 = ::csv::ReaderBuilder::new().delimiter(b';').from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2, ["Time", "UnixTimeSecs", "AgentCount", "Collision"]);
    }

    #[test]
    fn csv_snapshot_round_trip() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows = vec![snap_row(0, 500), snap_row(1, 500), snap_row(2, 500)];
        w.write_snapshots(&rows).unwrap();
        w.finish().unwrap();

        let mut rdr = ::csv::ReaderBuilder::new().delimiter(b';').from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let read_rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(read_rows.len(), 3);
        assert_eq!(&read_rows[0][0], "500"); // Time
        assert_eq!(&read_rows[0][1], "0"); // AgentId
        assert_eq!(&read_rows[1][1], "1");
        assert_eq!(&read_rows[2][1], "2");
    }

    #[test]
    fn csv_tick_summary_round_trip() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&summary_row(3_000)).unwrap();
        w.finish().unwrap();

        let mut rdr = ::csv::ReaderBuilder::new().delimiter(b';').from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let read_rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(read_rows.len(), 1);
        assert_eq!(&read_rows[0][0], "3000"); // Time
        assert_eq!(&read_rows[0][1], "3"); // 3000ms / 1000
        assert_eq!(&read_rows[0][2], "3"); // AgentCount
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_snapshot_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[]).unwrap();
    }

    #[test]
    fn integration_observer_writes_both_files() {
        use op_core::{AgentId, Tick, Vector2d};
        use op_sim::{AgentSnapshot, SimObserver, TickSnapshot};

        use crate::observer::SimOutputObserver;

        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer, 0);

        for tick_ms in [0_i64, 100, 200] {
            let snapshot = TickSnapshot {
                agents: vec![
                    AgentSnapshot {
                        agent_id: AgentId(0),
                        position: Vector2d::new(tick_ms as f64 * 0.03, 0.0),
                        yaw: 0.0,
                        velocity: Vector2d::new(30.0, 0.0),
                        acceleration: 0.0,
                    },
                    AgentSnapshot {
                        agent_id: AgentId(1),
                        position: Vector2d::new(tick_ms as f64 * 0.02, 3.5),
                        yaw: 0.0,
                        velocity: Vector2d::new(20.0, 0.0),
                        acceleration: 0.0,
                    },
                ],
                collision: false,
            };
            obs.on_tick(Tick(tick_ms), &snapshot);
        }
        obs.on_sim_end(Tick(200));
        assert!(obs.take_error().is_none(), "no write errors expected");

        let mut rdr = ::csv::ReaderBuilder::new().delimiter(b';').from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 6, "3 ticks x 2 agents = 6 snapshot rows");

        let mut rdr2 = ::csv::ReaderBuilder::new().delimiter(b';').from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let summary_rows: Vec<_> = rdr2.records().map(|r| r.unwrap()).collect();
        assert_eq!(summary_rows.len(), 3);
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use crate::row::{AgentSnapshotRow, TickSummaryRow};
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_snapshot_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        let rows = vec![
            AgentSnapshotRow { tick_ms: 100, agent_id: 0, x_pos: 0.0, y_pos: 0.0, yaw: 0.0, velocity_x: 10.0, velocity_y: 0.0, acceleration: 0.0 },
            AgentSnapshotRow { tick_ms: 100, agent_id: 1, x_pos: 5.0, y_pos: 0.0, yaw: 0.0, velocity_x: 12.0, velocity_y: 0.0, acceleration: 0.0 },
            AgentSnapshotRow { tick_ms: 100, agent_id: 2, x_pos: 10.0, y_pos: 0.0, yaw: 0.0, velocity_x: 8.0, velocity_y: 0.0, acceleration: 0.0 },
        ];
        w.write_snapshots(&rows).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM agent_snapshots", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn sqlite_collision_stored_as_integer() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick_ms: 0,
            unix_time_secs: 0,
            agent_count: 1,
            collision: true,
        })
        .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let val: i64 = conn.query_row("SELECT collision FROM tick_summaries WHERE tick_ms = 0", [], |r| r.get(0)).unwrap();
        assert_eq!(val, 1, "collision=true should be stored as 1");
    }

    #[test]
    fn sqlite_tick_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick_ms: 700,
            unix_time_secs: 25_200,
            agent_count: 42,
            collision: false,
        })
        .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (tick_ms, unix_time, count): (i64, i64, i64) = conn
            .query_row("SELECT tick_ms, unix_time_secs, agent_count FROM tick_summaries WHERE tick_ms = 700", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!(tick_ms, 700);
        assert_eq!(unix_time, 25_200);
        assert_eq!(count, 42);
    }
}

// ── Parquet tests ─────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use tempfile::TempDir;

    use arrow::datatypes::DataType;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use crate::parquet::ParquetWriter;
    use crate::row::AgentSnapshotRow;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn parquet_files_created() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(dir.path().join("agent_snapshots.parquet").exists());
        assert!(dir.path().join("tick_summaries.parquet").exists());
    }

    #[test]
    fn parquet_snapshot_round_trip() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        let rows = vec![
            AgentSnapshotRow { tick_ms: 200, agent_id: 0, x_pos: 0.0, y_pos: 0.0, yaw: 0.0, velocity_x: 10.0, velocity_y: 0.0, acceleration: 0.0 },
            AgentSnapshotRow { tick_ms: 200, agent_id: 1, x_pos: 5.0, y_pos: 0.0, yaw: 0.0, velocity_x: 12.0, velocity_y: 0.0, acceleration: 0.0 },
        ];
        w.write_snapshots(&rows).unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("agent_snapshots.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        let reader = builder.build().unwrap();

        let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
        let total_rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total_rows, 2, "expected 2 rows");

        let field_names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(field_names, ["tick_ms", "agent_id", "x_pos", "y_pos", "yaw", "velocity_x", "velocity_y", "acceleration"]);
    }

    #[test]
    fn parquet_boolean_column_type() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&crate::row::TickSummaryRow {
            tick_ms: 0,
            unix_time_secs: 0,
            agent_count: 1,
            collision: true,
        })
        .unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("tick_summaries.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();

        let collision_field = schema.field_with_name("collision").unwrap();
        assert_eq!(*collision_field.data_type(), DataType::Boolean);
    }

    #[test]
    fn parquet_finish_required() {
        let dir = tmp();
        {
            let mut w = ParquetWriter::new(dir.path()).unwrap();
            w.write_snapshots(&[AgentSnapshotRow {
                tick_ms: 0,
                agent_id: 0,
                x_pos: 0.0,
                y_pos: 0.0,
                yaw: 0.0,
                velocity_x: 0.0,
                velocity_y: 0.0,
                acceleration: 0.0,
            }])
            .unwrap();
            // dropped without calling finish(): ArrowWriter's Drop does not write the footer.
        }

        let file = std::fs::File::open(dir.path().join("agent_snapshots.parquet")).unwrap();
        let result = ParquetRecordBatchReaderBuilder::try_new(file);
        assert!(result.is_err(), "file without Parquet footer should fail to open");
    }
}
