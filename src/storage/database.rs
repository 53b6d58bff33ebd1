//! SQLite result sink

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{PersistenceError, RecognitionRecord, ResultSink};

/// Append-only SQLite sink for inspection records.
///
/// The connection sits behind a mutex because rusqlite connections are not
/// `Sync`; appends are short, so contention is a non-issue at analysis
/// rates.
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Open or create the database at `path` and ensure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let sink = Self {
            conn: Mutex::new(conn),
        };
        sink.init_schema()?;
        Ok(sink)
    }

    /// In-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let sink = Self {
            conn: Mutex::new(conn),
        };
        sink.init_schema()?;
        Ok(sink)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.lock().execute_batch(
            "CREATE TABLE IF NOT EXISTS inspections (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp     TEXT NOT NULL,
                detected_text TEXT NOT NULL,
                hits          TEXT NOT NULL,
                artifact_path TEXT
            );",
        )?;
        Ok(())
    }

    /// Number of persisted records
    pub fn count(&self) -> Result<u64> {
        let count: u64 =
            self.conn
                .lock()
                .query_row("SELECT COUNT(*) FROM inspections", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Most recently inserted record, if any
    pub fn latest(&self) -> Result<Option<RecognitionRecord>> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT timestamp, detected_text, hits, artifact_path
                 FROM inspections ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((timestamp, full_text, hits, artifact_path)) = row else {
            return Ok(None);
        };

        Ok(Some(RecognitionRecord {
            timestamp: DateTime::parse_from_rfc3339(&timestamp)?.with_timezone(&Utc),
            full_text,
            hits: serde_json::from_str(&hits)?,
            artifact_path: artifact_path.map(PathBuf::from),
        }))
    }
}

impl ResultSink for SqliteSink {
    fn persist(&self, record: &RecognitionRecord) -> Result<(), PersistenceError> {
        let hits = serde_json::to_string(&record.hits)
            .map_err(|e| PersistenceError(e.to_string()))?;
        self.conn
            .lock()
            .execute(
                "INSERT INTO inspections (timestamp, detected_text, hits, artifact_path)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.timestamp.to_rfc3339(),
                    record.full_text,
                    hits,
                    record
                        .artifact_path
                        .as_ref()
                        .map(|p| p.to_string_lossy().into_owned()),
                ],
            )
            .map_err(|e| PersistenceError(e.to_string()))?;
        debug!("persisted inspection record, {} hits", record.hits.len());
        Ok(())
    }
}
