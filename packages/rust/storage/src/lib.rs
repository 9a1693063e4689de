//! libSQL run-history storage layer.
//!
//! The [`Storage`] struct wraps a local libSQL database recording completed
//! and in-flight pipeline runs plus their append-only logs. The pipeline core
//! never touches storage; the CLI and server persist runs after the fact and
//! serve history from here.

mod migrations;

use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, params};

use newsgraph_shared::{LogEntry, LogLevel, NewsGraphError, Result};

/// A persisted pipeline run.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: String,
    pub query: String,
    pub stage: String,
    pub upload_done: bool,
    pub created_at: String,
    pub finished_at: Option<String>,
}

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl Storage {
    /// Open or create a database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| NewsGraphError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    NewsGraphError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Run operations
    // -----------------------------------------------------------------------

    /// Insert a new run record at its starting stage.
    pub async fn insert_run(&self, id: &str, query: &str, stage: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO runs (id, query, stage, upload_done, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4)",
                params![id, query, stage, now.as_str()],
            )
            .await
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Record a run's terminal stage and upload flag.
    pub async fn finish_run(&self, id: &str, stage: &str, upload_done: bool) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "UPDATE runs SET stage = ?2, upload_done = ?3, finished_at = ?4 WHERE id = ?1",
                params![id, stage, upload_done as i64, now.as_str()],
            )
            .await
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Get a run by ID.
    pub async fn get_run(&self, id: &str) -> Result<Option<RunRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, query, stage, upload_done, created_at, finished_at
                 FROM runs WHERE id = ?1",
                params![id],
            )
            .await
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_run(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(NewsGraphError::Storage(e.to_string())),
        }
    }

    /// List runs, most recent first.
    pub async fn list_runs(&self, limit: u32) -> Result<Vec<RunRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, query, stage, upload_done, created_at, finished_at
                 FROM runs ORDER BY created_at DESC LIMIT ?1",
                params![limit as i64],
            )
            .await
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?;

        let mut runs = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?
        {
            runs.push(row_to_run(&row)?);
        }
        Ok(runs)
    }

    // -----------------------------------------------------------------------
    // Log operations
    // -----------------------------------------------------------------------

    /// Append a run's log entries, preserving their order.
    pub async fn append_logs(&self, run_id: &str, entries: &[LogEntry]) -> Result<()> {
        let start = self.log_count(run_id).await?;

        for (offset, entry) in entries.iter().enumerate() {
            let ts = entry.timestamp.to_rfc3339();
            self.conn
                .execute(
                    "INSERT INTO run_logs (run_id, seq, level, message, timestamp)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        run_id,
                        start + offset as i64,
                        entry.level.as_str(),
                        entry.message.as_str(),
                        ts.as_str()
                    ],
                )
                .await
                .map_err(|e| NewsGraphError::Storage(e.to_string()))?;
        }
        Ok(())
    }

    /// Fetch a run's log entries in append order.
    pub async fn run_logs(&self, run_id: &str) -> Result<Vec<LogEntry>> {
        let mut rows = self
            .conn
            .query(
                "SELECT level, message, timestamp FROM run_logs
                 WHERE run_id = ?1 ORDER BY seq ASC",
                params![run_id],
            )
            .await
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?;

        let mut entries = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?
        {
            let level: String = row
                .get(0)
                .map_err(|e| NewsGraphError::Storage(e.to_string()))?;
            let message: String = row
                .get(1)
                .map_err(|e| NewsGraphError::Storage(e.to_string()))?;
            let timestamp: String = row
                .get(2)
                .map_err(|e| NewsGraphError::Storage(e.to_string()))?;

            entries.push(LogEntry {
                level: level.parse().unwrap_or(LogLevel::Info),
                message,
                timestamp: timestamp
                    .parse()
                    .unwrap_or_else(|_| Utc::now()),
            });
        }
        Ok(entries)
    }

    async fn log_count(&self, run_id: &str) -> Result<i64> {
        let mut rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM run_logs WHERE run_id = ?1",
                params![run_id],
            )
            .await
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).unwrap_or(0)),
            _ => Ok(0),
        }
    }
}

fn row_to_run(row: &libsql::Row) -> Result<RunRecord> {
    Ok(RunRecord {
        id: row
            .get(0)
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?,
        query: row
            .get(1)
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?,
        stage: row
            .get(2)
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?,
        upload_done: row.get::<i64>(3).unwrap_or(0) != 0,
        created_at: row
            .get(4)
            .map_err(|e| NewsGraphError::Storage(e.to_string()))?,
        finished_at: match row.get_value(5) {
            Ok(libsql::Value::Text(s)) => Some(s),
            _ => None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn test_storage() -> (Storage, std::path::PathBuf) {
        let tmp_dir = std::env::temp_dir().join(format!("ng-storage-test-{}", Uuid::now_v7()));
        let db_path = tmp_dir.join("test.db");
        let storage = Storage::open(&db_path).await.unwrap();
        (storage, tmp_dir)
    }

    #[tokio::test]
    async fn run_roundtrip() {
        let (storage, tmp_dir) = test_storage().await;

        storage
            .insert_run("run-1", "city budget", "url_generation")
            .await
            .unwrap();

        let run = storage.get_run("run-1").await.unwrap().unwrap();
        assert_eq!(run.query, "city budget");
        assert_eq!(run.stage, "url_generation");
        assert!(!run.upload_done);
        assert!(run.finished_at.is_none());

        storage.finish_run("run-1", "end", true).await.unwrap();
        let run = storage.get_run("run-1").await.unwrap().unwrap();
        assert_eq!(run.stage, "end");
        assert!(run.upload_done);
        assert!(run.finished_at.is_some());

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }

    #[tokio::test]
    async fn missing_run_is_none() {
        let (storage, tmp_dir) = test_storage().await;
        assert!(storage.get_run("nope").await.unwrap().is_none());
        let _ = std::fs::remove_dir_all(&tmp_dir);
    }

    #[tokio::test]
    async fn logs_preserve_order_across_appends() {
        let (storage, tmp_dir) = test_storage().await;

        storage
            .insert_run("run-2", "q", "url_generation")
            .await
            .unwrap();

        storage
            .append_logs(
                "run-2",
                &[
                    LogEntry::new(LogLevel::Info, "first"),
                    LogEntry::new(LogLevel::Warning, "second"),
                ],
            )
            .await
            .unwrap();
        storage
            .append_logs("run-2", &[LogEntry::new(LogLevel::Error, "third")])
            .await
            .unwrap();

        let logs = storage.run_logs("run-2").await.unwrap();
        let messages: Vec<&str> = logs.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert_eq!(logs[2].level, LogLevel::Error);

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }

    #[tokio::test]
    async fn list_runs_most_recent_first() {
        let (storage, tmp_dir) = test_storage().await;

        storage.insert_run("a", "first", "end").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        storage.insert_run("b", "second", "end").await.unwrap();

        let runs = storage.list_runs(10).await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, "b");

        let runs = storage.list_runs(1).await.unwrap();
        assert_eq!(runs.len(), 1);

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }
}
