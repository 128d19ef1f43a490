use std::sync::Arc;

use anyhow::Result;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use crate::schema::{init_sql, MIGRATIONS_TABLE_SQL};

/// A DuckDB backend for hitcount.
///
/// DuckDB is single-writer: concurrent reads are fine, but concurrent writes
/// cause contention. The connection is wrapped in `Arc<Mutex<_>>` so every
/// visit's upserts run as one transaction while the struct stays cheap to
/// share across Axum handlers.
///
/// Memory and thread limits are enforced by [`init_sql`] at open time.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"1GB"` or `"512MB"`.
    /// Runs [`MIGRATIONS_TABLE_SQL`] then the schema init SQL so all tables
    /// and indexes exist before the first request.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(MIGRATIONS_TABLE_SQL)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!(
            "DuckDB opened at {} with memory_limit={}, threads=2",
            path, memory_limit
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// Intended for tests: data is discarded when the struct is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(MIGRATIONS_TABLE_SQL)?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    ///
    /// Called by the `/health` endpoint.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    /// Acquire the DuckDB connection lock for direct queries.
    ///
    /// Intended for integration tests that need to verify stored data.
    /// Production code should use the typed methods in `stats.rs`.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
