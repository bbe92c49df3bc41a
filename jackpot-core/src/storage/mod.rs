pub mod account_store;
pub mod chain_store;

pub use account_store::AccountStore;
pub use chain_store::ChainStore;

use crate::error::{CoreError, Result};
use rusqlite::Connection;
use std::path::Path;
use tokio::sync::Mutex;

/// Single SQLite connection shared by the ledger and the pool runtime.
///
/// The mutex is the serialization point for every operation: a caller holds
/// the guard for the full duration of its transaction.
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                identity TEXT PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                balance INTEGER NOT NULL,
                accepts_payments INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        // Single-row chain tip
        conn.execute(
            "CREATE TABLE IF NOT EXISTS chain (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                height INTEGER NOT NULL,
                hash TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub async fn get_connection(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
