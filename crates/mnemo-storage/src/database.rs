// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. The [`Database`] struct IS the single writer; query code accepts
//! `&Database` and goes through `connection().call()`. Do NOT create
//! additional Connection instances for writes.

use mnemo_core::MnemoError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Convert tokio_rusqlite errors into [`MnemoError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error) -> MnemoError {
    MnemoError::Storage {
        source: Box::new(e),
    }
}

/// Convert plain rusqlite errors (connection open, statements run outside
/// `call`) into [`MnemoError::Storage`].
pub(crate) fn map_sql_err(e: rusqlite::Error) -> MnemoError {
    MnemoError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the SQLite database backing fragment storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, MnemoError> {
        debug!("opening database at {path}");
        let conn = Connection::open(path).await.map_err(map_sql_err)?;
        Self::setup(conn).await
    }

    /// Open an in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self, MnemoError> {
        let conn = Connection::open_in_memory().await.map_err(map_sql_err)?;
        Self::setup(conn).await
    }

    async fn setup(conn: Connection) -> Result<Self, MnemoError> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA foreign_keys = ON;",
            )
            .map_err(map_sql_err)?;
            crate::migrations::run_migrations(conn)
        })
        .await
        .map_err(|e| match e {
            // The closure already produced a MnemoError; unwrap it
            // instead of double-wrapping.
            tokio_rusqlite::Error::Error(e) => e,
            other => MnemoError::Storage {
                source: Box::new(other),
            },
        })?;

        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Flush the WAL and release the handle.
    pub async fn close(self) -> Result<(), MnemoError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("database closed");
        Ok(())
    }
}
