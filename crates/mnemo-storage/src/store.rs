// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed [`FragmentStore`] implementation.
//!
//! Keyword, entity, and related-fragment sets are stored as JSON TEXT
//! columns; the engine treats them as sets and re-sorts at output
//! boundaries, so column-level ordering is irrelevant. The access-count
//! update is a single SQL increment so concurrent retrievals cannot
//! lose updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mnemo_config::StorageConfig;
use mnemo_core::{ContentType, FragmentStore, MemoryFragment, MnemoError};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Millisecond-precision ISO-8601 UTC, matching SQLite's
/// `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`.
const TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

const SELECT_COLUMNS: &str = "fragment_id, session_id, content, content_type, timestamp, \
     importance_score, keywords, entities, related_fragments, access_count, last_accessed";

/// Convert a rusqlite row into a [`MemoryFragment`].
fn row_to_fragment(row: &rusqlite::Row) -> MemoryFragment {
    let content_type: String = row.get(3).unwrap_or_default();
    let timestamp: String = row.get(4).unwrap_or_default();
    let keywords: String = row.get(6).unwrap_or_default();
    let entities: String = row.get(7).unwrap_or_default();
    let related: String = row.get(8).unwrap_or_default();
    let last_accessed: Option<String> = row.get(10).unwrap_or(None);

    MemoryFragment {
        fragment_id: row.get(0).unwrap_or_default(),
        session_id: row.get(1).unwrap_or_default(),
        content: row.get(2).unwrap_or_default(),
        content_type: ContentType::from_str_value(&content_type),
        timestamp: parse_ts(&timestamp),
        importance_score: row.get(5).unwrap_or(0.5),
        keywords: serde_json::from_str(&keywords).unwrap_or_default(),
        entities: serde_json::from_str(&entities).unwrap_or_default(),
        related_fragments: serde_json::from_str(&related).unwrap_or_default(),
        access_count: row.get(9).unwrap_or(0),
        last_accessed: last_accessed.as_deref().map(parse_ts),
    }
}

/// SQLite-backed fragment store.
pub struct SqliteFragmentStore {
    db: Database,
}

impl SqliteFragmentStore {
    /// Wrap an already-opened [`Database`].
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database configured in `[storage]` and wrap it.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, MnemoError> {
        Ok(Self::new(Database::open(&config.database_path).await?))
    }
}

#[async_trait]
impl FragmentStore for SqliteFragmentStore {
    async fn insert(&self, fragment: &MemoryFragment) -> Result<(), MnemoError> {
        let keywords = serde_json::to_string(&fragment.keywords)
            .map_err(|e| MnemoError::Internal(format!("keyword encoding failed: {e}")))?;
        let entities = serde_json::to_string(&fragment.entities)
            .map_err(|e| MnemoError::Internal(format!("entity encoding failed: {e}")))?;
        let related = serde_json::to_string(&fragment.related_fragments)
            .map_err(|e| MnemoError::Internal(format!("related-id encoding failed: {e}")))?;

        let fragment_id = fragment.fragment_id.clone();
        let session_id = fragment.session_id.clone();
        let content = fragment.content.clone();
        let content_type = fragment.content_type.as_str().to_string();
        let timestamp = fmt_ts(fragment.timestamp);
        let importance = fragment.importance_score;
        let access_count = fragment.access_count;
        let last_accessed = fragment.last_accessed.map(fmt_ts);

        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO fragments (fragment_id, session_id, content, content_type, \
                     timestamp, importance_score, keywords, entities, related_fragments, \
                     access_count, last_accessed) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        fragment_id,
                        session_id,
                        content,
                        content_type,
                        timestamp,
                        importance,
                        keywords,
                        entities,
                        related,
                        access_count,
                        last_accessed,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Vec<MemoryFragment>, MnemoError> {
        let session_id = session_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM fragments \
                     WHERE session_id = ?1 ORDER BY timestamp ASC, fragment_id ASC"
                ))?;
                let fragments = stmt
                    .query_map(params![session_id], |row| Ok(row_to_fragment(row)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(fragments)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn increment_access(&self, fragment_id: &str) -> Result<(), MnemoError> {
        let fragment_id = fragment_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE fragments SET access_count = access_count + 1, \
                     last_accessed = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
                     WHERE fragment_id = ?1",
                    params![fragment_id],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete_many(&self, fragment_ids: &[String]) -> Result<usize, MnemoError> {
        if fragment_ids.is_empty() {
            return Ok(0);
        }
        let ids = fragment_ids.to_vec();
        self.db
            .connection()
            .call(move |conn| {
                let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
                let sql = format!(
                    "DELETE FROM fragments WHERE fragment_id IN ({})",
                    placeholders.join(", ")
                );
                let mut stmt = conn.prepare(&sql)?;
                let params: Vec<&dyn rusqlite::types::ToSql> =
                    ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();
                let deleted = stmt.execute(params.as_slice())?;
                Ok(deleted)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete_session(&self, session_id: &str) -> Result<usize, MnemoError> {
        let session_id = session_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM fragments WHERE session_id = ?1",
                    params![session_id],
                )?;
                Ok(deleted)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn count(&self, session_id: &str) -> Result<usize, MnemoError> {
        let session_id = session_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let n: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM fragments WHERE session_id = ?1",
                    params![session_id],
                    |row| row.get(0),
                )?;
                Ok(n as usize)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn count_by_types(
        &self,
        session_id: &str,
        content_types: &[ContentType],
    ) -> Result<usize, MnemoError> {
        if content_types.is_empty() {
            return Ok(0);
        }
        let session_id = session_id.to_string();
        let types: Vec<String> = content_types
            .iter()
            .map(|ct| ct.as_str().to_string())
            .collect();
        self.db
            .connection()
            .call(move |conn| {
                let placeholders: Vec<String> =
                    (2..=types.len() + 1).map(|i| format!("?{i}")).collect();
                let sql = format!(
                    "SELECT COUNT(*) FROM fragments WHERE session_id = ?1 AND content_type IN ({})",
                    placeholders.join(", ")
                );
                let mut stmt = conn.prepare(&sql)?;
                let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&session_id];
                for t in &types {
                    params.push(t);
                }
                let n: i64 = stmt.query_row(params.as_slice(), |row| row.get(0))?;
                Ok(n as usize)
            })
            .await
            .map_err(map_tr_err)
    }
}
