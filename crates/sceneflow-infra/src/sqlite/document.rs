//! SQLite document store implementation.
//!
//! Implements `DocumentStore` from `sceneflow-core` on a single `documents`
//! table. Bodies are stored as JSON text and string equality lookups are
//! pushed down to `json_extract`. Lookups on the conversation id use the
//! literal path the `idx_documents_conversation` expression index is built on.

use chrono::{DateTime, Utc};
use sceneflow_core::persistence::{DocumentStore, filter_by_field, merge_body};
use sceneflow_types::document::{CONVERSATION_ID_FIELD, Document};
use sceneflow_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `DocumentStore`.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: DatabasePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct DocumentRow {
    id: String,
    collection: String,
    data: String,
    created_at: String,
    updated_at: String,
}

impl DocumentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            collection: row.try_get("collection")?,
            data: row.try_get("data")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_document(self) -> Result<Document, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid document id: {e}")))?;
        let data: serde_json::Value = serde_json::from_str(&self.data)
            .map_err(|e| RepositoryError::Query(format!("invalid JSON body: {e}")))?;

        Ok(Document {
            id,
            collection: self.collection,
            data,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn map_err(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

fn encode_body(data: &serde_json::Value) -> Result<String, RepositoryError> {
    serde_json::to_string(data)
        .map_err(|e| RepositoryError::Query(format!("failed to serialize document: {e}")))
}

/// JSON path selecting one top-level key, quoted so any key is addressable.
fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', "\\\""))
}

fn rows_to_documents(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Document>, RepositoryError> {
    rows.iter()
        .map(|row| {
            DocumentRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_document()
        })
        .collect()
}

const COLUMNS: &str = "id, collection, data, created_at, updated_at";

// The path must stay a literal matching the index expression in the migration.
const CONVERSATION_LOOKUP: &str = "SELECT id, collection, data, created_at, updated_at FROM documents
     WHERE collection = ? AND json_extract(data, '$.conversationId') = ?
       AND json_type(data, '$.conversationId') = 'text'
     ORDER BY id";

// ---------------------------------------------------------------------------
// DocumentStore implementation
// ---------------------------------------------------------------------------

impl DocumentStore for SqliteDocumentStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = ? ORDER BY id"
        ))
        .bind(collection)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_err)?;

        rows_to_documents(&rows)
    }

    async fn add(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> Result<Document, RepositoryError> {
        let now = Utc::now();
        let document = Document {
            id: Uuid::now_v7(),
            collection: collection.to_string(),
            data,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO documents (id, collection, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(document.id.to_string())
        .bind(collection)
        .bind(encode_body(&document.data)?)
        .bind(format_datetime(&now))
        .bind(format_datetime(&now))
        .execute(&self.pool.writer)
        .await
        .map_err(map_err)?;

        tracing::debug!(collection, id = %document.id, "document added");
        Ok(document)
    }

    async fn update(
        &self,
        collection: &str,
        id: &Uuid,
        data: serde_json::Value,
    ) -> Result<Document, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(map_err)?;

        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = ? AND id = ?"
        ))
        .bind(collection)
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_err)?
        .ok_or(RepositoryError::NotFound)?;

        let mut document = DocumentRow::from_row(&row)
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .into_document()?;
        merge_body(&mut document.data, data);
        document.updated_at = Utc::now();

        sqlx::query("UPDATE documents SET data = ?, updated_at = ? WHERE id = ?")
            .bind(encode_body(&document.data)?)
            .bind(format_datetime(&document.updated_at))
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;

        tx.commit().await.map_err(map_err)?;

        tracing::debug!(collection, %id, "document updated");
        Ok(document)
    }

    async fn delete(&self, collection: &str, id: &Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, collection: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?")
            .bind(collection)
            .execute(&self.pool.writer)
            .await
            .map_err(map_err)?;

        tracing::info!(collection, removed = result.rows_affected(), "collection cleared");
        Ok(true)
    }

    async fn delete_collection(&self, collection: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?")
            .bind(collection)
            .execute(&self.pool.writer)
            .await
            .map_err(map_err)?;

        let existed = result.rows_affected() > 0;
        tracing::info!(collection, existed, "collection dropped");
        Ok(existed)
    }

    async fn list_collections(&self) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query("SELECT DISTINCT collection FROM documents ORDER BY collection")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_err)?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("collection")
                    .map_err(|e| RepositoryError::Query(e.to_string()))
            })
            .collect()
    }

    async fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<Document>, RepositoryError> {
        let serde_json::Value::String(needle) = value else {
            let documents = self.get_all(collection).await?;
            return Ok(filter_by_field(documents, field, value));
        };

        let rows = if field == CONVERSATION_ID_FIELD {
            sqlx::query(CONVERSATION_LOOKUP)
                .bind(collection)
                .bind(needle)
                .fetch_all(&self.pool.reader)
                .await
                .map_err(map_err)?
        } else {
            let path = json_path(field);
            sqlx::query(&format!(
                "SELECT {COLUMNS} FROM documents
                 WHERE collection = ? AND json_type(data, ?) = 'text' AND json_extract(data, ?) = ?
                 ORDER BY id"
            ))
            .bind(collection)
            .bind(&path)
            .bind(&path)
            .bind(needle)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_err)?
        };

        rows_to_documents(&rows)
    }
}
