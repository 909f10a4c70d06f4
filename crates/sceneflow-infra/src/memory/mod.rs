//! In-memory document store.
//!
//! Backs the engine when no durable storage is wanted (tests, demos, the
//! `--memory` chat mode). Contents vanish with the process.

use chrono::Utc;
use dashmap::DashMap;
use sceneflow_core::persistence::{DocumentStore, merge_body};
use sceneflow_types::document::Document;
use sceneflow_types::error::RepositoryError;
use uuid::Uuid;

/// `DocumentStore` keeping every collection in a `DashMap`.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: DashMap<String, Vec<Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, RepositoryError> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.value().clone())
            .unwrap_or_default())
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
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn update(
        &self,
        collection: &str,
        id: &Uuid,
        data: serde_json::Value,
    ) -> Result<Document, RepositoryError> {
        let mut docs = self
            .collections
            .get_mut(collection)
            .ok_or(RepositoryError::NotFound)?;
        let document = docs
            .iter_mut()
            .find(|doc| &doc.id == id)
            .ok_or(RepositoryError::NotFound)?;

        merge_body(&mut document.data, data);
        document.updated_at = Utc::now();
        Ok(document.clone())
    }

    async fn delete(&self, collection: &str, id: &Uuid) -> Result<bool, RepositoryError> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| &doc.id != id);
        Ok(docs.len() != before)
    }

    async fn clear(&self, collection: &str) -> Result<bool, RepositoryError> {
        self.collections.remove(collection);
        Ok(true)
    }

    async fn delete_collection(&self, collection: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .collections
            .remove(collection)
            .is_some_and(|(_, docs)| !docs.is_empty()))
    }

    async fn list_collections(&self) -> Result<Vec<String>, RepositoryError> {
        let mut names: Vec<String> = self
            .collections
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }
}
