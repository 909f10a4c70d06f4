//! BoxDocumentStore -- object-safe dynamic dispatch wrapper for DocumentStore.
//!
//! 1. Define an object-safe `DocumentStoreDyn` trait with boxed futures
//! 2. Blanket-impl `DocumentStoreDyn` for all `T: DocumentStore`
//! 3. `BoxDocumentStore` wraps `Arc<dyn DocumentStoreDyn>` and delegates
//!
//! The wrapper is cheap to clone so the state store and the conversation
//! context can share one backend.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use sceneflow_types::document::Document;
use sceneflow_types::error::RepositoryError;
use uuid::Uuid;

use super::document_store::DocumentStore;

/// Object-safe version of [`DocumentStore`] with boxed futures.
pub trait DocumentStoreDyn: Send + Sync {
    fn get_all_boxed<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Document>, RepositoryError>>;

    fn add_boxed<'a>(
        &'a self,
        collection: &'a str,
        data: serde_json::Value,
    ) -> BoxFuture<'a, Result<Document, RepositoryError>>;

    fn update_boxed<'a>(
        &'a self,
        collection: &'a str,
        id: &'a Uuid,
        data: serde_json::Value,
    ) -> BoxFuture<'a, Result<Document, RepositoryError>>;

    fn delete_boxed<'a>(
        &'a self,
        collection: &'a str,
        id: &'a Uuid,
    ) -> BoxFuture<'a, Result<bool, RepositoryError>>;

    fn clear_boxed<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, Result<bool, RepositoryError>>;

    fn delete_collection_boxed<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<bool, RepositoryError>>;

    fn list_collections_boxed(&self) -> BoxFuture<'_, Result<Vec<String>, RepositoryError>>;

    fn find_by_boxed<'a>(
        &'a self,
        collection: &'a str,
        field: &'a str,
        value: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<Vec<Document>, RepositoryError>>;
}

impl<T: DocumentStore> DocumentStoreDyn for T {
    fn get_all_boxed<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Document>, RepositoryError>> {
        Box::pin(self.get_all(collection))
    }

    fn add_boxed<'a>(
        &'a self,
        collection: &'a str,
        data: serde_json::Value,
    ) -> BoxFuture<'a, Result<Document, RepositoryError>> {
        Box::pin(self.add(collection, data))
    }

    fn update_boxed<'a>(
        &'a self,
        collection: &'a str,
        id: &'a Uuid,
        data: serde_json::Value,
    ) -> BoxFuture<'a, Result<Document, RepositoryError>> {
        Box::pin(self.update(collection, id, data))
    }

    fn delete_boxed<'a>(
        &'a self,
        collection: &'a str,
        id: &'a Uuid,
    ) -> BoxFuture<'a, Result<bool, RepositoryError>> {
        Box::pin(self.delete(collection, id))
    }

    fn clear_boxed<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, Result<bool, RepositoryError>> {
        Box::pin(self.clear(collection))
    }

    fn delete_collection_boxed<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<bool, RepositoryError>> {
        Box::pin(self.delete_collection(collection))
    }

    fn list_collections_boxed(&self) -> BoxFuture<'_, Result<Vec<String>, RepositoryError>> {
        Box::pin(self.list_collections())
    }

    fn find_by_boxed<'a>(
        &'a self,
        collection: &'a str,
        field: &'a str,
        value: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<Vec<Document>, RepositoryError>> {
        Box::pin(self.find_by(collection, field, value))
    }
}

/// Type-erased document store for runtime backend selection (SQLite, in-memory).
#[derive(Clone)]
pub struct BoxDocumentStore {
    inner: Arc<dyn DocumentStoreDyn>,
}

impl BoxDocumentStore {
    /// Wrap a concrete `DocumentStore` implementation.
    pub fn new<T: DocumentStore + 'static>(store: T) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    pub async fn get_all(&self, collection: &str) -> Result<Vec<Document>, RepositoryError> {
        self.inner.get_all_boxed(collection).await
    }

    pub async fn add(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> Result<Document, RepositoryError> {
        self.inner.add_boxed(collection, data).await
    }

    pub async fn update(
        &self,
        collection: &str,
        id: &Uuid,
        data: serde_json::Value,
    ) -> Result<Document, RepositoryError> {
        self.inner.update_boxed(collection, id, data).await
    }

    pub async fn delete(&self, collection: &str, id: &Uuid) -> Result<bool, RepositoryError> {
        self.inner.delete_boxed(collection, id).await
    }

    pub async fn clear(&self, collection: &str) -> Result<bool, RepositoryError> {
        self.inner.clear_boxed(collection).await
    }

    pub async fn delete_collection(&self, collection: &str) -> Result<bool, RepositoryError> {
        self.inner.delete_collection_boxed(collection).await
    }

    pub async fn list_collections(&self) -> Result<Vec<String>, RepositoryError> {
        self.inner.list_collections_boxed().await
    }

    pub async fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<Document>, RepositoryError> {
        self.inner.find_by_boxed(collection, field, value).await
    }
}

impl std::fmt::Debug for BoxDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxDocumentStore").finish_non_exhaustive()
    }
}
