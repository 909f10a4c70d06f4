//! Document store trait.

use std::future::Future;

use sceneflow_types::document::Document;
use sceneflow_types::error::RepositoryError;
use uuid::Uuid;

/// Trait for a generic, schemaless document store organised in named collections.
///
/// The engine only interprets its own state collection; every other
/// collection is opaque application data. Uses RPITIT (native async fn in
/// traits, Rust 2024 edition).
pub trait DocumentStore: Send + Sync {
    /// All documents in a collection, oldest first. Unknown collections are empty.
    fn get_all(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<Document>, RepositoryError>> + Send;

    /// Insert a new document and return it with its assigned id and timestamps.
    fn add(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Document, RepositoryError>> + Send;

    /// Update a document by id.
    ///
    /// Top-level fields of `data` are merged into the stored body when both are
    /// objects; otherwise the body is replaced. Returns `NotFound` when no
    /// document has this id.
    fn update(
        &self,
        collection: &str,
        id: &Uuid,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Document, RepositoryError>> + Send;

    /// Delete a document by id. Returns whether a document was removed.
    fn delete(
        &self,
        collection: &str,
        id: &Uuid,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Remove every document of a collection. Returns `true` once the collection is empty.
    fn clear(&self, collection: &str) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Drop a collection and everything in it. Returns whether it held any documents.
    fn delete_collection(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Names of all non-empty collections, sorted.
    fn list_collections(&self) -> impl Future<Output = Result<Vec<String>, RepositoryError>> + Send;

    /// Documents whose top-level `field` equals `value`.
    ///
    /// The default scans [`DocumentStore::get_all`]; backends with an index
    /// should override it.
    fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> impl Future<Output = Result<Vec<Document>, RepositoryError>> + Send {
        async move {
            let documents = self.get_all(collection).await?;
            Ok(filter_by_field(documents, field, value))
        }
    }
}

/// Keep the documents whose top-level `field` equals `value`.
pub fn filter_by_field(
    documents: Vec<Document>,
    field: &str,
    value: &serde_json::Value,
) -> Vec<Document> {
    documents
        .into_iter()
        .filter(|doc| doc.field(field) == Some(value))
        .collect()
}

/// Merge `patch` into `body`: object fields are overlaid, anything else replaces.
pub fn merge_body(body: &mut serde_json::Value, patch: serde_json::Value) {
    match (body, patch) {
        (serde_json::Value::Object(existing), serde_json::Value::Object(fields)) => {
            existing.extend(fields);
        }
        (body, patch) => *body = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn doc(data: serde_json::Value) -> Document {
        Document {
            id: Uuid::now_v7(),
            collection: "cart".to_string(),
            data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_by_field_matches_exact_value() {
        let docs = vec![
            doc(json!({"userId": "1", "pizza": "Маргарита"})),
            doc(json!({"userId": "2", "pizza": "Пепперони"})),
            doc(json!({"userId": "1", "pizza": "Гавайская"})),
        ];
        let mine = filter_by_field(docs, "userId", &json!("1"));
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|d| d.str_field("userId") == Some("1")));
    }

    #[test]
    fn test_filter_by_field_is_type_sensitive() {
        let docs = vec![doc(json!({"userId": 1}))];
        assert!(filter_by_field(docs, "userId", &json!("1")).is_empty());
    }

    #[test]
    fn test_merge_body_merges_objects() {
        let mut body = json!({"state": "main", "conversationId": "7"});
        merge_body(&mut body, json!({"state": "payment"}));
        assert_eq!(body, json!({"state": "payment", "conversationId": "7"}));
    }

    #[test]
    fn test_merge_body_replaces_non_objects() {
        let mut body = json!([1, 2]);
        merge_body(&mut body, json!({"a": 1}));
        assert_eq!(body, json!({"a": 1}));
    }
}
