//! Cache-first, write-through conversation state store.
//!
//! Reads hit the in-memory cache first and fall back to the durable document
//! store on a miss. Writes update the cache before the durable write starts,
//! so readers in this process observe a new state even while persistence is
//! still in flight. A failed durable write is returned to the caller and the
//! cache is left ahead of the durable record until the next successful write.

use dashmap::DashMap;
use sceneflow_types::conversation::PeerId;
use sceneflow_types::document::{CONVERSATION_ID_FIELD, Document, StateRecord};
use sceneflow_types::error::RepositoryError;
use tracing::{debug, warn};

use crate::persistence::BoxDocumentStore;

/// Maps a conversation to its current state name.
pub struct StateStore {
    cache: DashMap<PeerId, String>,
    store: BoxDocumentStore,
    collection: String,
}

impl StateStore {
    /// Create a state store persisting into `collection` of `store`.
    pub fn new(store: BoxDocumentStore, collection: impl Into<String>) -> Self {
        Self {
            cache: DashMap::new(),
            store,
            collection: collection.into(),
        }
    }

    /// Current state of a conversation, or `None` if it never entered a scene.
    pub async fn get(&self, peer: &PeerId) -> Result<Option<String>, RepositoryError> {
        if let Some(state) = self.cached(peer) {
            return Ok(Some(state));
        }

        let state = self
            .find_record(peer)
            .await?
            .and_then(|doc| doc.str_field("state").map(str::to_string));

        if let Some(state) = &state {
            debug!(%peer, state = %state, "state loaded from durable store");
            self.cache.insert(peer.clone(), state.clone());
        }
        Ok(state)
    }

    /// Set the state of a conversation and write it through to the durable store.
    ///
    /// Returns the state name that was written.
    pub async fn set(&self, peer: &PeerId, state: &str) -> Result<String, RepositoryError> {
        self.cache.insert(peer.clone(), state.to_string());

        let record = StateRecord::new(peer.as_str(), state);
        let data = serde_json::to_value(&record)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize state record: {e}")))?;

        let result = match self.find_record(peer).await? {
            Some(existing) => self
                .store
                .update(&self.collection, &existing.id, data)
                .await
                .map(|_| ()),
            None => self.store.add(&self.collection, data).await.map(|_| ()),
        };

        if let Err(err) = result {
            warn!(%peer, state, error = %err, "durable state write failed; cache is ahead of store");
            return Err(err);
        }

        debug!(%peer, state, "state persisted");
        Ok(state.to_string())
    }

    /// State held in the cache, without touching the durable store.
    pub fn cached(&self, peer: &PeerId) -> Option<String> {
        self.cache.get(peer).map(|entry| entry.value().clone())
    }

    /// Drop a conversation from the cache; the next `get` re-reads durable state.
    pub fn evict(&self, peer: &PeerId) {
        self.cache.remove(peer);
    }

    /// Every durable state record in the collection.
    ///
    /// Documents that do not parse as a state record are skipped with a warning.
    pub async fn records(&self) -> Result<Vec<StateRecord>, RepositoryError> {
        let documents = self.store.get_all(&self.collection).await?;
        let mut records = Vec::with_capacity(documents.len());
        for doc in documents {
            match serde_json::from_value::<StateRecord>(doc.data) {
                Ok(record) => records.push(record),
                Err(err) => warn!(id = %doc.id, error = %err, "skipping malformed state record"),
            }
        }
        Ok(records)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn find_record(&self, peer: &PeerId) -> Result<Option<Document>, RepositoryError> {
        let key = serde_json::Value::String(peer.as_str().to_string());
        let mut matches = self
            .store
            .find_by(&self.collection, CONVERSATION_ID_FIELD, &key)
            .await?;

        if matches.len() > 1 {
            warn!(%peer, records = matches.len(), "multiple state records for conversation; using the first");
        }
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.swap_remove(0))
        })
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("collection", &self.collection)
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::MockStore;

    fn store_with(mock: &MockStore) -> StateStore {
        StateStore::new(BoxDocumentStore::new(mock.clone()), "user_states")
    }

    #[tokio::test]
    async fn test_get_unknown_conversation_is_none() {
        let mock = MockStore::new();
        let states = store_with(&mock);
        assert_eq!(states.get(&PeerId::from("1")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let mock = MockStore::new();
        let states = store_with(&mock);
        let peer = PeerId::from("1");

        let written = states.set(&peer, "main").await.unwrap();
        assert_eq!(written, "main");
        assert_eq!(states.get(&peer).await.unwrap().as_deref(), Some("main"));
    }

    #[tokio::test]
    async fn test_set_creates_then_updates_single_record() {
        let mock = MockStore::new();
        let states = store_with(&mock);
        let peer = PeerId::from("77");

        states.set(&peer, "main").await.unwrap();
        states.set(&peer, "categories").await.unwrap();

        let docs = mock.documents("user_states");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].str_field("conversationId"), Some("77"));
        assert_eq!(docs[0].str_field("state"), Some("categories"));
        assert!(docs[0].field("timestamp").is_some());
    }

    #[tokio::test]
    async fn test_get_reads_through_and_populates_cache() {
        let mock = MockStore::new();
        let peer = PeerId::from("5");
        store_with(&mock).set(&peer, "payment").await.unwrap();

        // A fresh store simulates a process restart.
        let restarted = store_with(&mock);
        assert!(restarted.cached(&peer).is_none());
        assert_eq!(restarted.get(&peer).await.unwrap().as_deref(), Some("payment"));
        assert_eq!(restarted.cached(&peer).as_deref(), Some("payment"));

        let reads = mock.reads();
        restarted.get(&peer).await.unwrap();
        assert_eq!(mock.reads(), reads, "second read must be served from cache");
    }

    #[tokio::test]
    async fn test_cache_visible_before_durable_write_completes() {
        let mock = MockStore::new();
        let gate = mock.gate_writes();
        let states = Arc::new(store_with(&mock));
        let peer = PeerId::from("9");

        let writer = {
            let states = states.clone();
            let peer = peer.clone();
            tokio::spawn(async move { states.set(&peer, "main").await })
        };

        while states.cached(&peer).is_none() {
            tokio::task::yield_now().await;
        }
        assert_eq!(states.get(&peer).await.unwrap().as_deref(), Some("main"));
        assert!(mock.documents("user_states").is_empty());

        gate.notify_one();
        writer.await.unwrap().unwrap();
        assert_eq!(mock.documents("user_states").len(), 1);
    }

    #[tokio::test]
    async fn test_durable_failure_propagates_and_keeps_cache() {
        let mock = MockStore::new();
        mock.fail_writes(true);
        let states = store_with(&mock);
        let peer = PeerId::from("3");

        let err = states.set(&peer, "main").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Connection));
        assert_eq!(states.cached(&peer).as_deref(), Some("main"));
        assert!(mock.documents("user_states").is_empty());

        mock.fail_writes(false);
        states.set(&peer, "main").await.unwrap();
        assert_eq!(mock.documents("user_states").len(), 1);
    }

    #[tokio::test]
    async fn test_evict_forces_durable_read() {
        let mock = MockStore::new();
        let states = store_with(&mock);
        let peer = PeerId::from("4");
        states.set(&peer, "main").await.unwrap();

        states.evict(&peer);
        assert!(states.cached(&peer).is_none());
        assert_eq!(states.get(&peer).await.unwrap().as_deref(), Some("main"));
    }

    #[tokio::test]
    async fn test_records_lists_every_conversation() {
        let mock = MockStore::new();
        let states = store_with(&mock);
        states.set(&PeerId::from("1"), "main").await.unwrap();
        states.set(&PeerId::from("2"), "payment").await.unwrap();

        let mut records = states.records().await.unwrap();
        records.sort_by(|a, b| a.conversation_id.cmp(&b.conversation_id));
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].state, "payment");
    }
}
