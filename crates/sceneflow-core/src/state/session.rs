//! Ephemeral per-conversation data.
//!
//! Lives only as long as the process: nothing here is persisted, and a
//! restart starts every conversation with an empty map.

use std::collections::HashMap;

use dashmap::DashMap;
use sceneflow_types::conversation::PeerId;
use serde::de::DeserializeOwned;

/// Per-conversation JSON key/value maps.
#[derive(Debug, Default)]
pub struct SessionData {
    data: DashMap<PeerId, HashMap<String, serde_json::Value>>,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value stored under `key`.
    pub fn get_value(&self, peer: &PeerId, key: &str) -> Option<serde_json::Value> {
        self.data.get(peer).and_then(|map| map.get(key).cloned())
    }

    /// Value stored under `key`, decoded into `T`. A value of another shape reads as `None`.
    pub fn get<T: DeserializeOwned>(&self, peer: &PeerId, key: &str) -> Option<T> {
        self.get_value(peer, key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    pub fn set(&self, peer: &PeerId, key: &str, value: serde_json::Value) {
        self.data
            .entry(peer.clone())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Remove one key. Returns the previous value.
    pub fn remove(&self, peer: &PeerId, key: &str) -> Option<serde_json::Value> {
        self.data.get_mut(peer).and_then(|mut map| map.remove(key))
    }

    /// Forget everything stored for a conversation.
    pub fn clear(&self, peer: &PeerId) {
        self.data.remove(peer);
    }
}
