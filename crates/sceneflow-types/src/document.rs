//! Durable document types.
//!
//! The persistence collaborator is a schemaless collection store: every
//! document is an arbitrary JSON object tagged with an id and timestamps.
//! Conversation state is one such collection, holding [`StateRecord`] rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default collection holding one [`StateRecord`] per conversation.
pub const DEFAULT_STATE_COLLECTION: &str = "user_states";

/// Body field of a [`StateRecord`] holding the conversation id.
pub const CONVERSATION_ID_FIELD: &str = "conversationId";

/// A document stored in a named collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub collection: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Look up a top-level field of the document body.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.data.get(name)
    }

    /// Look up a top-level string field of the document body.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(serde_json::Value::as_str)
    }
}

/// Durable record of where a conversation stands.
///
/// Serialized with camelCase keys (`conversationId`, `state`, `timestamp`) so
/// records written by other tooling against the same collection stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    pub conversation_id: String,
    pub state: String,
    pub timestamp: DateTime<Utc>,
}

impl StateRecord {
    pub fn new(conversation_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            state: state.into(),
            timestamp: Utc::now(),
        }
    }
}
