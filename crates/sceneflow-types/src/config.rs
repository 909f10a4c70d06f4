//! Global configuration types for sceneflow.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! engine's initial scene, state persistence, and database location.

use serde::{Deserialize, Serialize};

use crate::document::DEFAULT_STATE_COLLECTION;

/// Top-level configuration.
///
/// Loaded from `~/.sceneflow/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub mode: RunMode,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Deployment mode, reported when the application starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

/// Conversation engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Scene every new (or lost) conversation is forced into.
    #[serde(default = "default_initial_scene")]
    pub initial_scene: String,

    /// Collection holding the durable `{conversationId, state, timestamp}` records.
    #[serde(default = "default_state_collection")]
    pub state_collection: String,

    /// Process events of one conversation strictly one at a time.
    #[serde(default = "default_serialize_conversations")]
    pub serialize_conversations: bool,
}

fn default_initial_scene() -> String {
    "main".to_string()
}

fn default_state_collection() -> String {
    DEFAULT_STATE_COLLECTION.to_string()
}

fn default_serialize_conversations() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_scene: default_initial_scene(),
            state_collection: default_state_collection(),
            serialize_conversations: default_serialize_conversations(),
        }
    }
}

/// Durable store location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL; `None` means `{data_dir}/sceneflow.db`.
    #[serde(default)]
    pub url: Option<String>,
}
