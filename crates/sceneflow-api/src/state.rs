//! Application state shared by every CLI command.
//!
//! AppState resolves the data directory, loads `config.toml`, opens the
//! SQLite database and pins the document store to the concrete infra
//! implementation.

use std::path::PathBuf;

use sceneflow_core::persistence::BoxDocumentStore;
use sceneflow_core::state::StateStore;
use sceneflow_infra::config::{load_global_config, resolve_database_url};
use sceneflow_infra::filesystem::resolve_data_dir;
use sceneflow_infra::sqlite::{DatabasePool, SqliteDocumentStore};
use sceneflow_types::config::GlobalConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
    pub documents: BoxDocumentStore,
}

impl AppState {
    /// Initialize the application state: load config, connect to the database.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let db_url = resolve_database_url(&config, &data_dir);
        let db_pool = DatabasePool::new(&db_url).await?;
        let documents = BoxDocumentStore::new(SqliteDocumentStore::new(db_pool));

        tracing::debug!(data_dir = %data_dir.display(), mode = ?config.mode, "application state ready");

        Ok(Self::with_documents(config, data_dir, documents))
    }

    /// Assemble the state around an already opened document store.
    pub fn with_documents(config: GlobalConfig, data_dir: PathBuf, documents: BoxDocumentStore) -> Self {
        Self {
            config,
            data_dir,
            documents,
        }
    }

    /// State store over the configured state collection.
    pub fn states(&self) -> StateStore {
        StateStore::new(
            self.documents.clone(),
            self.config.engine.state_collection.clone(),
        )
    }
}
