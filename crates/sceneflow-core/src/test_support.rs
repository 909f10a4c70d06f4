//! Mock collaborators shared by the engine's unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use sceneflow_types::config::EngineConfig;
use sceneflow_types::conversation::PeerId;
use sceneflow_types::document::Document;
use sceneflow_types::error::{EngineError, RepositoryError, TransportError};
use sceneflow_types::keyboard::Keyboard;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::command::CommandHandler;
use crate::dispatch::{Context, Dispatcher, DispatcherBuilder};
use crate::persistence::{BoxDocumentStore, DocumentStore, merge_body};
use crate::scene::Scene;
use crate::transport::{BoxTransport, Transport};

/// In-memory store with switches for failing and delaying writes.
#[derive(Clone, Default)]
pub(crate) struct MockStore {
    inner: Arc<MockStoreInner>,
}

#[derive(Default)]
struct MockStoreInner {
    docs: Mutex<Vec<Document>>,
    fail_writes: AtomicBool,
    write_gate: Mutex<Option<Arc<Notify>>>,
    writes: AtomicUsize,
    reads: AtomicUsize,
}

impl MockStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write wait until the returned `Notify` fires.
    pub(crate) fn gate_writes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.inner.write_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub(crate) fn writes(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    pub(crate) fn reads(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn documents(&self, collection: &str) -> Vec<Document> {
        self.inner
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.collection == collection)
            .cloned()
            .collect()
    }

    async fn before_write(&self) -> Result<(), RepositoryError> {
        let gate = self.inner.write_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl DocumentStore for MockStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, RepositoryError> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents(collection))
    }

    async fn add(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> Result<Document, RepositoryError> {
        self.before_write().await?;
        let doc = Document {
            id: Uuid::now_v7(),
            collection: collection.to_string(),
            data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.inner.docs.lock().unwrap().push(doc.clone());
        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: &Uuid,
        data: serde_json::Value,
    ) -> Result<Document, RepositoryError> {
        self.before_write().await?;
        let mut docs = self.inner.docs.lock().unwrap();
        let doc = docs
            .iter_mut()
            .find(|d| d.collection == collection && &d.id == id)
            .ok_or(RepositoryError::NotFound)?;
        merge_body(&mut doc.data, data);
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete(&self, collection: &str, id: &Uuid) -> Result<bool, RepositoryError> {
        self.before_write().await?;
        let mut docs = self.inner.docs.lock().unwrap();
        let before = docs.len();
        docs.retain(|d| !(d.collection == collection && &d.id == id));
        Ok(docs.len() != before)
    }

    async fn clear(&self, collection: &str) -> Result<bool, RepositoryError> {
        self.before_write().await?;
        self.inner
            .docs
            .lock()
            .unwrap()
            .retain(|d| d.collection != collection);
        Ok(true)
    }

    async fn delete_collection(&self, collection: &str) -> Result<bool, RepositoryError> {
        self.before_write().await?;
        let mut docs = self.inner.docs.lock().unwrap();
        let before = docs.len();
        docs.retain(|d| d.collection != collection);
        Ok(docs.len() != before)
    }

    async fn list_collections(&self) -> Result<Vec<String>, RepositoryError> {
        let mut names: Vec<String> = self
            .inner
            .docs
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.collection.clone())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// One message captured by [`RecordingTransport`].
#[derive(Debug, Clone)]
pub(crate) struct Sent {
    pub peer: PeerId,
    pub text: Option<String>,
    pub image: Option<String>,
    pub video: Option<String>,
    pub keyboard: Keyboard,
}

/// Transport that records everything it is asked to send.
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    sent: Arc<Mutex<Vec<Sent>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.sent().into_iter().filter_map(|s| s.text).collect()
    }

    pub(crate) fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn record(&self, sent: Sent) -> Result<(), TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed {
                peer: sent.peer.to_string(),
                reason: "transport offline".to_string(),
            });
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

impl Transport for RecordingTransport {
    async fn send_text(
        &self,
        peer: &PeerId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        self.record(Sent {
            peer: peer.clone(),
            text: Some(text.to_string()),
            image: None,
            video: None,
            keyboard: keyboard.clone(),
        })
    }

    async fn send_image(
        &self,
        peer: &PeerId,
        source: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        self.record(Sent {
            peer: peer.clone(),
            text: None,
            image: Some(source.to_string()),
            video: None,
            keyboard: keyboard.clone(),
        })
    }

    async fn send_image_with_text(
        &self,
        peer: &PeerId,
        text: &str,
        source: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        self.record(Sent {
            peer: peer.clone(),
            text: Some(text.to_string()),
            image: Some(source.to_string()),
            video: None,
            keyboard: keyboard.clone(),
        })
    }

    async fn send_video(
        &self,
        peer: &PeerId,
        source: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        self.record(Sent {
            peer: peer.clone(),
            text: None,
            image: None,
            video: Some(source.to_string()),
            keyboard: keyboard.clone(),
        })
    }
}

/// Ordered log of hook invocations shared between test scenes and commands.
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| e.as_str() == entry).count()
    }
}

/// Scene that journals `<name>:enter`, `<name>:leave` and `<name>:handle`.
pub(crate) struct Recorder {
    pub name: &'static str,
    pub journal: Journal,
    pub actions: &'static [&'static str],
}

impl Recorder {
    pub(crate) fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            actions: &[],
        }
    }

    pub(crate) fn with_actions(mut self, actions: &'static [&'static str]) -> Self {
        self.actions = actions;
        self
    }
}

impl Scene for Recorder {
    async fn enter(&self, ctx: &Context<'_>) -> Result<(), EngineError> {
        let state = ctx.state().await?.unwrap_or_default();
        self.journal.push(format!("{}:enter", self.name));
        ctx.reply(&format!("{} (state {state})", self.name), None).await
    }

    async fn leave(&self, _ctx: &Context<'_>) -> Result<(), EngineError> {
        self.journal.push(format!("{}:leave", self.name));
        Ok(())
    }

    async fn handle(&self, _ctx: &Context<'_>) -> Result<(), EngineError> {
        self.journal.push(format!("{}:handle", self.name));
        Ok(())
    }

    fn actions(&self) -> &[&str] {
        self.actions
    }
}

/// Command that journals its label and optionally enters a scene.
pub(crate) struct Note {
    pub label: &'static str,
    pub journal: Journal,
    pub enter: Option<&'static str>,
    pub allow: bool,
}

impl Note {
    pub(crate) fn new(label: &'static str, journal: &Journal) -> Self {
        Self {
            label,
            journal: journal.clone(),
            enter: None,
            allow: true,
        }
    }

    pub(crate) fn entering(mut self, scene: &'static str) -> Self {
        self.enter = Some(scene);
        self
    }

    pub(crate) fn rejecting(mut self) -> Self {
        self.allow = false;
        self
    }
}

impl CommandHandler for Note {
    async fn validate(&self, _ctx: &Context<'_>) -> bool {
        self.allow
    }

    async fn run(&self, ctx: &Context<'_>) -> Result<(), EngineError> {
        self.journal.push(self.label);
        if let Some(scene) = self.enter {
            ctx.enter(scene).await?;
        }
        Ok(())
    }
}

/// Dispatcher over fresh mocks with default engine settings.
pub(crate) fn builder(store: &MockStore, transport: &RecordingTransport) -> DispatcherBuilder {
    Dispatcher::builder(
        EngineConfig::default(),
        BoxDocumentStore::new(store.clone()),
        BoxTransport::new(transport.clone()),
    )
}
