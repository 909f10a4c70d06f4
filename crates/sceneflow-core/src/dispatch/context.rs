//! Per-event conversation context.
//!
//! A `Context` is built by the [`Dispatcher`] for every inbound event and
//! handed to commands, middleware and scenes. It carries the event itself and
//! borrows the dispatcher for state, transitions, replies and session data.

use sceneflow_types::conversation::PeerId;
use sceneflow_types::error::EngineError;
use sceneflow_types::event::{InboundEvent, Intent, Payload};
use sceneflow_types::keyboard::Keyboard;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::dispatcher::Dispatcher;
use crate::command::normalize;
use crate::keyboard::KeyboardRegistry;
use crate::persistence::BoxDocumentStore;

/// Everything a handler knows about the event it is processing.
pub struct Context<'a> {
    dispatcher: &'a Dispatcher,
    peer_id: PeerId,
    text: Option<String>,
    payload: Option<Payload>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher, event: InboundEvent) -> Self {
        let payload = event.payload.as_ref().and_then(|raw| match Payload::parse(raw) {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!(peer = %event.peer_id, error = %err, "discarding undecodable payload");
                None
            }
        });

        Self {
            dispatcher,
            peer_id: event.peer_id,
            text: event.text,
            payload,
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Message text as received.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Message text trimmed and lower-cased, the form commands are matched in.
    pub fn normalized_text(&self) -> Option<String> {
        self.text.as_deref().map(normalize)
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn intent(&self) -> Option<&Intent> {
        self.payload.as_ref().and_then(Payload::intent)
    }

    /// Current state of this conversation.
    pub async fn state(&self) -> Result<Option<String>, EngineError> {
        Ok(self.dispatcher.states().get(&self.peer_id).await?)
    }

    /// Move the conversation to `scene` without running any `leave`/`enter` hooks.
    pub async fn set_state(&self, scene: &str) -> Result<(), EngineError> {
        let scene = scene.trim();
        if !self.dispatcher.scenes().contains(scene) {
            return Err(EngineError::UnknownScene(scene.to_string()));
        }
        self.dispatcher.states().set(&self.peer_id, scene).await?;
        Ok(())
    }

    /// Transition this conversation into `scene`.
    pub async fn enter(&self, scene: &str) -> Result<(), EngineError> {
        self.dispatcher.scenes().enter(&self.peer_id, scene, self).await
    }

    /// Send a text reply, optionally with a named keyboard.
    pub async fn reply(&self, text: &str, keyboard: Option<&str>) -> Result<(), EngineError> {
        let keyboard = self.keyboard(keyboard);
        debug!(peer = %self.peer_id, buttons = keyboard.buttons().count(), "sending text");
        self.dispatcher
            .transport()
            .send_text(&self.peer_id, text, &keyboard)
            .await?;
        Ok(())
    }

    pub async fn send_image(&self, source: &str, keyboard: Option<&str>) -> Result<(), EngineError> {
        let keyboard = self.keyboard(keyboard);
        debug!(peer = %self.peer_id, source, "sending image");
        self.dispatcher
            .transport()
            .send_image(&self.peer_id, source, &keyboard)
            .await?;
        Ok(())
    }

    pub async fn send_image_with_text(
        &self,
        text: &str,
        source: &str,
        keyboard: Option<&str>,
    ) -> Result<(), EngineError> {
        let keyboard = self.keyboard(keyboard);
        debug!(peer = %self.peer_id, source, "sending image with text");
        self.dispatcher
            .transport()
            .send_image_with_text(&self.peer_id, text, source, &keyboard)
            .await?;
        Ok(())
    }

    pub async fn send_video(&self, source: &str, keyboard: Option<&str>) -> Result<(), EngineError> {
        let keyboard = self.keyboard(keyboard);
        debug!(peer = %self.peer_id, source, "sending video");
        self.dispatcher
            .transport()
            .send_video(&self.peer_id, source, &keyboard)
            .await?;
        Ok(())
    }

    /// Session value for this conversation, decoded into `T`.
    pub fn user_data<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.dispatcher.sessions().get(&self.peer_id, key)
    }

    pub fn set_user_data<T: Serialize>(&self, key: &str, value: &T) -> Result<(), EngineError> {
        let value = serde_json::to_value(value).map_err(EngineError::handler)?;
        self.dispatcher.sessions().set(&self.peer_id, key, value);
        Ok(())
    }

    pub fn clear_user_data(&self) {
        self.dispatcher.sessions().clear(&self.peer_id);
    }

    /// The shared keyboard registry; scenes may register keyboards at runtime.
    pub fn keyboards(&self) -> &'a KeyboardRegistry {
        self.dispatcher.keyboards()
    }

    /// Durable store for application collections.
    pub fn documents(&self) -> &'a BoxDocumentStore {
        self.dispatcher.documents()
    }

    fn keyboard(&self, name: Option<&str>) -> Keyboard {
        name.map(|name| self.dispatcher.keyboards().render(name))
            .unwrap_or_else(Keyboard::empty)
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("peer_id", &self.peer_id)
            .field("text", &self.text)
            .field("payload", &self.payload)
            .finish()
    }
}
