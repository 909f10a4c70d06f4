//! The dispatcher: one inbound event in, at most one route taken.
//!
//! Routing priority for every event:
//!
//! 1. A conversation without state is put into the initial scene.
//! 2. A payload intent the active scene declares in `Scene::actions` goes to
//!    that scene, ahead of any global command of the same name.
//! 3. Global commands: the intent's `command`, then the message text.
//! 4. The active scene's `handle` (after middleware).
//! 5. Anything still unhandled sends the conversation back to the initial scene.

use std::sync::Arc;

use sceneflow_types::config::EngineConfig;
use sceneflow_types::error::EngineError;
use sceneflow_types::event::InboundEvent;
use sceneflow_types::keyboard::ButtonSpec;
use tracing::{Instrument, debug, info, info_span};

use super::context::Context;
use super::lock::ConversationLocks;
use crate::command::{CommandHandler, CommandNames, CommandRouter, normalize};
use crate::keyboard::KeyboardRegistry;
use crate::persistence::BoxDocumentStore;
use crate::scene::{Middleware, Scene, SceneManager};
use crate::state::{SessionData, StateStore};
use crate::transport::BoxTransport;

/// Which route an event took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The conversation had no state and was put into the initial scene.
    EnteredInitial,
    /// A payload intent was handled by the active scene.
    PayloadRouted,
    /// A global command ran; carries the normalized command name.
    CommandHandled(String),
    /// The active scene's `handle` ran.
    SceneHandled,
    /// Nothing handled the event; the conversation was returned to the initial scene.
    FellBack,
}

/// Collects scenes, commands, keyboards and middleware before the engine starts.
pub struct DispatcherBuilder {
    config: EngineConfig,
    keyboards: KeyboardRegistry,
    commands: CommandRouter,
    scenes: SceneManager,
    states: Arc<StateStore>,
    documents: BoxDocumentStore,
    transport: BoxTransport,
}

impl DispatcherBuilder {
    pub fn scene(&mut self, name: &str, scene: impl Scene + 'static) -> Result<&mut Self, EngineError> {
        self.scenes.register(name, scene)?;
        Ok(self)
    }

    pub fn command(
        &mut self,
        names: impl Into<CommandNames>,
        handler: impl CommandHandler + 'static,
    ) -> Result<&mut Self, EngineError> {
        self.commands.register(names, handler)?;
        Ok(self)
    }

    pub fn keyboard(
        &mut self,
        name: &str,
        buttons: impl IntoIterator<Item = ButtonSpec>,
    ) -> Result<&mut Self, EngineError> {
        self.keyboards.register(name, buttons)?;
        Ok(self)
    }

    pub fn keyboard_rows<R>(
        &mut self,
        name: &str,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<&mut Self, EngineError>
    where
        R: IntoIterator<Item = ButtonSpec>,
    {
        self.keyboards.register_rows(name, rows)?;
        Ok(self)
    }

    pub fn middleware(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.scenes.use_middleware(middleware);
        self
    }

    /// Finish configuration. Fails when the initial scene is not registered.
    pub fn build(self) -> Result<Dispatcher, EngineError> {
        if !self.scenes.contains(&self.config.initial_scene) {
            return Err(EngineError::UnknownScene(self.config.initial_scene));
        }

        info!(
            initial_scene = %self.config.initial_scene,
            scenes = ?self.scenes.names(),
            commands = self.commands.len(),
            keyboards = self.keyboards.len(),
            serialize = self.config.serialize_conversations,
            "dispatcher ready"
        );

        Ok(Dispatcher {
            config: self.config,
            keyboards: self.keyboards,
            commands: self.commands,
            scenes: self.scenes,
            states: self.states,
            sessions: SessionData::new(),
            documents: self.documents,
            transport: self.transport,
            locks: ConversationLocks::new(),
        })
    }
}

/// Conversation engine entry point.
pub struct Dispatcher {
    config: EngineConfig,
    keyboards: KeyboardRegistry,
    commands: CommandRouter,
    scenes: SceneManager,
    states: Arc<StateStore>,
    sessions: SessionData,
    documents: BoxDocumentStore,
    transport: BoxTransport,
    locks: ConversationLocks,
}

impl Dispatcher {
    /// Start configuring an engine persisting into `documents` and replying through `transport`.
    pub fn builder(
        config: EngineConfig,
        documents: BoxDocumentStore,
        transport: BoxTransport,
    ) -> DispatcherBuilder {
        let states = Arc::new(StateStore::new(
            documents.clone(),
            config.state_collection.clone(),
        ));
        DispatcherBuilder {
            config,
            keyboards: KeyboardRegistry::new(),
            commands: CommandRouter::new(),
            scenes: SceneManager::new(states.clone()),
            states,
            documents,
            transport,
        }
    }

    /// Route one inbound event.
    ///
    /// With `serialize_conversations` enabled the whole routing runs under the
    /// conversation's lock, so a second event of the same conversation waits.
    pub async fn dispatch(&self, event: InboundEvent) -> Result<DispatchOutcome, EngineError> {
        let span = info_span!("dispatch", peer = %event.peer_id);
        async move {
            let _guard = if self.config.serialize_conversations {
                Some(self.locks.acquire(&event.peer_id).await)
            } else {
                None
            };
            let outcome = self.route(event).await?;
            debug!(?outcome, "event dispatched");
            Ok::<_, EngineError>(outcome)
        }
        .instrument(span)
        .await
    }

    async fn route(&self, event: InboundEvent) -> Result<DispatchOutcome, EngineError> {
        let ctx = Context::new(self, event);
        let peer = ctx.peer_id();
        let initial = self.config.initial_scene.as_str();

        if self.states.get(peer).await?.is_none() {
            self.scenes.enter(peer, initial, &ctx).await?;
            return Ok(DispatchOutcome::EnteredInitial);
        }

        if let Some(intent) = ctx.intent() {
            if self.scenes.understands(peer, &intent.command).await?
                && self.scenes.handle_message(&ctx).await?
            {
                return Ok(DispatchOutcome::PayloadRouted);
            }
            if self.commands.dispatch(&intent.command, &ctx).await? {
                return Ok(DispatchOutcome::CommandHandled(intent.command.clone()));
            }
        }

        if let Some(text) = ctx.text() {
            if self.commands.dispatch(text, &ctx).await? {
                return Ok(DispatchOutcome::CommandHandled(normalize(text)));
            }
        }

        if self.scenes.handle_message(&ctx).await? {
            return Ok(DispatchOutcome::SceneHandled);
        }

        info!(%peer, scene = initial, "unhandled event; returning to initial scene");
        self.scenes.enter(peer, initial, &ctx).await?;
        Ok(DispatchOutcome::FellBack)
    }

    /// Build the context a handler would see for `event`, without routing it.
    pub fn context(&self, event: InboundEvent) -> Context<'_> {
        Context::new(self, event)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn keyboards(&self) -> &KeyboardRegistry {
        &self.keyboards
    }

    pub fn commands(&self) -> &CommandRouter {
        &self.commands
    }

    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    pub fn states(&self) -> &StateStore {
        &self.states
    }

    pub fn sessions(&self) -> &SessionData {
        &self.sessions
    }

    pub fn documents(&self) -> &BoxDocumentStore {
        &self.documents
    }

    pub fn transport(&self) -> &BoxTransport {
        &self.transport
    }

    pub fn locks(&self) -> &ConversationLocks {
        &self.locks
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("scenes", &self.scenes)
            .field("commands", &self.commands)
            .field("states", &self.states)
            .finish()
    }
}
