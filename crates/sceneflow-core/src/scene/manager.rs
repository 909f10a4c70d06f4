//! Scene manager.
//!
//! Owns the scene table and the global middleware chain, and performs
//! transitions: resolve target, `leave` the current scene when it differs,
//! persist the new state, then `enter` the target. State is written before
//! `enter` runs so anything `enter` triggers observes the new scene.

use std::collections::HashMap;
use std::sync::Arc;

use sceneflow_types::conversation::PeerId;
use sceneflow_types::error::EngineError;
use tracing::{debug, info, warn};

use super::behavior::{Scene, SceneDyn};
use super::middleware::{Middleware, MiddlewareDyn};
use crate::dispatch::Context;
use crate::state::StateStore;

/// Registry of scenes and driver of scene transitions.
pub struct SceneManager {
    scenes: HashMap<String, Arc<dyn SceneDyn>>,
    middleware: Vec<Box<dyn MiddlewareDyn>>,
    states: Arc<StateStore>,
}

impl SceneManager {
    pub fn new(states: Arc<StateStore>) -> Self {
        Self {
            scenes: HashMap::new(),
            middleware: Vec::new(),
            states,
        }
    }

    /// Register a scene. A name registered twice keeps the last definition.
    pub fn register(
        &mut self,
        name: &str,
        scene: impl Scene + 'static,
    ) -> Result<&mut Self, EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidScene(
                "scene name must not be blank".to_string(),
            ));
        }

        if self.scenes.insert(name.to_string(), Arc::new(scene)).is_some() {
            warn!(scene = name, "scene re-registered; previous definition replaced");
        } else {
            info!(scene = name, "registered scene");
        }
        Ok(self)
    }

    /// Append a middleware to the global chain.
    pub fn use_middleware(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenes.contains_key(name.trim())
    }

    /// Registered scene names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scenes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Name of the registered scene the conversation is in, if any.
    ///
    /// A stored state naming a scene that is no longer registered reads as `None`.
    pub async fn current(&self, peer: &PeerId) -> Result<Option<String>, EngineError> {
        let state = self.states.get(peer).await?;
        Ok(state.filter(|name| self.scenes.contains_key(name)))
    }

    /// Transition `peer` into `name`.
    ///
    /// Entering the scene the conversation is already in runs `enter` again
    /// without `leave`, letting a scene refresh its greeting and keyboard.
    pub async fn enter(
        &self,
        peer: &PeerId,
        name: &str,
        ctx: &Context<'_>,
    ) -> Result<(), EngineError> {
        let name = name.trim();
        let target = self
            .scenes
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownScene(name.to_string()))?;

        if let Some(current) = self.current(peer).await? {
            if current != name {
                if let Some(scene) = self.scenes.get(&current).cloned() {
                    debug!(%peer, scene = %current, "leaving scene");
                    scene.leave_boxed(ctx).await?;
                }
            }
        }

        self.states.set(peer, name).await?;
        info!(%peer, scene = name, "entered scene");
        target.enter_boxed(ctx).await
    }

    /// Route an event to the conversation's current scene.
    ///
    /// Returns `false` when the conversation is in no registered scene.
    pub async fn handle_message(&self, ctx: &Context<'_>) -> Result<bool, EngineError> {
        let Some(name) = self.current(ctx.peer_id()).await? else {
            return Ok(false);
        };
        let Some(scene) = self.scenes.get(&name).cloned() else {
            return Ok(false);
        };

        for middleware in &self.middleware {
            middleware.call_boxed(ctx).await?;
        }

        debug!(peer = %ctx.peer_id(), scene = %name, "scene handling event");
        scene.handle_boxed(ctx).await?;
        Ok(true)
    }

    /// Whether the conversation's current scene declares `command` as one of its actions.
    pub async fn understands(&self, peer: &PeerId, command: &str) -> Result<bool, EngineError> {
        Ok(self
            .current(peer)
            .await?
            .and_then(|name| self.scenes.get(&name).cloned())
            .is_some_and(|scene| scene.understands(command)))
    }
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("scenes", &self.names())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}
