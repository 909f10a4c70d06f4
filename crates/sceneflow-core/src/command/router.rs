//! Command router.
//!
//! Commands are global: they are consulted before scene-local handling,
//! whatever scene the conversation is in. Lookup is an exact match on the
//! normalized text; there is no prefix or fuzzy matching.

use std::collections::HashMap;
use std::sync::Arc;

use sceneflow_types::error::EngineError;
use tracing::{debug, info, warn};

use super::handler::{CommandHandler, CommandHandlerDyn};
use super::normalize;
use crate::dispatch::Context;

/// One command name or an ordered list of aliases sharing a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNames(Vec<String>);

impl CommandNames {
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for CommandNames {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for CommandNames {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for CommandNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for CommandNames {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for CommandNames {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CommandNames {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

/// Table of global commands keyed by normalized name.
#[derive(Default)]
pub struct CommandRouter {
    commands: HashMap<String, Arc<dyn CommandHandlerDyn>>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under one name or several aliases.
    ///
    /// Every name is normalized before insertion. An empty alias list or a
    /// blank name is rejected and nothing is registered. Re-registering a
    /// name replaces its handler.
    pub fn register(
        &mut self,
        names: impl Into<CommandNames>,
        handler: impl CommandHandler + 'static,
    ) -> Result<&mut Self, EngineError> {
        let names = names.into();
        if names.0.is_empty() {
            return Err(EngineError::InvalidCommand(
                "alias list must not be empty".to_string(),
            ));
        }

        let mut keys = Vec::with_capacity(names.0.len());
        for name in &names.0 {
            let key = normalize(name);
            if key.is_empty() {
                return Err(EngineError::InvalidCommand(
                    "command name must be a non-blank string".to_string(),
                ));
            }
            keys.push(key);
        }

        let handler: Arc<dyn CommandHandlerDyn> = Arc::new(handler);
        for key in keys {
            if self.commands.insert(key.clone(), handler.clone()).is_some() {
                warn!(command = %key, "command re-registered; previous handler replaced");
            }
            info!(command = %key, "registered command");
        }
        Ok(self)
    }

    /// Run the command matching `text`, if any.
    ///
    /// Returns `true` when a command was found, passed validation and ran.
    pub async fn dispatch(&self, text: &str, ctx: &Context<'_>) -> Result<bool, EngineError> {
        let key = normalize(text);
        let Some(handler) = self.commands.get(&key) else {
            return Ok(false);
        };

        if !handler.validate_boxed(ctx).await {
            debug!(command = %key, peer = %ctx.peer_id(), "command validation rejected event");
            return Ok(false);
        }

        debug!(command = %key, peer = %ctx.peer_id(), "running command");
        handler.run_boxed(ctx).await?;
        Ok(true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&normalize(name))
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("commands", &self.names())
            .finish()
    }
}
