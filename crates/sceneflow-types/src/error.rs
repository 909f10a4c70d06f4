use thiserror::Error;

/// Errors from persistence operations (used by the `DocumentStore` port in sceneflow-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors raised by a chat transport while delivering outbound messages.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("send to peer {peer} failed: {reason}")]
    SendFailed { peer: String, reason: String },

    #[error("transport closed")]
    Closed,
}

/// Errors surfaced by the conversation engine.
///
/// Configuration variants are setup-time contract violations; `Storage` and
/// `Transport` wrap I/O failures that are propagated without retry.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("scene '{0}' is not registered")]
    UnknownScene(String),

    #[error("invalid scene: {0}")]
    InvalidScene(String),

    #[error("invalid keyboard '{name}': {reason}")]
    InvalidKeyboard { name: String, reason: String },

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("handler error: {0}")]
    Handler(String),
}

impl EngineError {
    /// Wrap an application-level failure raised inside a scene or command.
    pub fn handler(err: impl std::fmt::Display) -> Self {
        Self::Handler(err.to_string())
    }

    /// Whether this error is a setup-time configuration mistake rather than I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownScene(_)
                | Self::InvalidScene(_)
                | Self::InvalidKeyboard { .. }
                | Self::InvalidCommand(_)
        )
    }
}
