//! Error types for plugin authors

use thiserror::Error;

/// Failure of an author-supplied view, update, init or command function.
///
/// Handlers return this instead of panicking; the registry logs it with the
/// plugin id and message kind and keeps the prior model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HandlerError {
    /// The handler reported a failure
    #[error("{0}")]
    Failed(String),

    /// The message payload did not have the expected shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A state write was not a JSON object
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The handler panicked
    #[error("Handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Create a failure with a message
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Build a `Panicked` error from a `catch_unwind` payload
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

/// A message could not be decoded from its wire representation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MessageError {
    /// Message kind was an empty string
    #[error("Message kind is empty")]
    EmptyKind,

    /// Object message without a `type`, `msgType`, `messageType` or `kind` key
    #[error("Message object has no kind key")]
    MissingKind,

    /// Tuple message that is not `[kind]` or `[kind, payload]`
    #[error("Invalid message tuple: {0}")]
    InvalidTuple(String),

    /// Value that is neither a string, a tuple nor an object
    #[error("Unsupported message shape: {0}")]
    UnsupportedShape(String),
}
