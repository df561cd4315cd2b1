//! Error types for building behaviour machines

use thiserror::Error;

/// Behaviour graph construction errors
#[derive(Debug, Error)]
pub enum GraphError {
    /// No factory registered for a condition kind
    #[error("Unknown condition kind: {0}")]
    UnknownCondition(String),

    /// Condition parameters did not match the kind
    #[error("Invalid parameters for condition '{kind}': {message}")]
    InvalidParams { kind: String, message: String },

    /// Two behaviours share a name
    #[error("Duplicate behaviour: {0}")]
    DuplicateBehaviour(String),

    /// A transition points at a behaviour that does not exist
    #[error("Transition from '{from}' targets unknown behaviour '{to}'")]
    UnknownTarget { from: String, to: String },

    /// The initial behaviour does not exist
    #[error("Unknown initial behaviour: {0}")]
    UnknownInitial(String),

    /// Graph definition could not be parsed
    #[error("Failed to parse behaviour graph: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
