//! Error types for the simulation runtime

use thiserror::Error;

/// Runtime errors
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Config or graph file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for `SimConfig`
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// Behaviour graph failed to load or validate
    #[error("Behaviour graph error: {0}")]
    Graph(#[from] strike_ai::GraphError),

    /// Config parsed but is not usable
    #[error("Invalid simulation setup: {0}")]
    InvalidSetup(String),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
