//! Error types for the RL core library

use thiserror::Error;

/// Core error type for RL operations
#[derive(Error, Debug)]
pub enum RLError {
    /// Invalid action
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A coordinate pair outside the 3x3 grid
    #[error("Position ({x}, {y}) is outside the grid")]
    OutOfBounds {
        /// Column
        x: i64,
        /// Row
        y: i64,
    },

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The run was cancelled at a step boundary
    #[error("Run cancelled")]
    Cancelled,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for RL operations
pub type Result<T> = std::result::Result<T, RLError>;
