//! Error types for consultation sessions

use medimate_ai::ClientError;
use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("A consultation turn is already in progress")]
    TurnInProgress,

    #[error("Message is empty: provide text, audio or an attachment")]
    EmptyMessage,

    #[error("There is no conversation to export")]
    NothingToExport,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
