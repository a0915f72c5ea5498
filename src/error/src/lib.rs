//! Error taxonomy for persistence and configuration.
//!
//! Player-facing invalid actions never surface here; the engine reports
//! those as log messages. These errors cover the I/O edge only.

use bincode::error::{DecodeError, EncodeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Corrupted save data")]
    CorruptedSave,

    /// Snapshot written by a newer build
    #[error("Incompatible save version: {found} (supported up to {supported})")]
    VersionMismatch { found: u32, supported: u32 },

    #[error("Invalid save data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<DecodeError> for GameError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnexpectedEnd { .. } | DecodeError::Utf8 { .. } => GameError::CorruptedSave,
            other => GameError::DeserializationError(other.to_string()),
        }
    }
}

impl From<EncodeError> for GameError {
    fn from(err: EncodeError) -> Self {
        GameError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            GameError::SerializationError(err.to_string())
        } else if err.is_eof() || err.is_syntax() {
            GameError::CorruptedSave
        } else {
            GameError::DeserializationError(err.to_string())
        }
    }
}

/// User-facing text for an error
pub fn handle_error(error: &GameError) -> String {
    match error {
        GameError::CorruptedSave => "Save data is corrupted and cannot be loaded".to_string(),
        GameError::VersionMismatch { found, .. } => {
            format!("Save was written by a newer version (v{found})")
        }
        GameError::IoError(e) => match e.kind() {
            std::io::ErrorKind::NotFound => "Save file not found".to_string(),
            std::io::ErrorKind::PermissionDenied => "No permission to access save file".to_string(),
            _ => format!("IO error: {e}"),
        },
        _ => error.to_string(),
    }
}
