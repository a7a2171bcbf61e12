//! Error types for audio-file tag access.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while opening an audio file's tags.
#[derive(Debug, Error)]
pub enum TagError {
    /// The file could not be opened or its format was not recognized.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    /// An error propagated from the core layer.
    #[error(transparent)]
    Core(#[from] tagwright_core::Error),
}

impl TagError {
    /// Returns `true` when the file itself is missing, unreadable or not a
    /// recognized audio format.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::Read { .. })
    }
}

/// Convenience alias for tag results.
pub type TagResult<T> = std::result::Result<T, TagError>;
