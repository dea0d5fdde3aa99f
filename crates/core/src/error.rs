//! Error type shared by the game store.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures surfaced by [`GameDatabase`](crate::GameDatabase) and the stores beneath it.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unsaved game was handed to `save` without a start date.
    #[error("game has no start date, cannot derive an id")]
    MissingStartDate,

    /// A filesystem operation against the data directory failed.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// Short verb describing the operation (`write`, `rename`, ...).
        action: &'static str,
        /// File or directory the operation targeted.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A record could not be serialised.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        /// Destination of the record.
        path: PathBuf,
        /// Serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// A stored record could not be parsed.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// File that held the record.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// A saved game carries an id that was not derived from its start date.
    #[error("game id {id} does not match start date {date_started}")]
    IdMismatch {
        /// Id found on the game.
        id: String,
        /// Start date the id should have been derived from.
        date_started: i64,
    },

    /// A game id supplied from outside the store is malformed.
    #[error("invalid game id {0:?}, expected 16 lowercase hex digits")]
    InvalidId(String),
}

impl DatabaseError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DatabaseError>;
