//! Namespaced key/value persistence port.
//!
//! # Responsibility
//! - Define the storage contract every persisted store writes through.
//! - Provide in-memory and SQLite-backed implementations.
//! - Load and save whole-namespace JSON documents.
//!
//! # Invariants
//! - Each store owns exactly one namespace key; namespaces never overlap.
//! - A namespace value is always one complete JSON document, written in a
//!   single `set` call.
//! - Loading never fails the caller: corrupt or unreadable documents fall
//!   back to the caller-provided default.
//!
//! # See also
//! - `crate::store` for the namespace document shapes.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
pub mod migrations;
mod persisted;
mod sqlite;

pub use memory::MemoryStorage;
pub use persisted::{load_or_default, save_document, LoadSource, Loaded};
pub use sqlite::SqliteStorage;

/// Namespace key for progression state.
pub const PROGRESSION_NAMESPACE: &str = "junaikey.progression";
/// Namespace key for the note collection.
pub const NOTES_NAMESPACE: &str = "junaikey.notes";
/// Namespace key for the proposal collection.
pub const PROPOSALS_NAMESPACE: &str = "junaikey.proposals";
/// Namespace key for sync bookkeeping (last sync timestamp).
pub const SYNC_NAMESPACE: &str = "junaikey.sync";
/// Namespace key used by the mock remote service for its own card list.
pub const REMOTE_CARDS_NAMESPACE: &str = "boostspace.cards";

/// Namespaces owned by the application stores, cleared on teardown.
pub const APP_NAMESPACES: &[&str] = &[
    PROGRESSION_NAMESPACE,
    NOTES_NAMESPACE,
    PROPOSALS_NAMESPACE,
    SYNC_NAMESPACE,
];

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend and document codec errors.
#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Serialization {
        namespace: String,
        source: serde_json::Error,
    },
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "storage schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Serialization { namespace, source } => {
                write!(f, "failed to encode `{namespace}` document: {source}")
            }
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Serialization { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Storage port used by every persisted store.
///
/// Implementations must be safe to share across the stores of one
/// application context.
pub trait StoragePort: Send + Sync {
    /// Reads the raw document stored under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replaces the raw document stored under `key`.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
