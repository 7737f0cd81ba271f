//! Persisted content stores and remote merge primitives.
//!
//! # Responsibility
//! - Own the note and proposal collections exclusively.
//! - Provide local CRUD plus `upsert` for remote reconciliation.
//!
//! # Invariants
//! - Every mutation persists the whole namespace document before the
//!   in-memory collection is replaced.
//! - Local ids are never rewritten; remote identity is `boost_space_id`.
//! - Sync code mutates records only through store operations.

mod collection;
pub mod merge;
pub mod note_store;
pub mod proposal_store;

use crate::model::LocalId;
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use merge::{merge_remote, UpsertReport};
pub use note_store::NoteStore;
pub use proposal_store::ProposalStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
#[derive(Debug)]
pub enum StoreError {
    /// Persisting the updated document failed; memory is unchanged.
    Storage(StorageError),
    /// No record with this local id exists.
    NotFound { kind: &'static str, id: LocalId },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}
