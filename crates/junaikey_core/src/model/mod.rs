//! Content records owned by the note and proposal stores.
//!
//! # Responsibility
//! - Define the persisted shapes of notes, proposals and remote cards.
//! - Expose the identity/timestamp contract shared by remote merges.
//!
//! # Invariants
//! - A local `id` is stable for the life of the record and is never rewritten
//!   by sync; remote identity lives only in `boost_space_id`.
//! - A record without `boost_space_id` has never been synced.

pub mod card;
pub mod note;
pub mod proposal;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Local record identifier. Time-ordered (UUID v7) so ids sort by creation.
pub type LocalId = Uuid;

/// Generates a fresh local id.
pub fn new_local_id() -> LocalId {
    Uuid::now_v7()
}

/// Identity and ordering contract for records reconciled with the remote.
pub trait SyncRecord: Clone {
    fn local_id(&self) -> LocalId;
    fn boost_space_id(&self) -> Option<&str>;
    fn updated_at(&self) -> DateTime<Utc>;
    /// Replaces every field with `incoming` except the local id.
    fn absorb_remote(&mut self, incoming: Self);
    /// Re-identifies a record that enters the local collection for the
    /// first time.
    fn with_local_id(self, id: LocalId) -> Self;
}
