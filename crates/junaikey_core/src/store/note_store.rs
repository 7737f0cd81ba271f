//! Persisted note collection.
//!
//! # Invariants
//! - `add` prepends, so the collection is newest-first for local creations.
//! - `update` refreshes `updated_at`; `set_boost_space_id` does not.
//! - Persisted shape: `{ "notes": Note[] }` under `junaikey.notes`.

use crate::clock::Clock;
use crate::model::new_local_id;
use crate::model::note::{Note, NoteDraft, NoteId, NotePatch};
use crate::storage::{LoadSource, StoragePort, NOTES_NAMESPACE};
use crate::store::collection::{Collection, CollectionDocument};
use crate::store::merge::UpsertReport;
use crate::store::StoreResult;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotesDocument {
    notes: Vec<Note>,
}

impl CollectionDocument for NotesDocument {
    type Record = Note;

    const NAMESPACE: &'static str = NOTES_NAMESPACE;
    const KIND: &'static str = "note";

    fn from_records(records: Vec<Note>) -> Self {
        Self { notes: records }
    }

    fn into_records(self) -> Vec<Note> {
        self.notes
    }
}

/// Exclusive owner of the user's notes.
pub struct NoteStore {
    inner: Collection<NotesDocument>,
}

impl NoteStore {
    /// Loads persisted notes; corrupt data falls back to an empty list.
    pub fn load(storage: Arc<dyn StoragePort>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Collection::load(storage, clock),
        }
    }

    pub fn load_source(&self) -> LoadSource {
        self.inner.load_source()
    }

    pub fn notes(&self) -> &[Note] {
        self.inner.records()
    }

    pub fn len(&self) -> usize {
        self.inner.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records().is_empty()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.inner.get(id)
    }

    /// Creates a local note with a fresh id and no remote identity.
    pub fn add(&mut self, draft: NoteDraft) -> StoreResult<Note> {
        let now = self.inner.now();
        let note = Note {
            id: new_local_id(),
            title: draft.title,
            content: draft.content,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
            boost_space_id: None,
        };
        let note = self.inner.prepend(note)?;
        info!("event=note_add module=store status=ok note_id={}", note.id);
        Ok(note)
    }

    /// Applies a partial update and refreshes `updated_at`.
    pub fn update(&mut self, id: NoteId, patch: NotePatch) -> StoreResult<Note> {
        let now = self.inner.now();
        self.inner.modify(id, |note| {
            patch.apply_to(note);
            note.updated_at = now;
        })
    }

    pub fn delete(&mut self, id: NoteId) -> StoreResult<Note> {
        let removed = self.inner.remove(id)?;
        info!("event=note_delete module=store status=ok note_id={id}");
        Ok(removed)
    }

    /// Records the remote id assigned by a push. Touches no other field.
    pub fn set_boost_space_id(
        &mut self,
        id: NoteId,
        boost_space_id: impl Into<String>,
    ) -> StoreResult<Note> {
        let boost_space_id = boost_space_id.into();
        self.inner
            .modify(id, |note| note.boost_space_id = Some(boost_space_id))
    }

    /// Merges remotely sourced notes keyed by `boost_space_id`.
    pub fn upsert(&mut self, incoming: Vec<Note>) -> StoreResult<UpsertReport> {
        self.inner.upsert(incoming)
    }

    /// Notes that have never been pushed.
    pub fn unsynced(&self) -> Vec<Note> {
        self.inner.unsynced()
    }

    pub fn known_boost_space_ids(&self) -> HashSet<String> {
        self.inner.known_boost_space_ids()
    }

    /// Notes carrying `tag`, compared case-insensitively.
    pub fn with_tag(&self, tag: &str) -> Vec<&Note> {
        let wanted = tag.trim().to_lowercase();
        self.notes()
            .iter()
            .filter(|note| note.tags.iter().any(|value| value.trim().to_lowercase() == wanted))
            .collect()
    }

    /// Drops every note and the persisted namespace.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.inner.clear()
    }
}
