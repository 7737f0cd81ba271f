//! Note record.

use super::{LocalId, SyncRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type NoteId = LocalId;

/// Markdown note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Markdown source; rendering is a caller concern.
    pub content: String,
    /// Ordered as entered. Duplicates are allowed here.
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost_space_id: Option<String>,
}

/// Caller input for creating a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }

    pub(crate) fn apply_to(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(tags) = self.tags {
            note.tags = tags;
        }
    }
}

impl SyncRecord for Note {
    fn local_id(&self) -> LocalId {
        self.id
    }

    fn boost_space_id(&self) -> Option<&str> {
        self.boost_space_id.as_deref()
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn absorb_remote(&mut self, incoming: Self) {
        let id = self.id;
        *self = incoming;
        self.id = id;
    }

    fn with_local_id(mut self, id: LocalId) -> Self {
        self.id = id;
        self
    }
}
