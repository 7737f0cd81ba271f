//! Proposal record.

use super::{LocalId, SyncRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ProposalId = LocalId;

/// Resonance a proposal starts with: the proposer's own.
pub const INITIAL_RESONANCE: u32 = 1;

/// Community idea tracked with a resonance counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub resonance: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost_space_id: Option<String>,
}

/// Caller input for creating a proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalDraft {
    pub title: String,
    pub description: String,
}

impl ProposalDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Partial update; resonance changes only through `add_resonance`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ProposalPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    pub(crate) fn apply_to(self, proposal: &mut Proposal) {
        if let Some(title) = self.title {
            proposal.title = title;
        }
        if let Some(description) = self.description {
            proposal.description = description;
        }
    }
}

impl SyncRecord for Proposal {
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
