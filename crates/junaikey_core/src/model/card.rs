//! Remote card envelope exchanged with BoostSpace.
//!
//! Serialized flat: the record fields plus a `type` discriminator, e.g.
//! `{"type":"note","id":"…","title":"…","boostSpaceId":"bs_…",…}`.

use super::note::Note;
use super::proposal::Proposal;
use super::{LocalId, SyncRecord};
use serde::{Deserialize, Serialize};

/// Card discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Note,
    Proposal,
}

impl CardKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Proposal => "proposal",
        }
    }
}

/// A note or proposal as held by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoredCard {
    Note(Note),
    Proposal(Proposal),
}

impl StoredCard {
    pub fn kind(&self) -> CardKind {
        match self {
            Self::Note(_) => CardKind::Note,
            Self::Proposal(_) => CardKind::Proposal,
        }
    }

    /// Local id the card carried when it was pushed.
    pub fn local_id(&self) -> LocalId {
        match self {
            Self::Note(note) => note.local_id(),
            Self::Proposal(proposal) => proposal.local_id(),
        }
    }

    pub fn boost_space_id(&self) -> Option<&str> {
        match self {
            Self::Note(note) => note.boost_space_id(),
            Self::Proposal(proposal) => proposal.boost_space_id(),
        }
    }

    pub fn set_boost_space_id(&mut self, boost_space_id: impl Into<String>) {
        let value = Some(boost_space_id.into());
        match self {
            Self::Note(note) => note.boost_space_id = value,
            Self::Proposal(proposal) => proposal.boost_space_id = value,
        }
    }
}

impl From<Note> for StoredCard {
    fn from(value: Note) -> Self {
        Self::Note(value)
    }
}

impl From<Proposal> for StoredCard {
    fn from(value: Proposal) -> Self {
        Self::Proposal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{CardKind, StoredCard};
    use crate::model::note::Note;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn note() -> Note {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Note {
            id: Uuid::nil(),
            title: "t".to_string(),
            content: "c".to_string(),
            tags: vec!["x".to_string()],
            created_at: at,
            updated_at: at,
            boost_space_id: Some("bs_1".to_string()),
        }
    }

    #[test]
    fn card_serializes_flat_with_type_tag() {
        let card = StoredCard::from(note());
        let value = serde_json::to_value(&card).expect("serialize");
        assert_eq!(value["type"], "note");
        assert_eq!(value["boostSpaceId"], "bs_1");
        assert_eq!(value["createdAt"], "2024-03-01T12:00:00Z");

        let parsed: StoredCard = serde_json::from_value(value).expect("deserialize");
        assert_eq!(parsed.kind(), CardKind::Note);
        assert_eq!(parsed, card);
    }

    #[test]
    fn set_boost_space_id_overwrites_remote_identity_only() {
        let mut card = StoredCard::from(note());
        card.set_boost_space_id("bs_2");
        assert_eq!(card.boost_space_id(), Some("bs_2"));
        assert_eq!(card.local_id(), Uuid::nil());
    }
}
