//! Persisted proposal collection.
//!
//! # Invariants
//! - New proposals start with the proposer's own resonance.
//! - `add_resonance` adds exactly one; duplicate-vote prevention is a caller
//!   concern.
//! - Persisted shape: `{ "proposals": Proposal[] }` under
//!   `junaikey.proposals`.

use crate::clock::Clock;
use crate::model::new_local_id;
use crate::model::proposal::{
    Proposal, ProposalDraft, ProposalId, ProposalPatch, INITIAL_RESONANCE,
};
use crate::storage::{LoadSource, StoragePort, PROPOSALS_NAMESPACE};
use crate::store::collection::{Collection, CollectionDocument};
use crate::store::merge::UpsertReport;
use crate::store::StoreResult;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProposalsDocument {
    proposals: Vec<Proposal>,
}

impl CollectionDocument for ProposalsDocument {
    type Record = Proposal;

    const NAMESPACE: &'static str = PROPOSALS_NAMESPACE;
    const KIND: &'static str = "proposal";

    fn from_records(records: Vec<Proposal>) -> Self {
        Self { proposals: records }
    }

    fn into_records(self) -> Vec<Proposal> {
        self.proposals
    }
}

/// Exclusive owner of the user's proposals.
pub struct ProposalStore {
    inner: Collection<ProposalsDocument>,
}

impl ProposalStore {
    pub fn load(storage: Arc<dyn StoragePort>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Collection::load(storage, clock),
        }
    }

    pub fn load_source(&self) -> LoadSource {
        self.inner.load_source()
    }

    pub fn proposals(&self) -> &[Proposal] {
        self.inner.records()
    }

    pub fn len(&self) -> usize {
        self.inner.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records().is_empty()
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        self.inner.get(id)
    }

    pub fn add(&mut self, draft: ProposalDraft) -> StoreResult<Proposal> {
        let now = self.inner.now();
        let proposal = Proposal {
            id: new_local_id(),
            title: draft.title,
            description: draft.description,
            resonance: INITIAL_RESONANCE,
            created_at: now,
            updated_at: now,
            boost_space_id: None,
        };
        let proposal = self.inner.prepend(proposal)?;
        info!(
            "event=proposal_add module=store status=ok proposal_id={}",
            proposal.id
        );
        Ok(proposal)
    }

    pub fn update(&mut self, id: ProposalId, patch: ProposalPatch) -> StoreResult<Proposal> {
        let now = self.inner.now();
        self.inner.modify(id, |proposal| {
            patch.apply_to(proposal);
            proposal.updated_at = now;
        })
    }

    pub fn delete(&mut self, id: ProposalId) -> StoreResult<Proposal> {
        self.inner.remove(id)
    }

    /// Adds one resonance and refreshes `updated_at`.
    pub fn add_resonance(&mut self, id: ProposalId) -> StoreResult<Proposal> {
        let now = self.inner.now();
        self.inner.modify(id, |proposal| {
            proposal.resonance = proposal.resonance.saturating_add(1);
            proposal.updated_at = now;
        })
    }

    pub fn set_boost_space_id(
        &mut self,
        id: ProposalId,
        boost_space_id: impl Into<String>,
    ) -> StoreResult<Proposal> {
        let boost_space_id = boost_space_id.into();
        self.inner
            .modify(id, |proposal| proposal.boost_space_id = Some(boost_space_id))
    }

    pub fn upsert(&mut self, incoming: Vec<Proposal>) -> StoreResult<UpsertReport> {
        self.inner.upsert(incoming)
    }

    pub fn unsynced(&self) -> Vec<Proposal> {
        self.inner.unsynced()
    }

    pub fn known_boost_space_ids(&self) -> HashSet<String> {
        self.inner.known_boost_space_ids()
    }

    /// Proposals ordered by resonance, highest first. Ties keep store order.
    pub fn ranked(&self) -> Vec<&Proposal> {
        let mut ranked: Vec<&Proposal> = self.proposals().iter().collect();
        ranked.sort_by(|a, b| b.resonance.cmp(&a.resonance));
        ranked
    }

    pub fn clear(&mut self) -> StoreResult<()> {
        self.inner.clear()
    }
}
