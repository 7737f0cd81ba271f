//! Mock BoostSpace remote.
//!
//! # Responsibility
//! - Hold remote cards keyed by `boost_space_id` in their own storage
//!   namespace, so remote state survives restarts like a real backend.
//! - Emulate network latency on every call through the `Delay` port.
//!
//! # Invariants
//! - Every pushed card receives a new unique remote id, even when it
//!   already carried one.
//! - The example dataset is seeded at most once, on the first call that
//!   finds the store empty, whether that call reads or pushes.

use crate::model::card::StoredCard;
use crate::model::note::Note;
use crate::model::proposal::Proposal;
use crate::storage::{load_or_default, save_document, StoragePort, REMOTE_CARDS_NAMESPACE};
use crate::sync::latency::{Delay, LatencyProfile};
use crate::sync::remote::{RemoteError, RemoteResult, RemoteService, SyncStage};
use crate::util::lock;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SERVICE_ID: &str = "boostspace_mock";
/// 2024-01-01T00:00:00Z, stamp of the seeded example cards.
const SEED_EPOCH_SECS: i64 = 1_704_067_200;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteDocument {
    cards: Vec<StoredCard>,
}

#[derive(Debug)]
struct RemoteState {
    cards: Vec<StoredCard>,
    seeded: bool,
}

/// In-process stand-in for the BoostSpace card API.
pub struct MockBoostSpace {
    storage: Arc<dyn StoragePort>,
    delay: Arc<dyn Delay>,
    latency: LatencyProfile,
    seed_examples: bool,
    state: Mutex<RemoteState>,
}

impl MockBoostSpace {
    /// Loads remote cards persisted under `boostspace.cards`.
    pub fn new(storage: Arc<dyn StoragePort>, delay: Arc<dyn Delay>) -> Self {
        let loaded = load_or_default(
            storage.as_ref(),
            REMOTE_CARDS_NAMESPACE,
            RemoteDocument::default,
        );
        let seeded = !loaded.value.cards.is_empty();
        Self {
            storage,
            delay,
            latency: LatencyProfile::default(),
            seed_examples: true,
            state: Mutex::new(RemoteState {
                cards: loaded.value.cards,
                seeded,
            }),
        }
    }

    pub fn with_latency(mut self, latency: LatencyProfile) -> Self {
        self.latency = latency;
        self
    }

    /// Disables the example dataset seeded on first read.
    pub fn with_seed_examples(mut self, enabled: bool) -> Self {
        self.seed_examples = enabled;
        self
    }

    /// Snapshot of remote cards, without latency.
    pub fn cards(&self) -> Vec<StoredCard> {
        lock(&self.state).cards.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).cards.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).cards.is_empty()
    }

    /// Stores a card as if written by another client. The card must already
    /// carry a remote id; an existing card with that id is replaced.
    pub fn insert_card(&self, card: StoredCard) -> RemoteResult<()> {
        let Some(remote_id) = card.boost_space_id().map(str::to_string) else {
            return Err(self.error(
                SyncStage::Push,
                "missing_remote_id",
                "inserted card has no boostSpaceId",
            ));
        };
        let mut state = lock(&self.state);
        let mut next = state.cards.clone();
        match next
            .iter_mut()
            .find(|existing| existing.boost_space_id() == Some(remote_id.as_str()))
        {
            Some(existing) => *existing = card,
            None => next.push(card),
        }
        self.persist(&next, SyncStage::Push)?;
        state.cards = next;
        state.seeded = true;
        Ok(())
    }

    fn persist(&self, cards: &[StoredCard], stage: SyncStage) -> RemoteResult<()> {
        let document = RemoteDocument {
            cards: cards.to_vec(),
        };
        save_document(self.storage.as_ref(), REMOTE_CARDS_NAMESPACE, &document)
            .map_err(|err| self.error(stage, "remote_storage_failed", err.to_string()))
    }

    fn seed_if_fresh(&self, state: &mut RemoteState, stage: SyncStage) -> RemoteResult<()> {
        if state.cards.is_empty() && !state.seeded && self.seed_examples {
            let seed = example_cards();
            self.persist(&seed, stage)?;
            info!(
                "event=remote_seed module=sync status=ok service={SERVICE_ID} cards={}",
                seed.len()
            );
            state.cards = seed;
        }
        state.seeded = true;
        Ok(())
    }

    fn error(&self, stage: SyncStage, code: &str, message: impl Into<String>) -> RemoteError {
        RemoteError::new(SERVICE_ID, stage, code, message, true)
    }

    async fn simulate_latency(&self) {
        let latency = self.latency.sample();
        debug!(
            "event=remote_latency module=sync status=ok service={SERVICE_ID} latency_ms={}",
            latency.as_millis()
        );
        self.delay.sleep(latency).await;
    }
}

#[async_trait]
impl RemoteService for MockBoostSpace {
    fn service_id(&self) -> &str {
        SERVICE_ID
    }

    async fn get_cards(&self) -> RemoteResult<Vec<StoredCard>> {
        self.simulate_latency().await;

        let mut state = lock(&self.state);
        self.seed_if_fresh(&mut state, SyncStage::Pull)?;
        Ok(state.cards.clone())
    }

    async fn create_or_update_cards(
        &self,
        cards: Vec<StoredCard>,
    ) -> RemoteResult<Vec<StoredCard>> {
        self.simulate_latency().await;

        let stored: Vec<StoredCard> = cards
            .into_iter()
            .map(|mut card| {
                card.set_boost_space_id(new_remote_id());
                card
            })
            .collect();

        let mut state = lock(&self.state);
        self.seed_if_fresh(&mut state, SyncStage::Push)?;
        let mut next = state.cards.clone();
        next.extend(stored.iter().cloned());
        self.persist(&next, SyncStage::Push)?;
        state.cards = next;
        info!(
            "event=remote_store module=sync status=ok service={SERVICE_ID} stored={} total={}",
            stored.len(),
            state.cards.len()
        );
        Ok(stored)
    }
}

fn new_remote_id() -> String {
    format!("bs_{}", Uuid::new_v4().simple())
}

fn example_cards() -> Vec<StoredCard> {
    let stamp = DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(SEED_EPOCH_SECS);
    vec![
        StoredCard::Note(Note {
            id: Uuid::from_u128(0x01),
            title: "Welcome to JunAiKey".to_string(),
            content: "# Welcome\n\nCapture a thought, earn experience, grow your spirits."
                .to_string(),
            tags: vec!["welcome".to_string(), "guide".to_string()],
            created_at: stamp,
            updated_at: stamp,
            boost_space_id: Some("bs_seed_note_welcome".to_string()),
        }),
        StoredCard::Note(Note {
            id: Uuid::from_u128(0x02),
            title: "The twelve elements".to_string(),
            content: "Every spirit follows the same curve: floor(100 * level^1.5)."
                .to_string(),
            tags: vec!["guide".to_string()],
            created_at: stamp,
            updated_at: stamp,
            boost_space_id: Some("bs_seed_note_elements".to_string()),
        }),
        StoredCard::Proposal(Proposal {
            id: Uuid::from_u128(0x03),
            title: "Weekly reflection ritual".to_string(),
            description: "Spend Sunday evening distilling the week's notes.".to_string(),
            resonance: 3,
            created_at: stamp,
            updated_at: stamp,
            boost_space_id: Some("bs_seed_proposal_reflection".to_string()),
        }),
    ]
}
