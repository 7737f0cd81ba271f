//! Sync pass coordinator.
//!
//! # Responsibility
//! - Push never-synced notes/proposals and patch assigned remote ids back.
//! - Pull remote-only cards into the stores through `upsert`.
//! - Drive and broadcast the sync status state machine.
//!
//! # Invariants
//! - Store locks are never held across an `.await`.
//! - A request is rejected while a pass is `connecting|pushing|pulling`.
//! - The auto-reset only returns to idle if no newer pass has started.
//! - There is no cross-store transaction: notes are patched before
//!   proposals, so a failure in between leaves proposals unsynced.

use crate::clock::Clock;
use crate::model::card::StoredCard;
use crate::model::note::Note;
use crate::model::proposal::Proposal;
use crate::model::LocalId;
use crate::storage::{load_or_default, save_document, StoragePort, SYNC_NAMESPACE};
use crate::store::{NoteStore, ProposalStore, StoreError};
use crate::sync::latency::Delay;
use crate::sync::remote::{RemoteError, RemoteService, SyncStage};
use crate::sync::status::{
    SyncError, SyncOutcome, SyncReport, SyncState, SyncStatus, SYNC_FAILURE_MESSAGE,
};
use crate::util::lock;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

const STATUS_CHANNEL_CAPACITY: usize = 64;

/// Timing knobs for sync passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Delay before a terminal status returns to idle.
    pub auto_reset: Duration,
    /// Upper bound for one whole pass.
    pub timeout: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            auto_reset: Duration::from_secs(3),
            timeout: Duration::from_secs(30),
        }
    }
}

/// External collaborators a sync pass needs.
#[derive(Clone)]
pub struct SyncPorts {
    pub remote: Arc<dyn RemoteService>,
    pub storage: Arc<dyn StoragePort>,
    pub clock: Arc<dyn Clock>,
    pub delay: Arc<dyn Delay>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncDocument {
    last_synced_at: Option<DateTime<Utc>>,
}

struct Tracked {
    state: SyncState,
    run_id: u64,
}

struct Inner {
    notes: Arc<Mutex<NoteStore>>,
    proposals: Arc<Mutex<ProposalStore>>,
    ports: SyncPorts,
    settings: SyncSettings,
    tracked: Mutex<Tracked>,
    events: broadcast::Sender<SyncStatus>,
}

/// Cloneable handle to one orchestrator.
#[derive(Clone)]
pub struct SyncOrchestrator {
    inner: Arc<Inner>,
}

impl SyncOrchestrator {
    pub fn new(
        notes: Arc<Mutex<NoteStore>>,
        proposals: Arc<Mutex<ProposalStore>>,
        ports: SyncPorts,
        settings: SyncSettings,
    ) -> Self {
        let document = load_or_default(
            ports.storage.as_ref(),
            SYNC_NAMESPACE,
            SyncDocument::default,
        )
        .value;
        let (events, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                notes,
                proposals,
                ports,
                settings,
                tracked: Mutex::new(Tracked {
                    state: SyncState::idle(document.last_synced_at),
                    run_id: 0,
                }),
                events,
            }),
        }
    }

    /// Current status, message and last successful sync time.
    pub fn state(&self) -> SyncState {
        lock(&self.inner.tracked).state.clone()
    }

    /// Receives every status transition from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncStatus> {
        self.inner.events.subscribe()
    }

    pub fn settings(&self) -> SyncSettings {
        self.inner.settings
    }

    /// Forgets the last sync and returns to idle. Pending auto-resets
    /// from earlier passes become stale.
    pub(crate) fn reset(&self) {
        let mut tracked = lock(&self.inner.tracked);
        tracked.run_id += 1;
        tracked.state = SyncState::idle(None);
        let _ = self.inner.events.send(SyncStatus::Idle);
    }

    /// Runs one push/pull pass.
    ///
    /// Never fails: errors become `SyncStatus::Error` plus
    /// `SyncOutcome::Failed`, and overlapping requests are rejected.
    pub async fn sync_with_boost_space(&self) -> SyncOutcome {
        let run_id = match self.inner.begin() {
            Ok(run_id) => run_id,
            Err(in_flight) => {
                warn!(
                    "event=sync_run module=sync status=skip reason=in_flight current={}",
                    in_flight.as_str()
                );
                return SyncOutcome::Rejected { in_flight };
            }
        };

        let started_at = Instant::now();
        info!("event=sync_run module=sync status=start run_id={run_id}");

        let timeout = self.inner.settings.timeout;
        let result = match tokio::time::timeout(timeout, self.inner.run_pass()).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::TimedOut(timeout)),
        };

        let outcome = match result {
            Ok(report) => {
                let synced_at = self.inner.ports.clock.now();
                self.inner.record_last_sync(synced_at);
                self.inner
                    .finish(SyncStatus::Success, report.message(), Some(synced_at));
                info!(
                    "event=sync_run module=sync status=ok run_id={run_id} duration_ms={} pushed={} pulled={}",
                    started_at.elapsed().as_millis(),
                    report.pushed(),
                    report.pulled()
                );
                SyncOutcome::Completed(report)
            }
            Err(err) => {
                self.inner
                    .finish(SyncStatus::Error, SYNC_FAILURE_MESSAGE.to_string(), None);
                error!(
                    "event=sync_run module=sync status=error run_id={run_id} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                SyncOutcome::Failed(err)
            }
        };

        self.schedule_reset(run_id);
        outcome
    }

    fn schedule_reset(&self, run_id: u64) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.ports.delay.sleep(inner.settings.auto_reset).await;
            inner.reset_if_current(run_id);
        });
    }
}

impl Inner {
    /// Enters `connecting` unless a pass is already in flight.
    fn begin(&self) -> Result<u64, SyncStatus> {
        let mut tracked = lock(&self.tracked);
        if tracked.state.status.is_in_flight() {
            return Err(tracked.state.status);
        }
        tracked.run_id += 1;
        tracked.state.status = SyncStatus::Connecting;
        tracked.state.message = None;
        let _ = self.events.send(SyncStatus::Connecting);
        Ok(tracked.run_id)
    }

    fn transition(&self, status: SyncStatus) {
        let mut tracked = lock(&self.tracked);
        tracked.state.status = status;
        let _ = self.events.send(status);
    }

    fn finish(&self, status: SyncStatus, message: String, synced_at: Option<DateTime<Utc>>) {
        let mut tracked = lock(&self.tracked);
        tracked.state.status = status;
        tracked.state.message = Some(message);
        if synced_at.is_some() {
            tracked.state.last_synced_at = synced_at;
        }
        let _ = self.events.send(status);
    }

    fn reset_if_current(&self, run_id: u64) {
        let mut tracked = lock(&self.tracked);
        if tracked.run_id != run_id || !tracked.state.status.is_terminal() {
            return;
        }
        tracked.state.status = SyncStatus::Idle;
        tracked.state.message = None;
        let _ = self.events.send(SyncStatus::Idle);
    }

    fn record_last_sync(&self, synced_at: DateTime<Utc>) {
        let document = SyncDocument {
            last_synced_at: Some(synced_at),
        };
        if let Err(err) = save_document(self.ports.storage.as_ref(), SYNC_NAMESPACE, &document) {
            warn!("event=sync_bookkeeping module=sync status=error error={err}");
        }
    }

    async fn run_pass(&self) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        self.transition(SyncStatus::Pushing);
        let batch: Vec<StoredCard> = {
            let notes = lock(&self.notes).unsynced();
            let proposals = lock(&self.proposals).unsynced();
            notes
                .into_iter()
                .map(StoredCard::from)
                .chain(proposals.into_iter().map(StoredCard::from))
                .collect()
        };
        if !batch.is_empty() {
            let stored = self.ports.remote.create_or_update_cards(batch).await?;
            let (notes, proposals) = self.patch_back(&stored)?;
            report.pushed_notes = notes;
            report.pushed_proposals = proposals;
        }

        self.transition(SyncStatus::Pulling);
        let remote_cards = self.ports.remote.get_cards().await?;
        let known: HashSet<String> = {
            let mut known = lock(&self.notes).known_boost_space_ids();
            known.extend(lock(&self.proposals).known_boost_space_ids());
            known
        };

        let mut remote_notes: Vec<Note> = Vec::new();
        let mut remote_proposals: Vec<Proposal> = Vec::new();
        for card in remote_cards {
            match card.boost_space_id() {
                Some(remote_id) if !known.contains(remote_id) => {}
                _ => continue,
            }
            match card {
                StoredCard::Note(note) => remote_notes.push(note),
                StoredCard::Proposal(proposal) => remote_proposals.push(proposal),
            }
        }

        if !remote_notes.is_empty() {
            report.pulled_notes = lock(&self.notes).upsert(remote_notes)?.inserted;
        }
        if !remote_proposals.is_empty() {
            report.pulled_proposals = lock(&self.proposals).upsert(remote_proposals)?.inserted;
        }

        Ok(report)
    }

    /// Writes pushed remote ids onto the existing local records, notes first.
    fn patch_back(&self, stored: &[StoredCard]) -> Result<(usize, usize), SyncError> {
        let mut patched_notes = 0;
        let mut patched_proposals = 0;

        {
            let mut notes = lock(&self.notes);
            for card in stored.iter().filter(|card| matches!(card, StoredCard::Note(_))) {
                let remote_id = self.require_remote_id(card)?;
                match notes.set_boost_space_id(card.local_id(), remote_id) {
                    Ok(_) => patched_notes += 1,
                    Err(StoreError::NotFound { kind, id }) => log_vanished(kind, id, remote_id),
                    Err(err) => return Err(err.into()),
                }
            }
        }

        {
            let mut proposals = lock(&self.proposals);
            for card in stored
                .iter()
                .filter(|card| matches!(card, StoredCard::Proposal(_)))
            {
                let remote_id = self.require_remote_id(card)?;
                match proposals.set_boost_space_id(card.local_id(), remote_id) {
                    Ok(_) => patched_proposals += 1,
                    Err(StoreError::NotFound { kind, id }) => log_vanished(kind, id, remote_id),
                    Err(err) => return Err(err.into()),
                }
            }
        }

        Ok((patched_notes, patched_proposals))
    }

    fn require_remote_id<'a>(&self, card: &'a StoredCard) -> Result<&'a str, SyncError> {
        card.boost_space_id().ok_or_else(|| {
            SyncError::Remote(RemoteError::new(
                self.ports.remote.service_id(),
                SyncStage::Push,
                "missing_remote_id",
                format!("pushed {} came back without boostSpaceId", card.kind().as_str()),
                false,
            ))
        })
    }
}

/// A record deleted locally while its push was in flight.
fn log_vanished(kind: &str, id: LocalId, remote_id: &str) {
    warn!(
        "event=sync_patch_back module=sync status=skip reason=local_record_missing kind={kind} local_id={id} remote_id={remote_id}"
    );
}
