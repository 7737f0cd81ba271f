//! Application context: explicit owner of every store and port.
//!
//! # Responsibility
//! - Build the progression, note and proposal stores over one storage port.
//! - Wire the sync orchestrator to the shared stores and the remote proxy.
//! - Offer a lock-scoped facade so callers never juggle mutexes.
//!
//! # Invariants
//! - Each store is loaded once per context; all mutations go through it.
//! - Facade methods release their lock before returning.

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::growth::progression::{ExpAward, ProgressionState, ProgressionStore};
use crate::model::note::{Note, NoteDraft, NoteId, NotePatch};
use crate::model::proposal::{Proposal, ProposalDraft, ProposalId, ProposalPatch};
use crate::storage::{
    MemoryStorage, SqliteStorage, StorageError, StoragePort, APP_NAMESPACES,
};
use crate::store::{NoteStore, ProposalStore, StoreError, StoreResult};
use crate::sync::{
    Delay, MockBoostSpace, NoDelay, RemoteService, SyncOrchestrator, SyncOutcome, SyncPorts,
    SyncSettings, SyncState, TokioDelay,
};
use crate::util::lock;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

/// Collaborators a context is built from.
#[derive(Clone)]
pub struct ContextPorts {
    pub storage: Arc<dyn StoragePort>,
    pub clock: Arc<dyn Clock>,
    pub remote: Arc<dyn RemoteService>,
    pub delay: Arc<dyn Delay>,
}

/// Failures while opening or tearing down a context.
#[derive(Debug)]
pub enum ContextError {
    Storage(StorageError),
    Store(StoreError),
}

impl Display for ContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "storage unavailable: {err}"),
            Self::Store(err) => write!(f, "store operation failed: {err}"),
        }
    }
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StorageError> for ContextError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<StoreError> for ContextError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub struct AppContext {
    storage: Arc<dyn StoragePort>,
    clock: Arc<dyn Clock>,
    remote: Arc<dyn RemoteService>,
    progression: Arc<Mutex<ProgressionStore>>,
    notes: Arc<Mutex<NoteStore>>,
    proposals: Arc<Mutex<ProposalStore>>,
    sync: SyncOrchestrator,
}

impl AppContext {
    pub fn new(ports: ContextPorts, settings: SyncSettings) -> Self {
        let ContextPorts {
            storage,
            clock,
            remote,
            delay,
        } = ports;

        let progression = Arc::new(Mutex::new(ProgressionStore::load(Arc::clone(&storage))));
        let notes = Arc::new(Mutex::new(NoteStore::load(
            Arc::clone(&storage),
            Arc::clone(&clock),
        )));
        let proposals = Arc::new(Mutex::new(ProposalStore::load(
            Arc::clone(&storage),
            Arc::clone(&clock),
        )));
        let sync = SyncOrchestrator::new(
            Arc::clone(&notes),
            Arc::clone(&proposals),
            SyncPorts {
                remote: Arc::clone(&remote),
                storage: Arc::clone(&storage),
                clock: Arc::clone(&clock),
                delay,
            },
            settings,
        );

        Self {
            storage,
            clock,
            remote,
            progression,
            notes,
            proposals,
            sync,
        }
    }

    /// Opens the SQLite file from `config` with a latency-simulating mock
    /// remote persisted in the same database.
    ///
    /// # Errors
    /// - Returns `ContextError::Storage` when the database cannot be opened
    ///   or migrated.
    pub fn open(config: &AppConfig) -> Result<Self, ContextError> {
        let db_path = config.resolved_db_path();
        let storage: Arc<dyn StoragePort> = Arc::new(SqliteStorage::open(&db_path)?);
        let delay: Arc<dyn Delay> = Arc::new(TokioDelay);
        let remote = MockBoostSpace::new(Arc::clone(&storage), Arc::clone(&delay))
            .with_latency(config.latency_profile())
            .with_seed_examples(config.remote.seed_examples);

        info!(
            "event=context_open module=context status=ok backend=sqlite path={}",
            db_path.display()
        );
        Ok(Self::new(
            ContextPorts {
                storage,
                clock: Arc::new(SystemClock),
                remote: Arc::new(remote),
                delay,
            },
            config.sync_settings(),
        ))
    }

    /// Ephemeral context: memory storage, zero-latency remote, system clock.
    pub fn in_memory() -> Self {
        let storage: Arc<dyn StoragePort> = Arc::new(MemoryStorage::new());
        let delay: Arc<dyn Delay> = Arc::new(NoDelay);
        let remote = MockBoostSpace::new(Arc::clone(&storage), Arc::clone(&delay));
        Self::new(
            ContextPorts {
                storage,
                clock: Arc::new(SystemClock),
                remote: Arc::new(remote),
                delay,
            },
            SyncSettings::default(),
        )
    }

    pub fn storage(&self) -> Arc<dyn StoragePort> {
        Arc::clone(&self.storage)
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn remote(&self) -> Arc<dyn RemoteService> {
        Arc::clone(&self.remote)
    }

    pub fn progression(&self) -> Arc<Mutex<ProgressionStore>> {
        Arc::clone(&self.progression)
    }

    pub fn notes(&self) -> Arc<Mutex<NoteStore>> {
        Arc::clone(&self.notes)
    }

    pub fn proposals(&self) -> Arc<Mutex<ProposalStore>> {
        Arc::clone(&self.proposals)
    }

    pub fn sync(&self) -> &SyncOrchestrator {
        &self.sync
    }

    // Progression

    pub fn add_exp(&self, spirit_id: &str, amount: u64) -> StoreResult<Option<ExpAward>> {
        lock(&self.progression).add_exp(spirit_id, amount)
    }

    pub fn select_profession(&self, profession_id: impl Into<String>) -> StoreResult<()> {
        lock(&self.progression).select_profession(profession_id)
    }

    pub fn clear_profession(&self) -> StoreResult<()> {
        lock(&self.progression).clear_profession()
    }

    pub fn progression_snapshot(&self) -> ProgressionState {
        lock(&self.progression).snapshot()
    }

    pub fn summoner_level(&self) -> u32 {
        lock(&self.progression).summoner_level()
    }

    // Notes

    pub fn add_note(&self, draft: NoteDraft) -> StoreResult<Note> {
        lock(&self.notes).add(draft)
    }

    pub fn update_note(&self, id: NoteId, patch: NotePatch) -> StoreResult<Note> {
        lock(&self.notes).update(id, patch)
    }

    pub fn delete_note(&self, id: NoteId) -> StoreResult<Note> {
        lock(&self.notes).delete(id)
    }

    pub fn notes_snapshot(&self) -> Vec<Note> {
        lock(&self.notes).notes().to_vec()
    }

    // Proposals

    pub fn add_proposal(&self, draft: ProposalDraft) -> StoreResult<Proposal> {
        lock(&self.proposals).add(draft)
    }

    pub fn update_proposal(&self, id: ProposalId, patch: ProposalPatch) -> StoreResult<Proposal> {
        lock(&self.proposals).update(id, patch)
    }

    pub fn delete_proposal(&self, id: ProposalId) -> StoreResult<Proposal> {
        lock(&self.proposals).delete(id)
    }

    pub fn add_resonance(&self, id: ProposalId) -> StoreResult<Proposal> {
        lock(&self.proposals).add_resonance(id)
    }

    pub fn proposals_snapshot(&self) -> Vec<Proposal> {
        lock(&self.proposals).proposals().to_vec()
    }

    // Sync

    pub async fn sync_with_boost_space(&self) -> SyncOutcome {
        self.sync.sync_with_boost_space().await
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    /// Wipes every app namespace and resets the in-memory stores.
    ///
    /// The mock remote's cards are left alone.
    pub fn teardown(&self) -> Result<(), ContextError> {
        lock(&self.progression).reset()?;
        lock(&self.notes).clear()?;
        lock(&self.proposals).clear()?;
        for namespace in APP_NAMESPACES {
            if let Err(err) = self.storage.remove(namespace) {
                warn!(
                    "event=context_teardown module=context status=error namespace={namespace} error={err}"
                );
                return Err(err.into());
            }
        }
        self.sync.reset();
        info!("event=context_teardown module=context status=ok");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::AppContext;
    use crate::model::note::NoteDraft;
    use crate::storage::{NOTES_NAMESPACE, PROGRESSION_NAMESPACE, SYNC_NAMESPACE};
    use crate::sync::SyncStatus;

    #[test]
    fn facade_round_trips_through_shared_stores() {
        let context = AppContext::in_memory();
        let note = context
            .add_note(NoteDraft::new("Ember log", "first spark"))
            .expect("add note");

        let notes = context.notes();
        let guard = notes.lock().expect("notes lock");
        assert_eq!(guard.get(note.id).map(|n| n.title.as_str()), Some("Ember log"));
    }

    #[test]
    fn teardown_clears_persisted_namespaces() {
        let context = AppContext::in_memory();
        context.add_exp("fire", 150).expect("award");
        context
            .add_note(NoteDraft::new("t", "c"))
            .expect("add note");

        context.teardown().expect("teardown");

        let storage = context.storage();
        assert_eq!(storage.get(PROGRESSION_NAMESPACE).expect("get"), None);
        assert_eq!(storage.get(NOTES_NAMESPACE).expect("get"), None);
        assert!(context.notes_snapshot().is_empty());
        assert_eq!(context.summoner_level(), 12);
    }

    #[tokio::test]
    async fn teardown_forgets_previous_sync() {
        let context = AppContext::in_memory();
        context
            .add_note(NoteDraft::new("pushed", ""))
            .expect("add note");
        assert!(context.sync_with_boost_space().await.is_completed());
        assert_eq!(context.sync_state().status, SyncStatus::Success);
        assert!(context.sync_state().last_synced_at.is_some());

        context.teardown().expect("teardown");

        let state = context.sync_state();
        assert_eq!(state.status, SyncStatus::Idle);
        assert!(state.message.is_none());
        assert!(state.last_synced_at.is_none());
        assert_eq!(context.storage().get(SYNC_NAMESPACE).expect("get"), None);

        // A stale auto-reset from the earlier pass leaves the cleared state alone.
        tokio::task::yield_now().await;
        assert_eq!(context.sync_state().status, SyncStatus::Idle);
    }
}
