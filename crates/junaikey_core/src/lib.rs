//! Core domain logic for JunAiKey.
//! This crate is the single source of truth for progression, content and
//! sync invariants; front-ends only call into it.

pub mod clock;
pub mod config;
pub mod context;
pub mod growth;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod sync;
mod util;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use context::{AppContext, ContextError, ContextPorts};
pub use growth::catalog::{Milestone, ProfessionDef, SpiritDef};
pub use growth::leveling::{exp_to_next_level, LevelProgress};
pub use growth::progression::{
    Avatar, AvatarProgress, ExpAward, ProgressionState, ProgressionStore, Spirit,
};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::card::{CardKind, StoredCard};
pub use model::note::{Note, NoteDraft, NoteId, NotePatch};
pub use model::proposal::{Proposal, ProposalDraft, ProposalId, ProposalPatch};
pub use model::LocalId;
pub use storage::{LoadSource, MemoryStorage, SqliteStorage, StorageError, StoragePort};
pub use store::{NoteStore, ProposalStore, StoreError, StoreResult, UpsertReport};
pub use sync::{
    MockBoostSpace, RemoteError, RemoteService, SyncOrchestrator, SyncOutcome, SyncReport,
    SyncSettings, SyncState, SyncStatus,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_matches_manifest() {
        assert!(!core_version().is_empty());
        assert_eq!(core_version(), env!("CARGO_PKG_VERSION"));
    }
}
