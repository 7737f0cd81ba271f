//! Bidirectional synchronization with the BoostSpace remote.
//!
//! # Responsibility
//! - Define the remote service contract and its error envelope.
//! - Provide the mock BoostSpace service with injectable latency.
//! - Run push/pull passes and expose their status as a state machine.
//!
//! # Invariants
//! - Push (including local id patch-back) completes before pull starts.
//! - At most one pass is in flight per orchestrator.
//! - Sync failures are reported through status, never propagated.

pub mod latency;
pub mod mock_remote;
pub mod orchestrator;
pub mod remote;
pub mod status;

pub use latency::{Delay, LatencyProfile, NoDelay, TokioDelay};
pub use mock_remote::MockBoostSpace;
pub use orchestrator::{SyncOrchestrator, SyncPorts, SyncSettings};
pub use remote::{RemoteError, RemoteResult, RemoteService, SyncStage};
pub use status::{SyncError, SyncOutcome, SyncReport, SyncState, SyncStatus};
