//! Sync status state machine types.

use crate::store::StoreError;
use crate::sync::remote::RemoteError;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// User-facing message for any failed pass.
pub const SYNC_FAILURE_MESSAGE: &str = "Sync failed. Please try again.";

/// Sync lifecycle: `idle -> connecting -> pushing -> pulling ->
/// (success | error) -> idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    Idle,
    Connecting,
    Pushing,
    Pulling,
    Success,
    Error,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Pushing => "pushing",
            Self::Pulling => "pulling",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// A pass is running; new requests are rejected.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Connecting | Self::Pushing | Self::Pulling)
    }

    /// Waiting for the auto-reset back to idle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// Observable sync state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    pub status: SyncStatus,
    pub message: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl SyncState {
    pub(crate) fn idle(last_synced_at: Option<DateTime<Utc>>) -> Self {
        Self {
            status: SyncStatus::Idle,
            message: None,
            last_synced_at,
        }
    }
}

/// Counts from a completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub pushed_notes: usize,
    pub pushed_proposals: usize,
    pub pulled_notes: usize,
    pub pulled_proposals: usize,
}

impl SyncReport {
    pub fn pushed(&self) -> usize {
        self.pushed_notes + self.pushed_proposals
    }

    pub fn pulled(&self) -> usize {
        self.pulled_notes + self.pulled_proposals
    }

    pub fn message(&self) -> String {
        format!(
            "Synced with BoostSpace: pushed {}, pulled {}.",
            self.pushed(),
            self.pulled()
        )
    }
}

/// Cause of a failed pass. Logged and returned, never raised.
#[derive(Debug)]
pub enum SyncError {
    Remote(RemoteError),
    Store(StoreError),
    TimedOut(Duration),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::TimedOut(limit) => write!(f, "sync timed out after {}ms", limit.as_millis()),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::TimedOut(_) => None,
        }
    }
}

impl From<RemoteError> for SyncError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Result of one `sync_with_boost_space` request.
#[derive(Debug)]
pub enum SyncOutcome {
    Completed(SyncReport),
    Failed(SyncError),
    /// Another pass was in flight; nothing changed.
    Rejected { in_flight: SyncStatus },
}

impl SyncOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}
