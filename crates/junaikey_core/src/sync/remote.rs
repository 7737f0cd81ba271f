//! Remote card service contract.

use crate::model::card::StoredCard;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sync pass stage a remote call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Connect,
    Push,
    Pull,
}

impl SyncStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Push => "push",
            Self::Pull => "pull",
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Error envelope returned by remote services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub service_id: String,
    pub stage: SyncStage,
    /// Stable machine-readable code, e.g. `network_unavailable`.
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl RemoteError {
    pub fn new(
        service_id: impl Into<String>,
        stage: SyncStage,
        code: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            stage,
            code: code.into(),
            message: message.into(),
            retryable,
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} failed ({}): {}",
            self.service_id,
            self.stage.as_str(),
            self.code,
            self.message
        )
    }
}

impl Error for RemoteError {}

/// Remote store of cards keyed by `boost_space_id`.
#[async_trait]
pub trait RemoteService: Send + Sync {
    fn service_id(&self) -> &str;

    /// Returns every card held remotely.
    async fn get_cards(&self) -> RemoteResult<Vec<StoredCard>>;

    /// Stores `cards`, assigning each a new remote id, and returns them.
    async fn create_or_update_cards(
        &self,
        cards: Vec<StoredCard>,
    ) -> RemoteResult<Vec<StoredCard>>;
}
