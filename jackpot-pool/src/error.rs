use jackpot_core::Identity;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, PoolError>;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Insufficient deposit: minimum {minimum} sats, got {deposited} sats")]
    InsufficientDeposit { minimum: u64, deposited: u64 },

    #[error("Unauthorized: {caller} is not the pool manager")]
    Unauthorized { caller: Identity },

    #[error("No players in the pool")]
    NoPlayers,

    #[error("Payout to {winner} failed: {reason}")]
    PayoutFailed { winner: Identity, reason: String },

    #[error("Pool not found: {0}")]
    PoolNotFound(Uuid),

    #[error("Core error: {0}")]
    Core(#[from] jackpot_core::CoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PoolError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
