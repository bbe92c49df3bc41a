//! Jackpot core - ledger, accounts and storage
//!
//! Provides the local execution environment the lottery pool runs against:
//! pre-funded accounts identified by 20-byte identities, a chain tip that
//! advances with every committed operation, and a single serialized SQLite
//! store shared with the pool runtime.

pub mod config;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod storage;
pub mod types;

pub use config::{LedgerConfig, DEFAULT_MINIMUM_ENTRY};
pub use error::{CoreError, Result};
pub use ledger::Ledger;
pub use types::{Account, BlockInfo, Identity};

pub use ::bitcoin::Amount;
