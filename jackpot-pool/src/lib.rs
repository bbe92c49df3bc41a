//! Pooled-stake lottery
//!
//! Participants deposit at least a minimum amount into a shared pool; the
//! pool's manager draws one entry pseudo-randomly, the whole balance goes to
//! that player and a new round starts.

pub mod error;
pub mod pool;
pub mod runtime;
pub mod seed;
pub mod store;

pub use error::{PoolError, Result};
pub use pool::{LotteryPool, PayoutSink, PoolInfo};
pub use runtime::{DrawOutcome, PoolRuntime};
pub use seed::{DrawContext, DrawSeedSource, HashSeedSource};

use jackpot_core::{Ledger, LedgerConfig};
use std::path::Path;
use std::sync::Arc;

/// Opens the ledger in `data_dir` and a pool runtime on top of it.
pub async fn open_runtime(data_dir: &Path, config: LedgerConfig) -> Result<PoolRuntime> {
    let ledger = Ledger::new(data_dir, config).await?;
    PoolRuntime::new(Arc::new(ledger)).await
}
