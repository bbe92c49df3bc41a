use crate::pool::{LotteryPool, PayoutSink, PoolInfo};
use crate::seed::{DrawContext, HashSeedSource};
use crate::store::PoolStore;
use crate::{PoolError, Result};
use chrono::Utc;
use jackpot_core::storage::{AccountStore, ChainStore};
use jackpot_core::{Amount, Identity, Ledger};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Result of a committed draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOutcome {
    pub pool_id: Uuid,
    pub winner: Identity,
    pub prize: Amount,
    pub entries: usize,
}

/// Pays the winner by crediting their ledger account inside the draw's
/// transaction.
struct LedgerPayout<'a> {
    accounts: AccountStore<'a>,
}

impl PayoutSink for LedgerPayout<'_> {
    fn deliver(&mut self, winner: &Identity, amount: Amount) -> jackpot_core::Result<()> {
        self.accounts.credit(winner, amount).map(|_| ())
    }
}

/// Executes pool operations against the ledger.
///
/// Every mutating call runs as one SQLite transaction under the storage lock,
/// so calls are serialized and either commit fully or leave no trace.
pub struct PoolRuntime {
    ledger: Arc<Ledger>,
}

impl PoolRuntime {
    pub async fn new(ledger: Arc<Ledger>) -> Result<Self> {
        {
            let conn = ledger.storage().get_connection().await;
            PoolStore::new(&conn).init_schema()?;
        }

        Ok(Self { ledger })
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Deploys a pool managed by `manager` with the configured minimum entry.
    pub async fn deploy(&self, manager: &Identity) -> Result<Uuid> {
        self.deploy_with_minimum(manager, self.ledger.config().minimum_entry)
            .await
    }

    pub async fn deploy_with_minimum(
        &self,
        manager: &Identity,
        minimum_entry: Amount,
    ) -> Result<Uuid> {
        let pool = LotteryPool::with_minimum_entry(*manager, minimum_entry)?;

        let mut conn = self.ledger.storage().get_connection().await;
        let tx = conn.transaction()?;

        AccountStore::new(&tx).load_by_identity(manager)?;
        PoolStore::new(&tx).insert_pool(&pool)?;
        ChainStore::new(&tx).advance(
            pool.created_at(),
            format!("deploy:{}:{}", pool.id(), manager).as_bytes(),
        )?;
        tx.commit()?;

        tracing::info!(
            "Deployed pool {} managed by {} (minimum entry {} sats)",
            pool.id(),
            manager,
            minimum_entry.to_sat()
        );
        Ok(pool.id())
    }

    /// Moves `value` from the caller's account into the pool and records the
    /// entry.
    pub async fn enter(&self, pool_id: Uuid, caller: &Identity, value: Amount) -> Result<()> {
        let mut conn = self.ledger.storage().get_connection().await;
        let tx = conn.transaction()?;

        let pools = PoolStore::new(&tx);
        let mut pool = pools.load_pool(pool_id)?;

        // Validate before touching funds
        pool.enter(*caller, value)?;
        AccountStore::new(&tx).debit(caller, value)?;
        pools.save_pool(&pool)?;

        ChainStore::new(&tx).advance(
            Utc::now(),
            format!("enter:{}:{}:{}", pool_id, caller, value.to_sat()).as_bytes(),
        )?;
        tx.commit()?;

        tracing::info!(
            "Pool {}: {} entered with {} sats ({} players, {} sats held)",
            pool_id,
            caller,
            value.to_sat(),
            pool.player_count(),
            pool.balance().to_sat()
        );
        Ok(())
    }

    /// Draws a winner and pays out the pool. Only the manager may call this.
    pub async fn pick_winner(&self, pool_id: Uuid, caller: &Identity) -> Result<DrawOutcome> {
        let mut conn = self.ledger.storage().get_connection().await;
        let tx = conn.transaction()?;

        let pools = PoolStore::new(&tx);
        let chain = ChainStore::new(&tx);
        let mut pool = pools.load_pool(pool_id)?;
        let prize = pool.balance();
        let entries = pool.player_count();

        let now = Utc::now();
        let mut seed = HashSeedSource::new(DrawContext::new(&chain.tip()?, now, *caller));
        let mut payout = LedgerPayout {
            accounts: AccountStore::new(&tx),
        };

        let winner = pool.pick_winner(*caller, &mut seed, &mut payout)?;
        pools.save_pool(&pool)?;
        chain.advance(
            now,
            format!("draw:{}:{}:{}", pool_id, winner, prize.to_sat()).as_bytes(),
        )?;
        tx.commit()?;

        tracing::info!(
            "Pool {}: {} won {} sats from {} entries",
            pool_id,
            winner,
            prize.to_sat(),
            entries
        );
        Ok(DrawOutcome {
            pool_id,
            winner,
            prize,
            entries,
        })
    }

    /// Current entries in entry order.
    pub async fn get_players(&self, pool_id: Uuid) -> Result<Vec<Identity>> {
        let conn = self.ledger.storage().get_connection().await;
        let pools = PoolStore::new(&conn);

        if !pools.pool_exists(pool_id)? {
            return Err(PoolError::PoolNotFound(pool_id));
        }

        pools.load_players(pool_id)
    }

    pub async fn pool_info(&self, pool_id: Uuid) -> Result<PoolInfo> {
        let conn = self.ledger.storage().get_connection().await;
        Ok(PoolStore::new(&conn).load_pool(pool_id)?.get_info())
    }

    pub async fn list_pools(&self) -> Result<Vec<PoolInfo>> {
        let conn = self.ledger.storage().get_connection().await;
        PoolStore::new(&conn).list_pools()
    }
}
