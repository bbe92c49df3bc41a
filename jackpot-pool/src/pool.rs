use crate::seed::DrawSeedSource;
use crate::{PoolError, Result};
use chrono::{DateTime, Utc};
use jackpot_core::{Amount, CoreError, Identity, DEFAULT_MINIMUM_ENTRY};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivers the prize of a draw to the winner.
pub trait PayoutSink {
    fn deliver(&mut self, winner: &Identity, amount: Amount) -> jackpot_core::Result<()>;
}

/// Pooled-stake lottery state.
///
/// Invariant: `players` is empty exactly when `balance` is zero.
#[derive(Debug, Clone)]
pub struct LotteryPool {
    id: Uuid,
    manager: Identity,
    minimum_entry: Amount,
    players: Vec<Identity>,
    balance: Amount,
    created_at: DateTime<Utc>,
}

impl LotteryPool {
    pub fn new(manager: Identity) -> Self {
        Self {
            id: Uuid::new_v4(),
            manager,
            minimum_entry: DEFAULT_MINIMUM_ENTRY,
            players: Vec::new(),
            balance: Amount::ZERO,
            created_at: Utc::now(),
        }
    }

    /// A zero minimum is rejected: a free entry would leave a player in an
    /// empty-balance pool.
    pub fn with_minimum_entry(manager: Identity, minimum_entry: Amount) -> Result<Self> {
        if minimum_entry == Amount::ZERO {
            return Err(CoreError::config("Minimum entry must be greater than 0").into());
        }

        Ok(Self {
            minimum_entry,
            ..Self::new(manager)
        })
    }

    /// Rebuilds a pool from persisted fields.
    pub(crate) fn from_parts(
        id: Uuid,
        manager: Identity,
        minimum_entry: Amount,
        players: Vec<Identity>,
        balance: Amount,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if players.is_empty() != (balance == Amount::ZERO) {
            return Err(PoolError::internal(format!(
                "pool {} has {} players but holds {} sats",
                id,
                players.len(),
                balance.to_sat()
            )));
        }

        Ok(Self {
            id,
            manager,
            minimum_entry,
            players,
            balance,
            created_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn manager(&self) -> Identity {
        self.manager
    }

    pub fn minimum_entry(&self) -> Amount {
        self.minimum_entry
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn players(&self) -> &[Identity] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Records an entry. On error nothing changes and the deposit must be
    /// handed back to the caller untouched.
    pub fn enter(&mut self, caller: Identity, deposited: Amount) -> Result<()> {
        if deposited < self.minimum_entry {
            return Err(PoolError::InsufficientDeposit {
                minimum: self.minimum_entry.to_sat(),
                deposited: deposited.to_sat(),
            });
        }

        let balance = self
            .balance
            .checked_add(deposited)
            .ok_or_else(|| PoolError::internal("pool balance overflow"))?;

        self.players.push(caller);
        self.balance = balance;

        tracing::debug!(
            "Pool {}: staged entry from {} for {} sats ({} players, {} sats held)",
            self.id,
            caller,
            deposited.to_sat(),
            self.players.len(),
            self.balance.to_sat()
        );
        Ok(())
    }

    /// Draws a winner, pays out the whole balance and opens a new round.
    ///
    /// The round is cleared before the payout is attempted. If delivery fails
    /// the previous round is put back as it was.
    pub fn pick_winner(
        &mut self,
        caller: Identity,
        seed: &mut dyn DrawSeedSource,
        payout: &mut dyn PayoutSink,
    ) -> Result<Identity> {
        if caller != self.manager {
            return Err(PoolError::Unauthorized { caller });
        }

        if self.players.is_empty() {
            return Err(PoolError::NoPlayers);
        }

        let index = seed.draw_index(&self.players);
        let winner = *self.players.get(index).ok_or_else(|| {
            PoolError::internal(format!(
                "seed source returned index {} for {} players",
                index,
                self.players.len()
            ))
        })?;

        let players = std::mem::take(&mut self.players);
        let prize = std::mem::replace(&mut self.balance, Amount::ZERO);

        if let Err(e) = payout.deliver(&winner, prize) {
            self.players = players;
            self.balance = prize;

            tracing::warn!("Pool {}: payout to {} failed: {}", self.id, winner, e);
            return Err(PoolError::PayoutFailed {
                winner,
                reason: e.to_string(),
            });
        }

        tracing::debug!(
            "Pool {}: drew {} for {} sats from {} entries",
            self.id,
            winner,
            prize.to_sat(),
            players.len()
        );
        Ok(winner)
    }

    pub fn get_info(&self) -> PoolInfo {
        PoolInfo {
            id: self.id,
            manager: self.manager,
            minimum_entry: self.minimum_entry,
            balance: self.balance,
            player_count: self.players.len(),
            created_at: self.created_at,
        }
    }
}

/// Pool summary for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolInfo {
    pub id: Uuid,
    pub manager: Identity,
    pub minimum_entry: Amount,
    pub balance: Amount,
    pub player_count: usize,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MIN: Amount = DEFAULT_MINIMUM_ENTRY;

    fn id(byte: u8) -> Identity {
        Identity::from_bytes([byte; 20])
    }

    struct FixedIndex(usize);

    impl DrawSeedSource for FixedIndex {
        fn draw_index(&mut self, _players: &[Identity]) -> usize {
            self.0
        }
    }

    #[derive(Default)]
    struct Balances {
        credited: HashMap<Identity, Amount>,
        refuse: bool,
    }

    impl PayoutSink for Balances {
        fn deliver(&mut self, winner: &Identity, amount: Amount) -> jackpot_core::Result<()> {
            if self.refuse {
                return Err(CoreError::PaymentRejected(winner.to_string()));
            }
            *self.credited.entry(*winner).or_insert(Amount::ZERO) += amount;
            Ok(())
        }
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool = LotteryPool::new(id(0));
        assert_eq!(pool.manager(), id(0));
        assert!(pool.players().is_empty());
        assert_eq!(pool.balance(), Amount::ZERO);
        assert_eq!(pool.minimum_entry(), MIN);
    }

    #[test]
    fn test_entries_keep_order_and_duplicates() {
        let mut pool = LotteryPool::new(id(0));
        pool.enter(id(1), MIN).unwrap();
        pool.enter(id(2), MIN * 2).unwrap();
        pool.enter(id(1), MIN).unwrap();

        assert_eq!(pool.players(), &[id(1), id(2), id(1)]);
        assert_eq!(pool.balance(), MIN * 4);
    }

    #[test]
    fn test_deposit_below_minimum_rejected() {
        let mut pool = LotteryPool::new(id(0));
        pool.enter(id(1), MIN).unwrap();

        let err = pool.enter(id(2), Amount::from_sat(100_000)).unwrap_err();
        assert!(matches!(
            err,
            PoolError::InsufficientDeposit {
                minimum: 1_000_000,
                deposited: 100_000
            }
        ));
        assert_eq!(pool.players(), &[id(1)]);
        assert_eq!(pool.balance(), MIN);
    }

    #[test]
    fn test_custom_minimum() {
        let mut pool = LotteryPool::with_minimum_entry(id(0), Amount::from_sat(10)).unwrap();
        pool.enter(id(1), Amount::from_sat(10)).unwrap();
        assert!(pool.enter(id(1), Amount::from_sat(9)).is_err());
        assert!(LotteryPool::with_minimum_entry(id(0), Amount::ZERO).is_err());
    }

    #[test]
    fn test_only_manager_can_draw() {
        let mut pool = LotteryPool::new(id(0));
        pool.enter(id(1), MIN).unwrap();

        let mut sink = Balances::default();
        let err = pool
            .pick_winner(id(1), &mut FixedIndex(0), &mut sink)
            .unwrap_err();
        assert!(matches!(err, PoolError::Unauthorized { caller } if caller == id(1)));
        assert_eq!(pool.players(), &[id(1)]);
        assert!(sink.credited.is_empty());
    }

    #[test]
    fn test_draw_on_empty_pool() {
        let mut pool = LotteryPool::new(id(0));
        let err = pool
            .pick_winner(id(0), &mut FixedIndex(0), &mut Balances::default())
            .unwrap_err();
        assert!(matches!(err, PoolError::NoPlayers));
    }

    #[test]
    fn test_draw_pays_whole_balance_and_resets() {
        let mut pool = LotteryPool::new(id(0));
        for player in 1..=3 {
            pool.enter(id(player), MIN).unwrap();
        }

        let mut sink = Balances::default();
        let winner = pool
            .pick_winner(id(0), &mut FixedIndex(1), &mut sink)
            .unwrap();

        assert_eq!(winner, id(2));
        assert_eq!(sink.credited[&id(2)], MIN * 3);
        assert!(pool.players().is_empty());
        assert_eq!(pool.balance(), Amount::ZERO);
    }

    #[test]
    fn test_failed_payout_restores_round() {
        let mut pool = LotteryPool::new(id(0));
        pool.enter(id(1), MIN).unwrap();
        pool.enter(id(2), MIN).unwrap();

        let mut sink = Balances {
            refuse: true,
            ..Default::default()
        };
        let err = pool
            .pick_winner(id(0), &mut FixedIndex(0), &mut sink)
            .unwrap_err();

        assert!(matches!(err, PoolError::PayoutFailed { winner, .. } if winner == id(1)));
        assert_eq!(pool.players(), &[id(1), id(2)]);
        assert_eq!(pool.balance(), MIN * 2);

        sink.refuse = false;
        pool.pick_winner(id(0), &mut FixedIndex(0), &mut sink).unwrap();
        assert_eq!(sink.credited[&id(1)], MIN * 2);
    }

    #[test]
    fn test_out_of_range_index_changes_nothing() {
        let mut pool = LotteryPool::new(id(0));
        pool.enter(id(1), MIN).unwrap();

        let mut sink = Balances::default();
        let err = pool
            .pick_winner(id(0), &mut FixedIndex(5), &mut sink)
            .unwrap_err();
        assert!(matches!(err, PoolError::Internal(_)));
        assert_eq!(pool.players(), &[id(1)]);
        assert!(sink.credited.is_empty());
    }

    #[test]
    fn test_next_round_only_counts_new_entries() {
        let mut pool = LotteryPool::new(id(0));
        pool.enter(id(1), MIN * 5).unwrap();
        pool.pick_winner(id(0), &mut FixedIndex(0), &mut Balances::default())
            .unwrap();

        pool.enter(id(2), MIN).unwrap();
        assert_eq!(pool.players(), &[id(2)]);
        assert_eq!(pool.balance(), MIN);
    }

    #[test]
    fn test_from_parts_checks_invariant() {
        let now = Utc::now();
        assert!(
            LotteryPool::from_parts(Uuid::new_v4(), id(0), MIN, vec![], MIN, now).is_err()
        );
        assert!(LotteryPool::from_parts(
            Uuid::new_v4(),
            id(0),
            MIN,
            vec![id(1)],
            Amount::ZERO,
            now
        )
        .is_err());
        assert!(
            LotteryPool::from_parts(Uuid::new_v4(), id(0), MIN, vec![id(1)], MIN, now).is_ok()
        );
    }
}
