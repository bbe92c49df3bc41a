//! Winner index selection.
//!
//! The pool only asks a [`DrawSeedSource`] for an index into its player
//! list. The default source hashes call-time chain metadata; a stronger
//! source (VRF, oracle) can be plugged in without touching the pool.

use chrono::{DateTime, Utc};
use jackpot_core::{BlockInfo, Identity};
use sha2::{Digest, Sha256};

pub trait DrawSeedSource {
    /// Returns an index in `0..players.len()`. Never called with an empty slice.
    fn draw_index(&mut self, players: &[Identity]) -> usize;
}

/// Call-time metadata the default seed is derived from.
#[derive(Debug, Clone)]
pub struct DrawContext {
    pub block_hash: [u8; 32],
    pub height: u64,
    pub timestamp: DateTime<Utc>,
    pub caller: Identity,
}

impl DrawContext {
    pub fn new(tip: &BlockInfo, timestamp: DateTime<Utc>, caller: Identity) -> Self {
        Self {
            block_hash: tip.hash,
            height: tip.height,
            timestamp,
            caller,
        }
    }
}

/// SHA-256 over block hash, height, timestamp, caller and the player list.
///
/// Not cryptographically unpredictable: whoever controls the timestamp of the
/// draw can grind it. Reproducible for equal inputs.
#[derive(Debug, Clone)]
pub struct HashSeedSource {
    context: DrawContext,
}

impl HashSeedSource {
    pub fn new(context: DrawContext) -> Self {
        Self { context }
    }

    pub fn seed(&self, players: &[Identity]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.context.block_hash);
        hasher.update(self.context.height.to_be_bytes());
        hasher.update(self.context.timestamp.timestamp_millis().to_be_bytes());
        hasher.update(self.context.caller.as_bytes());
        for player in players {
            hasher.update(player.as_bytes());
        }
        hasher.finalize().into()
    }
}

impl DrawSeedSource for HashSeedSource {
    fn draw_index(&mut self, players: &[Identity]) -> usize {
        if players.is_empty() {
            return 0;
        }

        let seed = self.seed(players);
        let mut head = [0u8; 8];
        head.copy_from_slice(&seed[..8]);

        (u64::from_be_bytes(head) % players.len() as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(block: u8, millis: i64) -> DrawContext {
        DrawContext {
            block_hash: [block; 32],
            height: 7,
            timestamp: DateTime::from_timestamp_millis(millis).unwrap(),
            caller: Identity::from_bytes([9; 20]),
        }
    }

    fn players(n: u8) -> Vec<Identity> {
        (0..n).map(|i| Identity::from_bytes([i; 20])).collect()
    }

    #[test]
    fn test_same_inputs_same_index() {
        let players = players(5);
        let mut a = HashSeedSource::new(context(1, 1_700_000_000_000));
        let mut b = HashSeedSource::new(context(1, 1_700_000_000_000));

        assert_eq!(a.draw_index(&players), b.draw_index(&players));
        assert_eq!(a.seed(&players), b.seed(&players));
    }

    #[test]
    fn test_index_always_in_range() {
        for n in 1..=12u8 {
            let players = players(n);
            for millis in 0..50 {
                let mut source = HashSeedSource::new(context(n, millis));
                assert!(source.draw_index(&players) < players.len());
            }
        }
    }

    #[test]
    fn test_seed_depends_on_call_time_metadata() {
        let players = players(3);
        let base = HashSeedSource::new(context(1, 1_000)).seed(&players);

        assert_ne!(base, HashSeedSource::new(context(2, 1_000)).seed(&players));
        assert_ne!(base, HashSeedSource::new(context(1, 1_001)).seed(&players));
    }

    #[test]
    fn test_every_player_can_win() {
        let players = players(3);
        let mut seen = [false; 3];
        for millis in 0..200 {
            let mut source = HashSeedSource::new(context(4, millis));
            seen[source.draw_index(&players)] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }
}
