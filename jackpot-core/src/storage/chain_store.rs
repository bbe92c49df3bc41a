use crate::error::{CoreError, Result};
use crate::types::BlockInfo;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

pub struct ChainStore<'a> {
    conn: &'a Connection,
}

impl<'a> ChainStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Current tip, or genesis if nothing has been committed yet.
    pub fn tip(&self) -> Result<BlockInfo> {
        let row: Option<(i64, String, i64)> = self
            .conn
            .query_row(
                "SELECT height, hash, timestamp FROM chain WHERE id = 0",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((height, hash, timestamp)) = row else {
            return Ok(BlockInfo::genesis());
        };

        let hash: [u8; 32] = hex::decode(&hash)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| CoreError::internal(format!("corrupt chain hash: {}", hash)))?;

        Ok(BlockInfo {
            height: u64::try_from(height)
                .map_err(|_| CoreError::internal(format!("corrupt chain height: {}", height)))?,
            hash,
            timestamp: DateTime::from_timestamp_millis(timestamp).ok_or_else(|| {
                CoreError::internal(format!("corrupt chain timestamp: {}", timestamp))
            })?,
        })
    }

    /// Appends a block committing `payload` on top of the current tip.
    pub fn advance(&self, timestamp: DateTime<Utc>, payload: &[u8]) -> Result<BlockInfo> {
        let tip = self.tip()?;
        let block = next_block(&tip, timestamp, payload);

        self.conn.execute(
            "INSERT OR REPLACE INTO chain (id, height, hash, timestamp) VALUES (0, ?1, ?2, ?3)",
            params![
                i64::try_from(block.height)
                    .map_err(|_| CoreError::internal("chain height overflow"))?,
                block.hash_hex(),
                block.timestamp.timestamp_millis(),
            ],
        )?;

        tracing::debug!("Chain advanced to {} ({})", block.height, block.hash_hex());
        Ok(block)
    }
}

pub fn next_block(tip: &BlockInfo, timestamp: DateTime<Utc>, payload: &[u8]) -> BlockInfo {
    let height = tip.height + 1;

    let mut hasher = Sha256::new();
    hasher.update(tip.hash);
    hasher.update(height.to_be_bytes());
    hasher.update(timestamp.timestamp_millis().to_be_bytes());
    hasher.update(payload);

    BlockInfo {
        height,
        hash: hasher.finalize().into(),
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_block_is_deterministic() {
        let genesis = BlockInfo::genesis();
        let ts = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();

        let a = next_block(&genesis, ts, b"deploy");
        let b = next_block(&genesis, ts, b"deploy");
        let c = next_block(&genesis, ts, b"enter");

        assert_eq!(a, b);
        assert_eq!(a.height, 1);
        assert_ne!(a.hash, c.hash);
        assert_ne!(a.hash, [0u8; 32]);
    }
}
