use crate::error::{CoreError, Result};
use bitcoin::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 20-byte account identifier, displayed as `0x`-prefixed hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity([u8; 20]);

impl Identity {
    pub const LEN: usize = 20;

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// First four bytes in hex, for table output.
    pub fn short(&self) -> String {
        format!("0x{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed)
            .map_err(|e| CoreError::InvalidIdentity(format!("{}: {}", s, e)))?;
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| {
            CoreError::InvalidIdentity(format!("{}: expected {} bytes", s, Self::LEN))
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Identity {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub identity: Identity,
    pub balance: Amount,
    pub accepts_payments: bool,
    pub created_at: DateTime<Utc>,
}

/// Latest chain metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    pub hash: [u8; 32],
    pub timestamp: DateTime<Utc>,
}

impl BlockInfo {
    pub fn genesis() -> Self {
        Self {
            height: 0,
            hash: [0u8; 32],
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

// SQLite stores integers as i64; amounts above i64::MAX are rejected.
pub fn amount_to_sql(amount: Amount) -> Result<i64> {
    i64::try_from(amount.to_sat())
        .map_err(|_| CoreError::internal(format!("amount {} out of range", amount.to_sat())))
}

pub fn amount_from_sql(value: i64) -> Result<Amount> {
    u64::try_from(value)
        .map(Amount::from_sat)
        .map_err(|_| CoreError::internal(format!("negative amount in storage: {}", value)))
}
