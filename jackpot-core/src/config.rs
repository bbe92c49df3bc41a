use crate::error::{CoreError, Result};
use bitcoin::Amount;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "config.json";

/// 0.01 units of native value.
pub const DEFAULT_MINIMUM_ENTRY: Amount = Amount::from_sat(1_000_000);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Credited to every newly created or imported account.
    pub initial_funding: Amount,
    /// Minimum entry for pools deployed without an explicit minimum.
    pub minimum_entry: Amount,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_funding: Amount::from_int_btc(100),
            minimum_entry: DEFAULT_MINIMUM_ENTRY,
        }
    }
}

impl LedgerConfig {
    /// Reads `config.json` from the data directory, falling back to defaults
    /// when the file is absent.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        self.validate()?;
        std::fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(data_dir.join(CONFIG_FILE), content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.minimum_entry == Amount::ZERO {
            return Err(CoreError::config("Minimum entry must be greater than 0"));
        }

        if i64::try_from(self.initial_funding.to_sat()).is_err() {
            return Err(CoreError::config("Initial funding is too large"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_matches_reference_minimum() {
        let config = LedgerConfig::default();
        assert_eq!(config.minimum_entry.to_sat(), 1_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = LedgerConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.minimum_entry, DEFAULT_MINIMUM_ENTRY);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let config = LedgerConfig {
            initial_funding: Amount::from_sat(5_000),
            minimum_entry: Amount::from_sat(10),
        };
        config.save(temp_dir.path()).unwrap();

        let loaded = LedgerConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.initial_funding, Amount::from_sat(5_000));
        assert_eq!(loaded.minimum_entry, Amount::from_sat(10));
    }

    #[test]
    fn test_zero_minimum_rejected() {
        let config = LedgerConfig {
            minimum_entry: Amount::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
