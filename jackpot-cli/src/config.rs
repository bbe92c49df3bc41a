use jackpot_core::{LedgerConfig, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("jackpot"),
            verbose: false,
        }
    }
}

impl CliConfig {
    pub fn from_args(data_dir: Option<PathBuf>, verbose: bool) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: data_dir.unwrap_or(defaults.data_dir),
            verbose,
        }
    }

    pub fn log_filter(&self) -> String {
        let level = if self.verbose { "debug" } else { "info" };
        format!(
            "jackpot_cli={},jackpot_core={},jackpot_pool={}",
            level, level, level
        )
    }

    pub fn ledger_config(&self) -> Result<LedgerConfig> {
        LedgerConfig::load(&self.data_dir)
    }
}
