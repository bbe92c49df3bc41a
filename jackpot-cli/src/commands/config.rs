use crate::config::CliConfig;
use anyhow::Result;
use clap::Subcommand;
use jackpot_core::Amount;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the ledger configuration
    Show,
    /// Update the ledger configuration
    Set {
        /// Funding for new accounts, in satoshis
        #[arg(long)]
        initial_funding: Option<u64>,
        /// Default minimum entry for new pools, in satoshis
        #[arg(long)]
        minimum_entry: Option<u64>,
    },
}

pub fn handle_config_command(cmd: ConfigCommands, config: &CliConfig) -> Result<()> {
    let mut ledger_config = config.ledger_config()?;

    match cmd {
        ConfigCommands::Show => {
            println!("Data directory: {}", config.data_dir.display());
            println!(
                "Initial funding: {} sats",
                ledger_config.initial_funding.to_sat()
            );
            println!(
                "Minimum entry: {} sats",
                ledger_config.minimum_entry.to_sat()
            );
        }

        ConfigCommands::Set {
            initial_funding,
            minimum_entry,
        } => {
            if let Some(sats) = initial_funding {
                ledger_config.initial_funding = Amount::from_sat(sats);
            }
            if let Some(sats) = minimum_entry {
                ledger_config.minimum_entry = Amount::from_sat(sats);
            }

            ledger_config.save(&config.data_dir)?;
            println!("Configuration saved");
        }
    }

    Ok(())
}
