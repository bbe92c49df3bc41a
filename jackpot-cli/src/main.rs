mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::CliConfig;
use jackpot_core::CoreError;
use jackpot_pool::{open_runtime, PoolError};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jackpot")]
#[command(about = "Pooled-stake lottery: enter with a minimum stake, the manager draws a winner")]
#[command(version)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management commands
    #[command(subcommand)]
    Account(commands::AccountCommands),

    /// Ledger configuration commands
    #[command(subcommand)]
    Config(commands::ConfigCommands),

    /// Deploy a new pool
    Deploy {
        /// Manager account name
        manager: String,
        /// Minimum entry in satoshis (defaults to the configured minimum)
        #[arg(short, long)]
        minimum: Option<u64>,
    },
    /// Enter a pool
    Enter {
        /// Pool ID
        pool_id: String,
        /// Account name
        account: String,
        /// Deposit in satoshis
        amount: u64,
    },
    /// Draw the winner of a pool (manager only)
    PickWinner {
        /// Pool ID
        pool_id: String,
        /// Account name of the caller
        account: String,
    },
    /// List current players of a pool
    Players {
        /// Pool ID
        pool_id: String,
    },
    /// Show pool status
    Status {
        /// Pool ID
        pool_id: String,
    },
    /// List deployed pools
    List,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = CliConfig::from_args(cli.data_dir, cli.verbose);

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_filter()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Ensure data directory exists
    tokio::fs::create_dir_all(&config.data_dir).await?;
    tracing::debug!("Using data directory {}", config.data_dir.display());

    // Config commands work on the file directly, before the ledger is opened
    let command = match cli.command {
        Commands::Config(cmd) => {
            if let Err(e) = commands::handle_config_command(cmd, &config) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            return Ok(());
        }
        command => command,
    };

    let runtime = open_runtime(&config.data_dir, config.ledger_config()?).await?;

    // Execute command
    let result = match command {
        Commands::Account(cmd) => commands::handle_account_command(cmd, &runtime).await,
        Commands::Config(_) => unreachable!("config commands run before the ledger is opened"),
        Commands::Deploy { manager, minimum } => {
            commands::deploy(&runtime, &manager, minimum).await
        }
        Commands::Enter {
            pool_id,
            account,
            amount,
        } => commands::enter(&runtime, &pool_id, &account, amount).await,
        Commands::PickWinner { pool_id, account } => {
            commands::pick_winner(&runtime, &pool_id, &account).await
        }
        Commands::Players { pool_id } => commands::show_players(&runtime, &pool_id).await,
        Commands::Status { pool_id } => commands::show_status(&runtime, &pool_id).await,
        Commands::List => commands::list_pools(&runtime).await,
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }

    Ok(())
}

fn report(e: &anyhow::Error) {
    let core = match e.downcast_ref::<PoolError>() {
        Some(PoolError::InsufficientDeposit { minimum, deposited }) => {
            eprintln!("Error: Deposit too small");
            eprintln!("Minimum: {} sats, Sent: {} sats", minimum, deposited);
            return;
        }
        Some(PoolError::Unauthorized { caller }) => {
            eprintln!("Error: {} is not the manager of this pool", caller);
            return;
        }
        Some(PoolError::NoPlayers) => {
            eprintln!("Error: Nobody has entered this pool yet");
            return;
        }
        Some(PoolError::PayoutFailed { winner, reason }) => {
            eprintln!("Error: Payout to {} failed: {}", winner, reason);
            eprintln!("The round was not drawn; entries are unchanged");
            return;
        }
        Some(PoolError::Core(core)) => Some(core),
        Some(_) => None,
        None => e.downcast_ref::<CoreError>(),
    };

    match core {
        Some(CoreError::AccountNotFound(name)) => {
            eprintln!("Error: Account '{}' not found", name);
            eprintln!("Use 'jackpot account list' to see available accounts");
        }
        Some(CoreError::InsufficientFunds { need, available }) => {
            eprintln!("Error: Insufficient funds");
            eprintln!("Need: {} sats, Available: {} sats", need, available);
        }
        _ => {
            eprintln!("Error: {}", e);
        }
    }
}
