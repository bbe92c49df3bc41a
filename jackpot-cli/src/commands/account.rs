use anyhow::Result;
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use jackpot_pool::PoolRuntime;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new funded account
    Create {
        /// Account name
        name: String,
    },
    /// Import an account from a mnemonic
    Import {
        /// Account name
        name: String,
        /// BIP-39 mnemonic phrase (quoted)
        mnemonic: String,
    },
    /// List all accounts
    List,
    /// Show account balance
    Balance {
        /// Account name
        name: String,
    },
    /// Allow or refuse incoming payouts
    SetPayable {
        /// Account name
        name: String,
        /// Whether the account accepts payments
        #[arg(action = clap::ArgAction::Set)]
        payable: bool,
    },
}

pub async fn handle_account_command(cmd: AccountCommands, runtime: &PoolRuntime) -> Result<()> {
    let ledger = runtime.ledger();

    match cmd {
        AccountCommands::Create { name } => {
            let (account, mnemonic) = ledger.create_account(&name).await?;

            println!("Account '{}' created", account.name);
            println!("Identity: {}", account.identity);
            println!("Balance: {} sats", account.balance.to_sat());
            println!();
            println!("Mnemonic (keep it safe, it is not stored):");
            println!("{}", mnemonic);
        }

        AccountCommands::Import { name, mnemonic } => {
            let account = ledger.import_account(&name, &mnemonic).await?;

            println!("Account '{}' imported", account.name);
            println!("Identity: {}", account.identity);
            println!("Balance: {} sats", account.balance.to_sat());
        }

        AccountCommands::List => {
            let accounts = ledger.list_accounts().await?;

            if accounts.is_empty() {
                println!("No accounts found. Create one with 'jackpot account create <name>'");
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Name", "Identity", "Balance (sats)", "Payable", "Created"]);

            for account in accounts {
                table.add_row(vec![
                    account.name,
                    account.identity.to_string(),
                    account.balance.to_sat().to_string(),
                    account.accepts_payments.to_string(),
                    account.created_at.format("%Y-%m-%d %H:%M").to_string(),
                ]);
            }

            println!("{}", table);
        }

        AccountCommands::Balance { name } => {
            let account = ledger.load_account(&name).await?;

            println!("Balance for account '{}':", account.name);
            println!(
                "  {} sats ({:.8} BTC)",
                account.balance.to_sat(),
                account.balance.to_btc()
            );
        }

        AccountCommands::SetPayable { name, payable } => {
            ledger.set_accepts_payments(&name, payable).await?;

            if payable {
                println!("Account '{}' now accepts payouts", name);
            } else {
                println!("Account '{}' now refuses payouts", name);
            }
        }
    }

    Ok(())
}
