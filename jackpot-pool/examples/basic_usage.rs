use jackpot_core::{Amount, LedgerConfig};
use jackpot_pool::open_runtime;
use tempfile::tempdir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Create temp dir
    let temp_dir = tempdir()?;
    println!("Using temporary directory: {:?}", temp_dir.path());

    let runtime = open_runtime(temp_dir.path(), LedgerConfig::default()).await?;
    let ledger = runtime.ledger();

    println!("Creating accounts...");
    let (manager, _) = ledger.create_account("manager").await?;
    let mut players = Vec::new();
    for name in ["alice", "bob", "carol"] {
        let (account, _) = ledger.create_account(name).await?;
        println!("{}: {}", account.name, account.identity);
        players.push(account.identity);
    }

    let pool_id = runtime.deploy(&manager.identity).await?;
    println!("\nDeployed pool {}", pool_id);

    let stake = Amount::from_sat(1_000_000);
    for player in &players {
        runtime.enter(pool_id, player, stake).await?;
    }
    println!("Players: {:?}", runtime.get_players(pool_id).await?);

    let outcome = runtime.pick_winner(pool_id, &manager.identity).await?;
    println!(
        "\nWinner: {} ({} sats)",
        outcome.winner,
        outcome.prize.to_sat()
    );
    println!(
        "Winner balance: {} sats",
        ledger.balance(&outcome.winner).await?.to_sat()
    );
    println!("Players after draw: {:?}", runtime.get_players(pool_id).await?);

    Ok(())
}
