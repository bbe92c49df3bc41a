use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use jackpot_core::{Amount, Identity};
use jackpot_pool::PoolRuntime;
use std::collections::HashMap;
use uuid::Uuid;

fn parse_pool_id(pool_id: &str) -> Result<Uuid> {
    Uuid::parse_str(pool_id).with_context(|| format!("Invalid pool ID '{}'", pool_id))
}

/// identity -> account name, for display
async fn account_names(runtime: &PoolRuntime) -> Result<HashMap<Identity, String>> {
    Ok(runtime
        .ledger()
        .list_accounts()
        .await?
        .into_iter()
        .map(|account| (account.identity, account.name))
        .collect())
}

pub async fn deploy(runtime: &PoolRuntime, manager: &str, minimum: Option<u64>) -> Result<()> {
    let manager_id = runtime.ledger().identity_of(manager).await?;

    let pool_id = match minimum {
        Some(sats) => {
            runtime
                .deploy_with_minimum(&manager_id, Amount::from_sat(sats))
                .await?
        }
        None => runtime.deploy(&manager_id).await?,
    };
    let info = runtime.pool_info(pool_id).await?;

    println!("Deployed new pool!");
    println!("Pool ID: {}", pool_id);
    println!("Manager: {} ({})", manager, manager_id);
    println!("Minimum entry: {} sats", info.minimum_entry.to_sat());
    println!();
    println!("Players can now enter with:");
    println!("jackpot enter {} <account> <sats>", pool_id);

    Ok(())
}

pub async fn enter(runtime: &PoolRuntime, pool_id: &str, account: &str, amount: u64) -> Result<()> {
    let pool_id = parse_pool_id(pool_id)?;
    let caller = runtime.ledger().identity_of(account).await?;

    runtime
        .enter(pool_id, &caller, Amount::from_sat(amount))
        .await?;
    let info = runtime.pool_info(pool_id).await?;

    println!("Entered pool {} with {} sats", pool_id, amount);
    println!("Players: {}", info.player_count);
    println!("Pool balance: {} sats", info.balance.to_sat());

    Ok(())
}

pub async fn pick_winner(runtime: &PoolRuntime, pool_id: &str, account: &str) -> Result<()> {
    let pool_id = parse_pool_id(pool_id)?;
    let caller = runtime.ledger().identity_of(account).await?;

    let outcome = runtime.pick_winner(pool_id, &caller).await?;
    let names = account_names(runtime).await?;
    let winner_name = names
        .get(&outcome.winner)
        .map(String::as_str)
        .unwrap_or("unknown");

    println!("------ ROUND COMPLETED! ------");
    println!("Winner: {} ({})", winner_name, outcome.winner);
    println!(
        "Prize: {} sats from {} entries",
        outcome.prize.to_sat(),
        outcome.entries
    );
    println!(
        "Winner balance: {} sats",
        runtime.ledger().balance(&outcome.winner).await?.to_sat()
    );
    println!();
    println!("The pool is open for a new round.");

    Ok(())
}

pub async fn show_players(runtime: &PoolRuntime, pool_id: &str) -> Result<()> {
    let pool_id = parse_pool_id(pool_id)?;
    let players = runtime.get_players(pool_id).await?;

    if players.is_empty() {
        println!("No players in pool {}", pool_id);
        return Ok(());
    }

    let names = account_names(runtime).await?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Account", "Identity"]);

    for (position, player) in players.iter().enumerate() {
        table.add_row(vec![
            (position + 1).to_string(),
            names.get(player).cloned().unwrap_or_else(|| "unknown".to_string()),
            player.to_string(),
        ]);
    }

    println!("{}", table);

    Ok(())
}

pub async fn show_status(runtime: &PoolRuntime, pool_id: &str) -> Result<()> {
    let pool_id = parse_pool_id(pool_id)?;
    let info = runtime.pool_info(pool_id).await?;
    let names = account_names(runtime).await?;
    let tip = runtime.ledger().tip().await?;

    println!("Pool Status: {}", pool_id);
    println!("═══════════════════════════════════");
    println!(
        "Manager: {} ({})",
        names.get(&info.manager).map(String::as_str).unwrap_or("unknown"),
        info.manager
    );
    println!("Minimum entry: {} sats", info.minimum_entry.to_sat());
    println!("Players: {}", info.player_count);
    println!("Balance: {} sats", info.balance.to_sat());
    println!(
        "Deployed: {}",
        info.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Chain tip: #{} {}", tip.height, &tip.hash_hex()[..16]);

    Ok(())
}

pub async fn list_pools(runtime: &PoolRuntime) -> Result<()> {
    let pools = runtime.list_pools().await?;

    if pools.is_empty() {
        println!("No pools deployed.");
        return Ok(());
    }

    let names = account_names(runtime).await?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Pool ID", "Manager", "Players", "Minimum", "Balance"]);

    for info in &pools {
        table.add_row(vec![
            info.id.to_string(),
            names
                .get(&info.manager)
                .cloned()
                .unwrap_or_else(|| info.manager.short()),
            info.player_count.to_string(),
            format!("{} sats", info.minimum_entry.to_sat()),
            format!("{} sats", info.balance.to_sat()),
        ]);
    }

    println!("Pools:");
    println!("{}", table);

    Ok(())
}
