pub mod account;
pub mod config;
pub mod pool;

pub use account::{handle_account_command, AccountCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use pool::{deploy, enter, list_pools, pick_winner, show_players, show_status};
