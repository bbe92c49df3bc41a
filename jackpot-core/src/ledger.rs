use crate::config::LedgerConfig;
use crate::error::{CoreError, Result};
use crate::keys::{generate_mnemonic, mnemonic_to_identity};
use crate::storage::{AccountStore, ChainStore, Storage};
use crate::types::{Account, BlockInfo, Identity};
use bitcoin::Amount;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub const DB_FILE: &str = "jackpot.db";

/// Local execution environment: pre-funded accounts and the chain tip.
pub struct Ledger {
    storage: Arc<Storage>,
    config: LedgerConfig,
    // name -> identity
    identities: Arc<RwLock<HashMap<String, Identity>>>,
}

impl Ledger {
    pub async fn new(data_dir: &Path, config: LedgerConfig) -> Result<Self> {
        config.validate()?;

        let db_path = data_dir.join(DB_FILE);
        let storage = Arc::new(Storage::new(&db_path).await?);

        Ok(Self {
            storage,
            config,
            identities: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Creates a funded account with a fresh mnemonic.
    pub async fn create_account(&self, name: &str) -> Result<(Account, String)> {
        let mnemonic = generate_mnemonic()?;
        let account = self.import_account(name, &mnemonic).await?;
        Ok((account, mnemonic))
    }

    pub async fn import_account(&self, name: &str, mnemonic: &str) -> Result<Account> {
        if name.trim().is_empty() {
            return Err(CoreError::config("Account name cannot be empty"));
        }

        let identity = mnemonic_to_identity(mnemonic)?;

        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;
        {
            let store = AccountStore::new(&tx);
            if store.name_exists(name)? {
                return Err(CoreError::AccountExists(name.to_string()));
            }
            if store.identity_exists(&identity)? {
                return Err(CoreError::AccountExists(identity.to_string()));
            }
        }

        let account = Account {
            name: name.to_string(),
            identity,
            balance: self.config.initial_funding,
            accepts_payments: true,
            created_at: Utc::now(),
        };

        AccountStore::new(&tx).insert_account(&account)?;
        ChainStore::new(&tx).advance(
            account.created_at,
            format!("account:{}:{}", account.name, account.identity).as_bytes(),
        )?;
        tx.commit()?;

        self.identities
            .write()
            .insert(account.name.clone(), account.identity);

        tracing::info!(
            "Created account '{}' ({}) funded with {} sats",
            account.name,
            account.identity,
            account.balance.to_sat()
        );
        Ok(account)
    }

    pub async fn load_account(&self, name: &str) -> Result<Account> {
        let conn = self.storage.get_connection().await;
        let account = AccountStore::new(&conn).load_by_name(name)?;

        self.identities
            .write()
            .insert(account.name.clone(), account.identity);
        Ok(account)
    }

    pub async fn account_by_identity(&self, identity: &Identity) -> Result<Account> {
        let conn = self.storage.get_connection().await;
        AccountStore::new(&conn).load_by_identity(identity)
    }

    /// Resolves an account name to its identity, using the cache when possible.
    pub async fn identity_of(&self, name: &str) -> Result<Identity> {
        if let Some(identity) = self.identities.read().get(name) {
            return Ok(*identity);
        }

        Ok(self.load_account(name).await?.identity)
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.storage.get_connection().await;
        AccountStore::new(&conn).list_accounts()
    }

    pub async fn balance(&self, identity: &Identity) -> Result<Amount> {
        Ok(self.account_by_identity(identity).await?.balance)
    }

    pub async fn set_accepts_payments(&self, name: &str, accepts: bool) -> Result<()> {
        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;

        AccountStore::new(&tx).set_accepts_payments(name, accepts)?;
        ChainStore::new(&tx).advance(
            Utc::now(),
            format!("payable:{}:{}", name, accepts).as_bytes(),
        )?;
        tx.commit()?;

        tracing::info!("Account '{}' accepts payments: {}", name, accepts);
        Ok(())
    }

    pub async fn tip(&self) -> Result<BlockInfo> {
        let conn = self.storage.get_connection().await;
        ChainStore::new(&conn).tip()
    }
}
