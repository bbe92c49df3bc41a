use crate::error::{CoreError, Result};
use crate::types::{amount_from_sql, amount_to_sql, Account, Identity};
use bitcoin::Amount;
use chrono::DateTime;
use rusqlite::{params, Connection, OptionalExtension};

type AccountRow = (String, String, i64, bool, i64);

const SELECT_ACCOUNT: &str =
    "SELECT identity, name, balance, accepts_payments, created_at FROM accounts";

/// Account queries against an open connection or transaction.
pub struct AccountStore<'a> {
    conn: &'a Connection,
}

impl<'a> AccountStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert_account(&self, account: &Account) -> Result<()> {
        self.conn.execute(
            "INSERT INTO accounts (identity, name, balance, accepts_payments, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.identity.to_string(),
                account.name,
                amount_to_sql(account.balance)?,
                account.accepts_payments,
                account.created_at.timestamp(),
            ],
        )?;

        Ok(())
    }

    pub fn load_by_name(&self, name: &str) -> Result<Account> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE name = ?1", SELECT_ACCOUNT),
                params![name],
                read_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::account_not_found(name))?;

        account_from_row(row)
    }

    pub fn load_by_identity(&self, identity: &Identity) -> Result<Account> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE identity = ?1", SELECT_ACCOUNT),
                params![identity.to_string()],
                read_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::account_not_found(identity.to_string()))?;

        account_from_row(row)
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY created_at, name", SELECT_ACCOUNT))?;

        let rows = stmt.query_map([], read_row)?;

        let mut accounts = Vec::new();
        for row in rows {
            accounts.push(account_from_row(row?)?);
        }

        Ok(accounts)
    }

    pub fn name_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    pub fn identity_exists(&self, identity: &Identity) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE identity = ?1",
            params![identity.to_string()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Incoming payment. Fails if the account refuses payments.
    pub fn credit(&self, identity: &Identity, amount: Amount) -> Result<Amount> {
        let account = self.load_by_identity(identity)?;
        if !account.accepts_payments {
            return Err(CoreError::PaymentRejected(account.name));
        }

        let balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| CoreError::internal("account balance overflow"))?;
        self.write_balance(identity, balance)?;

        Ok(balance)
    }

    pub fn debit(&self, identity: &Identity, amount: Amount) -> Result<Amount> {
        let account = self.load_by_identity(identity)?;
        let balance = account
            .balance
            .checked_sub(amount)
            .ok_or(CoreError::InsufficientFunds {
                need: amount.to_sat(),
                available: account.balance.to_sat(),
            })?;
        self.write_balance(identity, balance)?;

        Ok(balance)
    }

    pub fn set_accepts_payments(&self, name: &str, accepts: bool) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE accounts SET accepts_payments = ?1 WHERE name = ?2",
            params![accepts, name],
        )?;

        if updated == 0 {
            return Err(CoreError::account_not_found(name));
        }

        Ok(())
    }

    fn write_balance(&self, identity: &Identity, balance: Amount) -> Result<()> {
        self.conn.execute(
            "UPDATE accounts SET balance = ?1 WHERE identity = ?2",
            params![amount_to_sql(balance)?, identity.to_string()],
        )?;

        Ok(())
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn account_from_row(row: AccountRow) -> Result<Account> {
    let (identity, name, balance, accepts_payments, created_at) = row;

    Ok(Account {
        identity: identity.parse()?,
        name,
        balance: amount_from_sql(balance)?,
        accepts_payments,
        created_at: DateTime::from_timestamp(created_at, 0).ok_or_else(|| {
            CoreError::internal(format!("corrupt account timestamp: {}", created_at))
        })?,
    })
}
