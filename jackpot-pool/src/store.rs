use crate::pool::{LotteryPool, PoolInfo};
use crate::{PoolError, Result};
use chrono::DateTime;
use jackpot_core::types::{amount_from_sql, amount_to_sql};
use jackpot_core::Identity;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

type PoolRow = (String, String, i64, i64, i64);

/// Pool persistence against an open connection or transaction.
pub struct PoolStore<'a> {
    conn: &'a Connection,
}

impl<'a> PoolStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS pools (
                id TEXT PRIMARY KEY,
                manager TEXT NOT NULL,
                minimum_entry INTEGER NOT NULL,
                balance INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS pool_players (
                pool_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                identity TEXT NOT NULL,
                FOREIGN KEY (pool_id) REFERENCES pools(id),
                PRIMARY KEY (pool_id, position)
            )",
            [],
        )?;

        Ok(())
    }

    pub fn insert_pool(&self, pool: &LotteryPool) -> Result<()> {
        self.conn.execute(
            "INSERT INTO pools (id, manager, minimum_entry, balance, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                pool.id().to_string(),
                pool.manager().to_string(),
                amount_to_sql(pool.minimum_entry())?,
                amount_to_sql(pool.balance())?,
                pool.created_at().timestamp(),
            ],
        )?;

        self.write_players(pool)
    }

    /// Writes the mutable part of the pool: balance and players.
    pub fn save_pool(&self, pool: &LotteryPool) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE pools SET balance = ?1 WHERE id = ?2",
            params![amount_to_sql(pool.balance())?, pool.id().to_string()],
        )?;

        if updated == 0 {
            return Err(PoolError::PoolNotFound(pool.id()));
        }

        self.write_players(pool)
    }

    pub fn load_pool(&self, id: Uuid) -> Result<LotteryPool> {
        let row = self
            .conn
            .query_row(
                "SELECT id, manager, minimum_entry, balance, created_at FROM pools WHERE id = ?1",
                params![id.to_string()],
                read_row,
            )
            .optional()?
            .ok_or(PoolError::PoolNotFound(id))?;

        let (_, manager, minimum_entry, balance, created_at) = row;
        LotteryPool::from_parts(
            id,
            manager.parse::<Identity>()?,
            amount_from_sql(minimum_entry)?,
            self.load_players(id)?,
            amount_from_sql(balance)?,
            DateTime::from_timestamp(created_at, 0).ok_or_else(|| {
                PoolError::internal(format!("corrupt pool timestamp: {}", created_at))
            })?,
        )
    }

    pub fn load_players(&self, id: Uuid) -> Result<Vec<Identity>> {
        let mut stmt = self.conn.prepare(
            "SELECT identity FROM pool_players WHERE pool_id = ?1 ORDER BY position",
        )?;

        let rows = stmt.query_map(params![id.to_string()], |row| row.get::<_, String>(0))?;

        let mut players: Vec<Identity> = Vec::new();
        for row in rows {
            players.push(row?.parse()?);
        }

        Ok(players)
    }

    pub fn pool_exists(&self, id: Uuid) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pools WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    pub fn list_pools(&self) -> Result<Vec<PoolInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM pools ORDER BY created_at DESC")?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            let id = row?;
            ids.push(
                Uuid::parse_str(&id)
                    .map_err(|e| PoolError::internal(format!("corrupt pool id {}: {}", id, e)))?,
            );
        }

        ids.into_iter()
            .map(|id| self.load_pool(id).map(|pool| pool.get_info()))
            .collect()
    }

    fn write_players(&self, pool: &LotteryPool) -> Result<()> {
        let pool_id = pool.id().to_string();

        self.conn.execute(
            "DELETE FROM pool_players WHERE pool_id = ?1",
            params![pool_id],
        )?;

        let mut stmt = self.conn.prepare(
            "INSERT INTO pool_players (pool_id, position, identity) VALUES (?1, ?2, ?3)",
        )?;
        for (position, identity) in pool.players().iter().enumerate() {
            stmt.execute(params![pool_id, position as i64, identity.to_string()])?;
        }

        Ok(())
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PoolRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}
