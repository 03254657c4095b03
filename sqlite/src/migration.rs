//! Migration lifecycle operations for the closet schema.
//!
//! Provides [`Migration`] for creating, dropping, seeding, and refreshing
//! the tables. All mutation operations use transactions to ensure
//! atomicity.
//!
//! # Example
//!
//! ```no_run
//! use closetly_sqlite::Migration;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("closetly.db").unwrap();
//! let mut migration = Migration::new(conn).unwrap();
//!
//! migration.up().unwrap();
//! migration.seed_file("demos/closet.yaml").unwrap();
//!
//! let status = migration.status().unwrap();
//! assert!(status.tables_exist);
//! ```

use std::collections::HashMap;
use std::path::Path;

use closetly_db::SeedData;
use rusqlite::{Connection, params};
use tracing::info;

use crate::convert::insert_item;
use crate::error::{ClosetError, Result};
use crate::routines;
use crate::schema::{DROP_SQL, SCHEMA_SQL};

/// Manages the lifecycle of the closet tables.
///
/// Provides operations to create tables ([`up`](Self::up)), drop them
/// ([`down`](Self::down)), seed fixtures ([`seed`](Self::seed)), and check
/// the current state ([`status`](Self::status)).
pub struct Migration {
    conn: Connection,
}

impl Migration {
    /// Wraps a connection, enabling foreign key enforcement on it.
    pub fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Creates all tables and indexes.
    ///
    /// Uses `CREATE TABLE IF NOT EXISTS` so it is safe to call multiple times.
    pub fn up(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(SCHEMA_SQL)
            .map_err(|e| ClosetError::MigrationError(format!("failed to create tables: {e}")))?;
        tx.commit()?;
        info!("closet tables created");
        Ok(())
    }

    /// Drops all tables in reverse dependency order.
    pub fn down(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(DROP_SQL)
            .map_err(|e| ClosetError::MigrationError(format!("failed to drop tables: {e}")))?;
        tx.commit()?;
        info!("closet tables dropped");
        Ok(())
    }

    /// Returns whether the tables exist and how many rows each one holds.
    pub fn status(&self) -> Result<MigrationStatus> {
        if !tables_exist(&self.conn)? {
            return Ok(MigrationStatus::default());
        }
        Ok(MigrationStatus {
            tables_exist: true,
            user_count: self.count_rows("user")?,
            clothing_count: self.count_rows("clothes")?,
            personal_count: self.count_rows("personal_closet")?,
            collab_count: self.count_rows("collab_closet")?,
            store_count: self.count_rows("store_closet")?,
            outfit_count: self.count_distinct_outfits()?,
        })
    }

    /// Loads a JSON or YAML fixture and seeds it.
    pub fn seed_file(&mut self, path: impl AsRef<Path>) -> Result<SeedReport> {
        let data = SeedData::from_file(path)?;
        self.seed(&data)
    }

    /// Inserts a fixture within a single transaction.
    ///
    /// Accounts go through the same routines as interactive sign-up, so
    /// their passwords are hashed with Argon2.
    ///
    /// # Errors
    ///
    /// Returns [`ClosetError::SchemaMissing`] if [`up`](Self::up) has not
    /// run, or a database error if any row conflicts with existing data; in
    /// that case nothing from the fixture is kept.
    pub fn seed(&mut self, data: &SeedData) -> Result<SeedReport> {
        if !tables_exist(&self.conn)? {
            return Err(ClosetError::SchemaMissing);
        }
        data.validate()?;

        let tx = self.conn.transaction()?;
        let mut report = SeedReport::default();
        let mut user_ids: HashMap<&str, i64> = HashMap::new();

        for user in &data.users {
            routines::user_add_permission(&tx, &user.username, user.role)?;
            routines::sp_add_user(&tx, &user.username, &user.password)?;
            let user_id = routines::add_to_user(&tx, &user.name, &user.username)?;
            user_ids.insert(user.username.as_str(), user_id);
            report.users_inserted += 1;
        }

        for item in &data.clothes {
            insert_item(&tx, item)
                .map_err(|e| ClosetError::from_write(e, &format!("item {}", item.clothing_id)))?;
            report.clothes_inserted += 1;
        }

        for entry in &data.personal {
            tx.execute(
                "INSERT INTO personal_closet (user_id, clothing_id, is_clean, shared, num_wears) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user_ids[entry.username.as_str()],
                    entry.clothing_id,
                    entry.is_clean,
                    entry.shared,
                    entry.num_wears,
                ],
            )?;
            report.personal_inserted += 1;
        }

        for entry in &data.collab {
            let borrower = entry.borrower.as_deref().map(|b| user_ids[b]);
            tx.execute(
                "INSERT INTO collab_closet (clothing_id, user_id, curr_condition, is_available, current_borrower) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.clothing_id,
                    user_ids[entry.username.as_str()],
                    entry.condition,
                    borrower.is_none(),
                    borrower,
                ],
            )?;
            report.collab_inserted += 1;
        }

        for entry in &data.store {
            tx.execute(
                "INSERT INTO store_closet (store_name, clothing_id, price, discount) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    entry.store_name,
                    entry.clothing_id,
                    entry.price.cents(),
                    entry.discount.percent(),
                ],
            )?;
            report.store_inserted += 1;
        }

        for outfit in &data.outfits {
            for clothing_id in &outfit.clothing_ids {
                tx.execute(
                    "INSERT INTO styled_outfits (outfit_id, clothing_id, outfit_desc, vibe) \
                     VALUES (?1, ?2, ?3, ?4)",
                    params![outfit.outfit_id, clothing_id, outfit.description, outfit.vibe],
                )?;
            }
            report.outfits_inserted += 1;
        }

        tx.commit()?;
        info!(
            users = report.users_inserted,
            clothes = report.clothes_inserted,
            "seed complete"
        );
        Ok(report)
    }

    /// Drops all tables, recreates them, and seeds the fixture at `path`.
    pub fn refresh(&mut self, path: impl AsRef<Path>) -> Result<SeedReport> {
        let data = SeedData::from_file(path)?;
        self.down()?;
        self.up()?;
        self.seed(&data)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the migration and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_distinct_outfits(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT outfit_id) FROM styled_outfits",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Checks whether the credential table exists.
pub(crate) fn tables_exist(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'user_info'",
        [],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Snapshot of the schema state, returned by [`Migration::status`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    pub tables_exist: bool,
    pub user_count: usize,
    pub clothing_count: usize,
    pub personal_count: usize,
    pub collab_count: usize,
    pub store_count: usize,
    /// Distinct outfit ids.
    pub outfit_count: usize,
}

/// Rows inserted by [`Migration::seed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_inserted: usize,
    pub clothes_inserted: usize,
    pub personal_inserted: usize,
    pub collab_inserted: usize,
    pub store_inserted: usize,
    pub outfits_inserted: usize,
}
