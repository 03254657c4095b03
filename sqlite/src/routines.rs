//! Database-side routines.
//!
//! Each function here is one named routine of the closet database:
//! credential storage and checking, account rows, role assignment, and the
//! borrow/sell/return mutations whose availability check and update must
//! happen together.
//!
//! Routines that check-then-write open an immediate transaction on the
//! connection they are given, so they must not be called inside another
//! transaction. The plain inserts (`sp_add_user`, `add_to_user`,
//! `user_add_permission`) take any connection, including a transaction.
//!
//! # Example
//!
//! ```
//! use closetly_core::Role;
//! use closetly_sqlite::{Migration, routines};
//! use rusqlite::Connection;
//!
//! let mut migration = Migration::new(Connection::open_in_memory().unwrap()).unwrap();
//! migration.up().unwrap();
//! let conn = migration.connection();
//!
//! routines::user_add_permission(conn, "ada", Role::Personal).unwrap();
//! routines::sp_add_user(conn, "ada", "s3cret").unwrap();
//! routines::add_to_user(conn, "Ada Lovelace", "ada").unwrap();
//!
//! assert!(routines::authenticate(conn, "ada", "s3cret").unwrap());
//! assert!(!routines::authenticate(conn, "ada", "guess").unwrap());
//! ```

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use closetly_core::{Discount, Price, Role, find_original_price as original_price};
use rand::rngs::OsRng;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use tracing::debug;

use crate::error::{ClosetError, Result};

/// Hashes a password with Argon2id and a fresh salt.
///
/// The PHC string returned carries the algorithm, parameters and salt.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ClosetError::PasswordHash(format!("hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC string, using the parameters
/// embedded in it.
fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| ClosetError::PasswordHash(format!("parse stored hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Checks a username/password pair against `user_info`.
///
/// Unknown usernames authenticate as `false`.
pub fn authenticate(conn: &Connection, username: &str, password: &str) -> Result<bool> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT password_hash FROM user_info WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )
        .optional()?;
    match stored {
        Some(hash) => verify_password(password, &hash),
        None => Ok(false),
    }
}

/// Stores an Argon2 hash of the password for a new username.
pub fn sp_add_user(conn: &Connection, username: &str, password: &str) -> Result<()> {
    let hash = hash_password(password)?;
    conn.execute(
        "INSERT INTO user_info (username, password_hash) VALUES (?1, ?2)",
        params![username, hash],
    )
    .map_err(|e| ClosetError::from_write(e, &format!("username '{username}' is taken")))?;
    Ok(())
}

/// Creates the `user` row for a username and returns its new user id.
pub fn add_to_user(conn: &Connection, name: &str, username: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO user (name, username) VALUES (?1, ?2)",
        params![name, username],
    )
    .map_err(|e| ClosetError::from_write(e, &format!("cannot add user '{username}'")))?;
    Ok(conn.last_insert_rowid())
}

/// Records (or replaces) the role of a username.
pub fn user_add_permission(conn: &Connection, username: &str, role: Role) -> Result<()> {
    conn.execute(
        "INSERT INTO permissions (username, role) VALUES (?1, ?2) \
         ON CONFLICT(username) DO UPDATE SET role = excluded.role",
        params![username, role.as_str()],
    )
    .map_err(|e| ClosetError::from_write(e, &format!("cannot set role for '{username}'")))?;
    Ok(())
}

/// Returns the stored role string of a username, if any.
pub fn get_permission(conn: &Connection, username: &str) -> Result<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT role FROM permissions WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )
        .optional()?)
}

/// Lends a collaborative item to `user_id`.
///
/// Succeeds only if the item is in the collaborative closet, currently
/// available, and not lent by the borrower themselves. On `false` nothing
/// was changed.
pub fn borrow_item(conn: &Connection, user_id: i64, clothing_id: i64) -> Result<bool> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let entry: Option<(i64, bool)> = tx
        .query_row(
            "SELECT user_id, is_available FROM collab_closet WHERE clothing_id = ?1",
            params![clothing_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((lender, available)) = entry else {
        debug!(clothing_id, "borrow refused: not in collaborative closet");
        return Ok(false);
    };
    if !available || lender == user_id {
        debug!(clothing_id, user_id, available, "borrow refused");
        return Ok(false);
    }

    tx.execute(
        "UPDATE collab_closet SET is_available = 0, current_borrower = ?1 WHERE clothing_id = ?2",
        params![user_id, clothing_id],
    )?;
    tx.commit()?;
    Ok(true)
}

/// Hands a borrowed item back to the collaborative closet.
///
/// Only the current borrower can return an item; otherwise nothing changes
/// and `false` is returned.
pub fn return_item(conn: &Connection, user_id: i64, clothing_id: i64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE collab_closet SET is_available = 1, current_borrower = NULL \
         WHERE clothing_id = ?1 AND current_borrower = ?2",
        params![clothing_id, user_id],
    )?;
    Ok(updated == 1)
}

/// Puts an item from the lender's personal closet into the collaborative
/// closet and flags it as shared.
///
/// Returns `false` if the lender does not own the item or it is already in
/// the collaborative closet.
pub fn lend_item(
    conn: &Connection,
    user_id: i64,
    clothing_id: i64,
    condition: Option<&str>,
) -> Result<bool> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let shared = tx.execute(
        "UPDATE personal_closet SET shared = 1 \
         WHERE user_id = ?1 AND clothing_id = ?2 \
           AND NOT EXISTS (SELECT 1 FROM collab_closet WHERE clothing_id = ?2)",
        params![user_id, clothing_id],
    )?;
    if shared == 0 {
        return Ok(false);
    }
    tx.execute(
        "INSERT INTO collab_closet (clothing_id, user_id, curr_condition, is_available) \
         VALUES (?1, ?2, ?3, 1)",
        params![clothing_id, user_id, condition],
    )?;
    tx.commit()?;
    Ok(true)
}

/// Sells an item from `store_name`'s inventory to `user_id`.
///
/// The store entry is removed and the item lands in the buyer's personal
/// closet, both in one transaction. Returns `false` (with no change) if the
/// store does not stock the item or the buyer does not exist.
pub fn sell_to_user(
    conn: &Connection,
    store_name: &str,
    clothing_id: i64,
    user_id: i64,
) -> Result<bool> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let buyer_exists: bool = tx.query_row(
        "SELECT EXISTS (SELECT 1 FROM user WHERE user_id = ?1)",
        params![user_id],
        |row| row.get(0),
    )?;
    if !buyer_exists {
        return Ok(false);
    }
    let removed = tx.execute(
        "DELETE FROM store_closet WHERE store_name = ?1 AND clothing_id = ?2",
        params![store_name, clothing_id],
    )?;
    if removed == 0 {
        return Ok(false);
    }
    tx.execute(
        "INSERT INTO personal_closet (user_id, clothing_id) VALUES (?1, ?2)",
        params![user_id, clothing_id],
    )
    .map_err(|e| ClosetError::from_write(e, "buyer already owns this item"))?;
    tx.commit()?;
    Ok(true)
}

/// Recovers the undiscounted price of a store entry.
pub fn find_original_price(price: Price, discount: Discount) -> Result<Price> {
    Ok(original_price(price, discount)?)
}
