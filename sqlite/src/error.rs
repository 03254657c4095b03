//! Error types for closet database operations.
//!
//! Provides a unified error type covering database access, migration,
//! permission checks and input validation failures.

use std::path::PathBuf;

use closetly_core::{Capability, ValidationError};
use thiserror::Error;

/// Errors that can occur during closet database operations.
#[derive(Debug, Error)]
pub enum ClosetError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// The database file does not exist.
    #[error("database does not exist: {}", .0.display())]
    DatabaseNotFound(PathBuf),

    /// The database exists but its tables have not been created.
    #[error("database schema is missing; run `closetly migrate up` first")]
    SchemaMissing,

    /// Migration lifecycle operation failure.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// The session's role does not grant the capability.
    #[error("permission denied: this account cannot {}", describe(.0))]
    PermissionDenied(Capability),

    /// A referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write violated a uniqueness, foreign key or check constraint.
    #[error("rejected by the database: {0}")]
    Constraint(String),

    /// Hashing a new password or reading a stored hash failed.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// Input failed validation before reaching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Error loading a seed fixture.
    #[error("seed error: {0}")]
    SeedError(#[from] closetly_db::ConfigError),
}

impl ClosetError {
    /// Returns `true` for errors the interactive client reports and moves
    /// past; anything else ends the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ClosetError::PermissionDenied(_)
                | ClosetError::NotFound(_)
                | ClosetError::Constraint(_)
                | ClosetError::Validation(_)
        )
    }

    /// Classifies a failed write, turning constraint violations into
    /// [`ClosetError::Constraint`] with `context` attached.
    pub(crate) fn from_write(err: rusqlite::Error, context: &str) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                ClosetError::Constraint(context.to_string())
            }
            _ => ClosetError::DatabaseError(err),
        }
    }
}

fn describe(capability: &Capability) -> &'static str {
    match capability {
        Capability::Authenticate => "sign in",
        Capability::ViewCatalog => "list the catalog",
        Capability::PersonalCloset => "open a personal closet",
        Capability::ViewCollab => "view the collaborative closet",
        Capability::Borrow => "borrow or lend items",
        Capability::BrowseStores => "browse store inventories",
        Capability::StyleOutfits => "style outfits",
        Capability::ManageStore => "manage a store",
    }
}

/// Convenience alias for results with [`ClosetError`].
pub type Result<T> = std::result::Result<T, ClosetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(ClosetError::NotFound("x".into()).is_recoverable());
        assert!(ClosetError::PermissionDenied(Capability::ManageStore).is_recoverable());
        assert!(!ClosetError::SchemaMissing.is_recoverable());
        assert!(!ClosetError::MigrationError("boom".into()).is_recoverable());
    }

    #[test]
    fn test_permission_message_names_the_action() {
        let msg = ClosetError::PermissionDenied(Capability::StyleOutfits).to_string();
        assert_eq!(msg, "permission denied: this account cannot style outfits");
    }

    #[test]
    fn test_constraint_violation_is_classified() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY);").unwrap();
        conn.execute("INSERT INTO t (id) VALUES (1)", []).unwrap();
        let err = conn.execute("INSERT INTO t (id) VALUES (1)", []).unwrap_err();
        let err = ClosetError::from_write(err, "duplicate row");
        assert!(matches!(err, ClosetError::Constraint(ref m) if m == "duplicate row"));
    }
}
