//! The signed-in session.
//!
//! A [`Session`] owns the database connection and records who is signed in
//! and which [`Capabilities`] that grants. Operations receive a
//! [`Closet`] handle borrowed from the session, so a role change is just a
//! new descriptor on the same connection.

use std::path::Path;

use closetly_core::{Capabilities, Role, UserAccount};
use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use crate::error::{ClosetError, Result};
use crate::migration::{Migration, tables_exist};
use crate::query::Closet;

pub struct Session {
    conn: Connection,
    account: Option<UserAccount>,
    capabilities: Capabilities,
}

impl Session {
    /// Opens an existing closet database.
    ///
    /// # Errors
    ///
    /// Returns [`ClosetError::DatabaseNotFound`] if the file does not exist
    /// and [`ClosetError::SchemaMissing`] if it has no closet tables.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClosetError::DatabaseNotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::from_connection(conn)
    }

    /// Opens a fresh in-memory database with the schema already created.
    pub fn open_in_memory() -> Result<Self> {
        let mut migration = Migration::new(Connection::open_in_memory()?)?;
        migration.up()?;
        Self::from_connection(migration.into_connection())
    }

    /// Starts a signed-out session on an open connection.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        if !tables_exist(&conn)? {
            return Err(ClosetError::SchemaMissing);
        }
        Ok(Self {
            conn,
            account: None,
            capabilities: Capabilities::LOGIN,
        })
    }

    /// Returns a data-access handle carrying the current capabilities.
    pub fn closet(&self) -> Closet<'_> {
        Closet::new(&self.conn, self.capabilities)
    }

    pub fn account(&self) -> Option<&UserAccount> {
        self.account.as_ref()
    }

    /// Role of the signed-in account, if any.
    pub fn role(&self) -> Option<Role> {
        self.account.as_ref().map(|account| account.role)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Signs in with a username and password.
    ///
    /// On success the session switches to the account's role and the account
    /// is returned. On failure `None` is returned and the session keeps
    /// whatever account and capabilities it had.
    pub fn login(&mut self, username: &str, password: &str) -> Result<Option<&UserAccount>> {
        let closet = self.closet();
        if !closet.authenticate(username, password)? {
            info!(username, "authentication failed");
            return Ok(None);
        }
        let Some(mut account) = closet.account(username)? else {
            warn!(username, "credentials exist without a user record");
            return Ok(None);
        };
        if let Some(role) = closet.get_permission(username)? {
            account.role = role;
        }
        Ok(Some(self.switch_to(account)))
    }

    /// Creates an account and signs in as it.
    pub fn sign_up(
        &mut self,
        name: &str,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<&UserAccount> {
        let account = self
            .closet()
            .register_account(name, username, password, role)?;
        Ok(self.switch_to(account))
    }

    fn switch_to(&mut self, account: UserAccount) -> &UserAccount {
        info!(username = %account.username, role = %account.role, "session role switched");
        self.capabilities = account.role.capabilities();
        self.account.insert(account)
    }

    /// Closes the connection.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| ClosetError::DatabaseError(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use closetly_core::Capability;

    fn with_user(role: Role) -> Session {
        let session = Session::open_in_memory().unwrap();
        session
            .closet()
            .register_account("Ada", "ada", "s3cret", role)
            .unwrap();
        session
    }

    #[test]
    fn test_new_session_is_signed_out() {
        let session = Session::open_in_memory().unwrap();
        assert!(session.account().is_none());
        assert_eq!(session.capabilities(), Capabilities::LOGIN);
    }

    #[test]
    fn test_login_switches_role() {
        for role in Role::ALL {
            let mut session = with_user(role);
            let account = session.login("ada", "s3cret").unwrap().unwrap();
            assert_eq!(account.role, role);
            assert_eq!(session.role(), Some(role));
            assert_eq!(session.capabilities(), role.capabilities());
        }
    }

    #[test]
    fn test_wrong_password_keeps_capabilities() {
        let mut session = with_user(Role::StoreOwner);
        assert!(session.login("ada", "nope").unwrap().is_none());
        assert_eq!(session.capabilities(), Capabilities::LOGIN);
        assert!(session.account().is_none());

        session.login("ada", "s3cret").unwrap().unwrap();
        assert!(session.login("ada", "nope").unwrap().is_none());
        assert_eq!(session.role(), Some(Role::StoreOwner));
        assert!(session.capabilities().allows(Capability::ManageStore));
    }

    #[test]
    fn test_unknown_stored_role_signs_in_as_personal() {
        let mut session = with_user(Role::Admin);
        session
            .connection()
            .execute("UPDATE permissions SET role = 'client' WHERE username = 'ada'", [])
            .unwrap();
        let account = session.login("ada", "s3cret").unwrap().unwrap();
        assert_eq!(account.role, Role::Personal);
    }

    #[test]
    fn test_sign_up_signs_in() {
        let mut session = Session::open_in_memory().unwrap();
        let account = session.sign_up("Bo", "bo", "pw", Role::Stylist).unwrap();
        assert_eq!(account.username, "bo");
        assert_eq!(session.capabilities(), Capabilities::STYLIST);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::open(dir.path().join("absent.db")).err().unwrap();
        assert!(matches!(err, ClosetError::DatabaseNotFound(_)));
    }

    #[test]
    fn test_open_without_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path).unwrap();
        let err = Session::open(&path).err().unwrap();
        assert!(matches!(err, ClosetError::SchemaMissing));
    }
}
