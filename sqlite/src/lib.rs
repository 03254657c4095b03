//! SQLite storage for the Closetly closet database.
//!
//! This crate owns the relational schema and everything that runs against
//! it: the migration lifecycle, the named database routines (credential
//! checks, borrowing, selling, price recovery), and the capability-scoped
//! catalog queries used by the console client.
//!
//! # Architecture
//!
//! - **`schema`**: `CREATE`/`DROP` statements for the eight closet tables
//! - **`migration`**: Lifecycle operations (up/down/seed/refresh/status)
//! - **`routines`**: Database-side routines with their own atomicity
//! - **`query`**: [`Closet`], the capability-checked data-access handle
//! - **`session`**: [`Session`], the connection plus the signed-in account
//!
//! # Quick start
//!
//! ```
//! use closetly_core::Role;
//! use closetly_sqlite::Session;
//!
//! let mut session = Session::open_in_memory().unwrap();
//! session.sign_up("Ada Lovelace", "ada", "s3cret", Role::Personal).unwrap();
//!
//! let closet = session.closet();
//! assert!(closet.personal_clothes("ada").unwrap().is_empty());
//! ```

mod convert;
mod error;
mod migration;
mod query;
pub mod routines;
mod schema;
mod session;

pub use error::{ClosetError, Result};
pub use migration::{Migration, MigrationStatus, SeedReport};
pub use query::Closet;
pub use schema::{DROP_SQL, SCHEMA_SQL, TABLES};
pub use session::Session;
