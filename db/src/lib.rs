//! Configuration and seed fixtures for the Closetly client.
//!
//! # Quick start
//!
//! ```no_run
//! use closetly_db::{ClosetConfig, SeedData};
//!
//! let config = ClosetConfig::load("closetly.yml").unwrap();
//! println!("database: {}", config.database.display());
//!
//! let seed = SeedData::from_file("demos/closet.yaml").unwrap();
//! println!("{} users, {} items", seed.users.len(), seed.clothes.len());
//! ```

mod config;
mod error;
mod seed;

pub use config::{ClosetConfig, DEFAULT_DATABASE};
pub use error::{ConfigError, Result};
pub use seed::{SeedCollab, SeedData, SeedPersonal, SeedStore, SeedUser};
