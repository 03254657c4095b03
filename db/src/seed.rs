//! Seed fixtures for populating a fresh closet database.
//!
//! A fixture lists accounts, clothing items and closet placements. Closet
//! entries refer to accounts by username so fixtures stay readable; the
//! storage crate resolves usernames to user ids while inserting.
//!
//! # Example YAML
//!
//! ```yaml
//! users:
//!   - { username: ada, name: Ada Lovelace, role: personal, password: pw }
//!   - { username: thrift, name: Thrift Co, role: storeowner, password: pw }
//! clothes:
//!   - { clothing_id: 1, clothing_type: sweater, color: green }
//! personal:
//!   - { username: ada, clothing_id: 1, num_wears: 3 }
//! ```

use std::collections::HashSet;
use std::path::Path;

use closetly_core::{
    ClothingItem, Discount, NewOutfit, Price, Role, validate_outfit_description,
    validate_password, validate_username,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// An account to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    pub password: String,
}

/// A personal closet placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPersonal {
    pub username: String,
    pub clothing_id: i64,
    #[serde(default = "default_true")]
    pub is_clean: bool,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub num_wears: u32,
}

/// A collaborative closet placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedCollab {
    /// The lender.
    pub username: String,
    pub clothing_id: i64,
    #[serde(default)]
    pub condition: Option<String>,
    /// Current borrower, if the item is already out on loan.
    #[serde(default)]
    pub borrower: Option<String>,
}

/// A store inventory placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedStore {
    pub store_name: String,
    pub clothing_id: i64,
    /// Shelf price in cents.
    pub price: Price,
    #[serde(default)]
    pub discount: Discount,
}

fn default_true() -> bool {
    true
}

/// A complete fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub users: Vec<SeedUser>,
    pub clothes: Vec<ClothingItem>,
    pub personal: Vec<SeedPersonal>,
    pub collab: Vec<SeedCollab>,
    pub store: Vec<SeedStore>,
    pub outfits: Vec<NewOutfit>,
}

impl SeedData {
    /// Loads a fixture from a `.json`, `.yaml` or `.yml` file and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for other extensions,
    /// a parse error for malformed content, or
    /// [`ConfigError::InvalidSeed`] if [`validate`](Self::validate) fails.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&raw),
            Some("yaml" | "yml") => Self::from_yaml_str(&raw),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let data: Self = serde_json::from_str(raw)?;
        data.validate()?;
        Ok(data)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let data: Self = serde_yaml::from_str(raw)?;
        data.validate()?;
        Ok(data)
    }

    /// Checks credentials and cross-references.
    ///
    /// Usernames and passwords must satisfy the interactive sign-up rules,
    /// usernames must be unique, closet entries must name declared users and
    /// declared items, and outfit descriptions must fit their limit.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ConfigError::InvalidSeed(msg));

        let mut usernames = HashSet::new();
        for user in &self.users {
            if let Err(e) = validate_username(&user.username) {
                return invalid(format!("user '{}': {e}", user.username));
            }
            if let Err(e) = validate_password(&user.password) {
                return invalid(format!("user '{}': {e}", user.username));
            }
            if !usernames.insert(user.username.as_str()) {
                return invalid(format!("duplicate username '{}'", user.username));
            }
        }

        let mut item_ids = HashSet::new();
        for item in &self.clothes {
            if !item_ids.insert(item.clothing_id) {
                return invalid(format!("duplicate clothing id {}", item.clothing_id));
            }
        }

        let known_user = |name: &str| usernames.contains(name);
        let known_item = |id: i64| item_ids.contains(&id);

        for entry in &self.personal {
            if !known_user(&entry.username) {
                return invalid(format!("personal entry names unknown user '{}'", entry.username));
            }
            if !known_item(entry.clothing_id) {
                return invalid(format!("personal entry names unknown item {}", entry.clothing_id));
            }
        }
        for entry in &self.collab {
            if !known_user(&entry.username) {
                return invalid(format!("collab entry names unknown user '{}'", entry.username));
            }
            if let Some(borrower) = &entry.borrower {
                if !known_user(borrower) {
                    return invalid(format!("collab entry names unknown borrower '{borrower}'"));
                }
                if borrower == &entry.username {
                    return invalid(format!(
                        "item {} cannot be borrowed by its own lender",
                        entry.clothing_id
                    ));
                }
            }
            if !known_item(entry.clothing_id) {
                return invalid(format!("collab entry names unknown item {}", entry.clothing_id));
            }
        }
        for entry in &self.store {
            if !known_item(entry.clothing_id) {
                return invalid(format!("store entry names unknown item {}", entry.clothing_id));
            }
        }
        for outfit in &self.outfits {
            if let Err(e) = validate_outfit_description(&outfit.description) {
                return invalid(format!("outfit {}: {e}", outfit.outfit_id));
            }
            if let Some(id) = outfit.clothing_ids.iter().find(|id| !known_item(**id)) {
                return invalid(format!("outfit {} names unknown item {id}", outfit.outfit_id));
            }
        }

        Ok(())
    }
}
