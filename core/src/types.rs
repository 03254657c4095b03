//! Closet data model, roles and capability descriptors.
//!
//! Rows read from the database are mapped into these types by the storage
//! crate. Roles form a closed set; each one resolves to a fixed
//! [`Capabilities`] descriptor that the data-access layer checks before it
//! runs a statement.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::money::{Discount, Price};
use crate::validate::ValidationError;

/// Account tier.
///
/// The stored spelling is the lowercase name (`storeowner` for
/// [`Role::StoreOwner`]). `appadmin` is accepted as an alias of `admin`.
///
/// # Examples
///
/// ```
/// use closetly_core::Role;
///
/// assert_eq!("storeowner".parse::<Role>().unwrap(), Role::StoreOwner);
/// assert_eq!(Role::from_stored("appadmin"), Role::Admin);
/// // Anything unrecognized is treated as a personal account.
/// assert_eq!(Role::from_stored("client"), Role::Personal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owns a personal closet and trades through the collaborative closet.
    #[default]
    Personal,
    /// Browses every closet and styles outfits for anyone.
    Stylist,
    /// Manages one store's inventory; the store name is the username.
    #[serde(rename = "storeowner")]
    StoreOwner,
    /// Reaches every other role's menu.
    #[serde(alias = "appadmin")]
    Admin,
}

impl Role {
    /// Every role, in menu order.
    pub const ALL: [Role; 4] = [Role::Personal, Role::Stylist, Role::StoreOwner, Role::Admin];

    /// Returns the stored spelling of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Personal => "personal",
            Role::Stylist => "stylist",
            Role::StoreOwner => "storeowner",
            Role::Admin => "admin",
        }
    }

    /// Maps a stored role string to a role, falling back to
    /// [`Role::Personal`] for anything unrecognized.
    pub fn from_stored(raw: &str) -> Self {
        raw.parse().unwrap_or(Role::Personal)
    }

    /// Returns the capability descriptor granted to this role.
    pub fn capabilities(self) -> Capabilities {
        match self {
            Role::Personal => Capabilities::PERSONAL,
            Role::Stylist => Capabilities::STYLIST,
            Role::StoreOwner => Capabilities::STORE_OWNER,
            Role::Admin => Capabilities::ADMIN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personal" => Ok(Role::Personal),
            "stylist" => Ok(Role::Stylist),
            "storeowner" => Ok(Role::StoreOwner),
            "admin" | "appadmin" => Ok(Role::Admin),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

/// A single privilege checked by the data-access layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Look up accounts, authenticate and register.
    Authenticate,
    /// List every clothing item.
    ViewCatalog,
    /// Read one's own personal closet.
    PersonalCloset,
    /// Read the collaborative closet.
    ViewCollab,
    /// Borrow, lend and return collaborative items.
    Borrow,
    /// Read and filter store inventories.
    BrowseStores,
    /// Create outfits.
    StyleOutfits,
    /// Add, remove, sell and re-price items in one's own store.
    ManageStore,
}

/// The set of capabilities a session holds.
///
/// # Examples
///
/// ```
/// use closetly_core::{Capabilities, Capability, Role};
///
/// assert!(Capabilities::LOGIN.allows(Capability::Authenticate));
/// assert!(!Capabilities::LOGIN.allows(Capability::ViewCatalog));
/// assert!(Role::StoreOwner.capabilities().allows(Capability::ManageStore));
/// assert!(!Role::Stylist.capabilities().allows(Capability::ManageStore));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    granted: &'static [Capability],
}

impl Capabilities {
    /// Held by a session that has not logged in yet.
    pub const LOGIN: Self = Self {
        granted: &[Capability::Authenticate],
    };

    pub const PERSONAL: Self = Self {
        granted: &[
            Capability::Authenticate,
            Capability::ViewCatalog,
            Capability::PersonalCloset,
            Capability::ViewCollab,
            Capability::Borrow,
            Capability::BrowseStores,
            Capability::StyleOutfits,
        ],
    };

    pub const STYLIST: Self = Self {
        granted: &[
            Capability::Authenticate,
            Capability::ViewCatalog,
            Capability::ViewCollab,
            Capability::BrowseStores,
            Capability::StyleOutfits,
        ],
    };

    pub const STORE_OWNER: Self = Self {
        granted: &[
            Capability::Authenticate,
            Capability::ViewCatalog,
            Capability::BrowseStores,
            Capability::ManageStore,
        ],
    };

    pub const ADMIN: Self = Self {
        granted: &[
            Capability::Authenticate,
            Capability::ViewCatalog,
            Capability::PersonalCloset,
            Capability::ViewCollab,
            Capability::Borrow,
            Capability::BrowseStores,
            Capability::StyleOutfits,
            Capability::ManageStore,
        ],
    };

    /// Returns `true` if `capability` is granted.
    pub fn allows(&self, capability: Capability) -> bool {
        self.granted.contains(&capability)
    }

    /// Returns the granted capabilities.
    pub fn granted(&self) -> &'static [Capability] {
        self.granted
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub role: Role,
}

/// A clothing item as stored in the `clothes` table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClothingItem {
    pub clothing_id: i64,
    pub clothing_type: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub aesthetic: Option<String>,
    /// Set when the item was stocked by a store.
    #[serde(default)]
    pub store_name: Option<String>,
}

impl ClothingItem {
    pub fn new(clothing_id: i64, clothing_type: impl Into<String>) -> Self {
        Self {
            clothing_id,
            clothing_type: clothing_type.into(),
            ..Self::default()
        }
    }
}

/// An item in someone's personal closet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalClosetEntry {
    pub item: ClothingItem,
    pub is_clean: bool,
    pub shared: bool,
    pub num_wears: u32,
}

/// An item lent into the collaborative closet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollabClosetEntry {
    /// The lender.
    pub user_id: i64,
    pub item: ClothingItem,
    pub curr_condition: Option<String>,
    pub is_available: bool,
    pub current_borrower: Option<i64>,
}

/// An item for sale in a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreClosetEntry {
    pub store_name: String,
    pub item: ClothingItem,
    pub price: Price,
    pub discount: Discount,
}

/// One row of the outfit relation: an outfit id paired with one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitRow {
    pub outfit_id: i64,
    pub clothing_id: i64,
    pub outfit_desc: Option<String>,
    pub vibe: Option<String>,
}

/// An outfit to be created from a list of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOutfit {
    pub outfit_id: i64,
    pub clothing_ids: Vec<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vibe: String,
}
