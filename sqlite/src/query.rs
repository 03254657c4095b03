//! Capability-scoped catalog access.
//!
//! [`Closet`] wraps a borrowed connection together with the session's
//! [`Capabilities`]. Every method checks the capability it needs before
//! running a statement, and every value that came from the console is bound
//! as a parameter.
//!
//! # Example
//!
//! ```
//! use closetly_core::{Capabilities, Role};
//! use closetly_sqlite::{Closet, Migration};
//! use rusqlite::Connection;
//!
//! let mut migration = Migration::new(Connection::open_in_memory().unwrap()).unwrap();
//! migration.up().unwrap();
//! let conn = migration.connection();
//!
//! let login = Closet::new(conn, Capabilities::LOGIN);
//! assert!(!login.check_username("ada").unwrap());
//! // Not signed in yet, so the catalog is out of reach.
//! assert!(login.all_clothes().is_err());
//!
//! let personal = Closet::new(conn, Role::Personal.capabilities());
//! assert!(personal.all_clothes().unwrap().is_empty());
//! ```

use closetly_core::{
    Capabilities, Capability, ClothingItem, CollabClosetEntry, Discount, NewOutfit, OutfitRow,
    PersonalClosetEntry, Price, Role, StoreClosetEntry, UserAccount, ValidationError,
    discounted_price, validate_outfit_description, validate_password, validate_username,
};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use tracing::{debug, info};

use crate::convert::{self, ITEM_COLUMNS};
use crate::error::{ClosetError, Result};
use crate::routines;

/// Store listing columns: `store_name, price, discount, ITEM_COLUMNS`.
fn store_select() -> String {
    format!(
        "SELECT s.store_name, s.price, s.discount, {ITEM_COLUMNS} \
         FROM store_closet s JOIN clothes c ON c.clothing_id = s.clothing_id"
    )
}

fn collab_select() -> String {
    format!(
        "SELECT k.user_id, {ITEM_COLUMNS}, k.curr_condition, k.is_available, k.current_borrower \
         FROM collab_closet k JOIN clothes c ON c.clothing_id = k.clothing_id"
    )
}

/// Data-access handle scoped to a set of capabilities.
#[derive(Clone, Copy)]
pub struct Closet<'a> {
    conn: &'a Connection,
    capabilities: Capabilities,
}

impl<'a> Closet<'a> {
    pub fn new(conn: &'a Connection, capabilities: Capabilities) -> Self {
        Self { conn, capabilities }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn require(&self, capability: Capability) -> Result<()> {
        if self.capabilities.allows(capability) {
            Ok(())
        } else {
            debug!(?capability, "capability check failed");
            Err(ClosetError::PermissionDenied(capability))
        }
    }

    fn collect<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    /// Returns `true` if an account with this username exists.
    pub fn check_username(&self, username: &str) -> Result<bool> {
        self.require(Capability::Authenticate)?;
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM user_info WHERE username = ?1)",
            params![username],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Verifies a password for a username.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        self.require(Capability::Authenticate)?;
        routines::authenticate(self.conn, username, password)
    }

    /// Looks up the stored role of a username, resolving unknown spellings
    /// to [`Role::Personal`].
    pub fn get_permission(&self, username: &str) -> Result<Option<Role>> {
        self.require(Capability::Authenticate)?;
        Ok(routines::get_permission(self.conn, username)?.map(|raw| Role::from_stored(&raw)))
    }

    /// Loads the full account record for a username.
    pub fn account(&self, username: &str) -> Result<Option<UserAccount>> {
        self.require(Capability::Authenticate)?;
        convert::load_account(self.conn, username)
    }

    pub fn lookup_user_id(&self, username: &str) -> Result<Option<i64>> {
        Ok(self.account(username)?.map(|account| account.user_id))
    }

    /// Creates a new account.
    ///
    /// Username and password limits are checked before anything is written.
    /// The role, credentials and user row are then written in that order
    /// inside one transaction.
    pub fn register_account(
        &self,
        name: &str,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<UserAccount> {
        self.require(Capability::Authenticate)?;
        validate_username(username)?;
        validate_password(password)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        routines::user_add_permission(&tx, username, role)?;
        routines::sp_add_user(&tx, username, password)?;
        let user_id = routines::add_to_user(&tx, name, username)?;
        tx.commit()?;

        info!(username, %role, "account created");
        Ok(UserAccount {
            user_id,
            username: username.to_string(),
            name: name.to_string(),
            role,
        })
    }

    // -----------------------------------------------------------------------
    // Catalog and personal closet
    // -----------------------------------------------------------------------

    /// Every clothing item in every closet.
    pub fn all_clothes(&self) -> Result<Vec<ClothingItem>> {
        self.require(Capability::ViewCatalog)?;
        self.collect(
            &format!("SELECT {ITEM_COLUMNS} FROM clothes c ORDER BY c.clothing_id"),
            [],
            |row| convert::item_from_row(row, 0),
        )
    }

    pub fn item_exists(&self, clothing_id: i64) -> Result<bool> {
        self.require(Capability::ViewCatalog)?;
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM clothes WHERE clothing_id = ?1)",
            params![clothing_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Items in `username`'s personal closet.
    pub fn personal_clothes(&self, username: &str) -> Result<Vec<PersonalClosetEntry>> {
        self.require(Capability::PersonalCloset)?;
        self.collect(
            &format!(
                "SELECT {ITEM_COLUMNS}, p.is_clean, p.shared, p.num_wears \
                 FROM personal_closet p \
                 JOIN clothes c ON c.clothing_id = p.clothing_id \
                 JOIN user u ON u.user_id = p.user_id \
                 WHERE u.username = ?1 ORDER BY c.clothing_id"
            ),
            params![username],
            convert::personal_from_row,
        )
    }

    // -----------------------------------------------------------------------
    // Collaborative closet
    // -----------------------------------------------------------------------

    /// Every item in the collaborative closet.
    pub fn collab_clothes(&self) -> Result<Vec<CollabClosetEntry>> {
        self.require(Capability::ViewCollab)?;
        self.collect(
            &format!("{} ORDER BY k.user_id, c.clothing_id", collab_select()),
            [],
            convert::collab_from_row,
        )
    }

    /// Items one lender has put in the collaborative closet.
    pub fn user_collab_clothes(&self, user_id: i64) -> Result<Vec<CollabClosetEntry>> {
        self.require(Capability::ViewCollab)?;
        self.collect(
            &format!("{} WHERE k.user_id = ?1 ORDER BY c.clothing_id", collab_select()),
            params![user_id],
            convert::collab_from_row,
        )
    }

    /// Borrows a collaborative item; `false` means nothing changed.
    pub fn borrow(&self, user_id: i64, clothing_id: i64) -> Result<bool> {
        self.require(Capability::Borrow)?;
        routines::borrow_item(self.conn, user_id, clothing_id)
    }

    /// Returns a borrowed item; `false` means nothing changed.
    pub fn return_item(&self, user_id: i64, clothing_id: i64) -> Result<bool> {
        self.require(Capability::Borrow)?;
        routines::return_item(self.conn, user_id, clothing_id)
    }

    /// Lends an owned item into the collaborative closet.
    pub fn lend(&self, user_id: i64, clothing_id: i64, condition: Option<&str>) -> Result<bool> {
        self.require(Capability::Borrow)?;
        routines::lend_item(self.conn, user_id, clothing_id, condition)
    }

    // -----------------------------------------------------------------------
    // Stores
    // -----------------------------------------------------------------------

    /// Every item `store_name` is selling.
    pub fn store_inventory(&self, store_name: &str) -> Result<Vec<StoreClosetEntry>> {
        self.require(Capability::BrowseStores)?;
        self.collect(
            &format!("{} WHERE s.store_name = ?1 ORDER BY c.clothing_id", store_select()),
            params![store_name],
            convert::store_from_row,
        )
    }

    /// Store items priced within `[min, max]`, cheapest first.
    pub fn filter_store_by_price(
        &self,
        store_name: &str,
        min: Price,
        max: Price,
    ) -> Result<Vec<StoreClosetEntry>> {
        self.require(Capability::BrowseStores)?;
        if min > max {
            return Err(ValidationError::InvalidPriceRange {
                min: min.to_string(),
                max: max.to_string(),
            }
            .into());
        }
        self.collect(
            &format!(
                "{} WHERE s.store_name = ?1 AND s.price BETWEEN ?2 AND ?3 \
                 ORDER BY s.price, c.clothing_id",
                store_select()
            ),
            params![store_name, min.cents(), max.cents()],
            convert::store_from_row,
        )
    }

    /// Store items of one clothing type, matched case-insensitively.
    pub fn filter_store_by_type(
        &self,
        store_name: &str,
        clothing_type: &str,
    ) -> Result<Vec<StoreClosetEntry>> {
        self.require(Capability::BrowseStores)?;
        self.collect(
            &format!(
                "{} WHERE s.store_name = ?1 AND c.clothing_type = ?2 COLLATE NOCASE \
                 ORDER BY c.clothing_id",
                store_select()
            ),
            params![store_name, clothing_type.trim()],
            convert::store_from_row,
        )
    }

    /// Store items discounted within `[min, max]`, smallest discount first.
    pub fn filter_store_by_discount(
        &self,
        store_name: &str,
        min: Discount,
        max: Discount,
    ) -> Result<Vec<StoreClosetEntry>> {
        self.require(Capability::BrowseStores)?;
        if min > max {
            return Err(ValidationError::InvalidDiscountRange {
                min: min.percent(),
                max: max.percent(),
            }
            .into());
        }
        self.collect(
            &format!(
                "{} WHERE s.store_name = ?1 AND s.discount BETWEEN ?2 AND ?3 \
                 ORDER BY s.discount, c.clothing_id",
                store_select()
            ),
            params![store_name, min.percent(), max.percent()],
            convert::store_from_row,
        )
    }

    /// Stocks an item in `store_name`.
    ///
    /// When `new_item` is given it is first added to the catalog, tagged with
    /// the store name; both writes share one transaction.
    pub fn add_to_store(
        &self,
        store_name: &str,
        clothing_id: i64,
        price: Price,
        discount: Discount,
        new_item: Option<&ClothingItem>,
    ) -> Result<()> {
        self.require(Capability::ManageStore)?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(item) = new_item {
            let mut item = item.clone();
            item.clothing_id = clothing_id;
            item.store_name = Some(store_name.to_string());
            convert::insert_item(&tx, &item).map_err(|e| {
                ClosetError::from_write(e, &format!("clothing id {clothing_id} is already in use"))
            })?;
        }
        tx.execute(
            "INSERT INTO store_closet (store_name, clothing_id, price, discount) \
             VALUES (?1, ?2, ?3, ?4)",
            params![store_name, clothing_id, price.cents(), discount.percent()],
        )
        .map_err(|e| {
            ClosetError::from_write(
                e,
                &format!("cannot stock item {clothing_id}: unknown item or already stocked"),
            )
        })?;
        tx.commit()?;
        info!(store_name, clothing_id, %price, "item stocked");
        Ok(())
    }

    /// Removes an item from `store_name`'s inventory.
    pub fn remove_from_store(&self, store_name: &str, clothing_id: i64) -> Result<()> {
        self.require(Capability::ManageStore)?;
        let removed = self.conn.execute(
            "DELETE FROM store_closet WHERE store_name = ?1 AND clothing_id = ?2",
            params![store_name, clothing_id],
        )?;
        if removed == 0 {
            return Err(ClosetError::NotFound(format!(
                "item {clothing_id} is not in {store_name}'s inventory"
            )));
        }
        Ok(())
    }

    /// Sells a store item to a user; `false` means nothing changed.
    pub fn sell_to_user(&self, store_name: &str, clothing_id: i64, user_id: i64) -> Result<bool> {
        self.require(Capability::ManageStore)?;
        routines::sell_to_user(self.conn, store_name, clothing_id, user_id)
    }

    /// Changes the discount of a store item and re-prices it.
    ///
    /// The original price is recovered from the current price and discount,
    /// then the new discount is applied to it. Returns the new price.
    pub fn change_sale(
        &self,
        store_name: &str,
        clothing_id: i64,
        new_discount: Discount,
    ) -> Result<Price> {
        self.require(Capability::ManageStore)?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current: Option<(i64, u8)> = tx
            .query_row(
                "SELECT price, discount FROM store_closet WHERE store_name = ?1 AND clothing_id = ?2",
                params![store_name, clothing_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((price, discount)) = current else {
            return Err(ClosetError::NotFound(format!(
                "item {clothing_id} is not in {store_name}'s inventory"
            )));
        };

        let old_discount = Discount::new(discount)?;
        let original = routines::find_original_price(Price::from_cents(price), old_discount)?;
        let new_price = discounted_price(original, new_discount)?;
        tx.execute(
            "UPDATE store_closet SET price = ?1, discount = ?2 \
             WHERE store_name = ?3 AND clothing_id = ?4",
            params![new_price.cents(), new_discount.percent(), store_name, clothing_id],
        )?;
        tx.commit()?;
        info!(
            store_name,
            clothing_id,
            %old_discount,
            %new_discount,
            %new_price,
            "discount changed"
        );
        Ok(new_price)
    }

    // -----------------------------------------------------------------------
    // Outfits
    // -----------------------------------------------------------------------

    /// Returns `true` if the outfit id is already taken.
    pub fn check_outfit_id(&self, outfit_id: i64) -> Result<bool> {
        self.require(Capability::StyleOutfits)?;
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM styled_outfits WHERE outfit_id = ?1)",
            params![outfit_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Creates an outfit, one row per item, and returns its rows.
    ///
    /// All rows are inserted in one transaction: an unknown item id leaves
    /// no partial outfit behind.
    pub fn create_outfit(&self, outfit: &NewOutfit) -> Result<Vec<OutfitRow>> {
        self.require(Capability::StyleOutfits)?;
        validate_outfit_description(&outfit.description)?;
        if outfit.clothing_ids.is_empty() {
            return Err(ValidationError::EmptyIdList.into());
        }
        if self.check_outfit_id(outfit.outfit_id)? {
            return Err(ClosetError::Constraint(format!(
                "outfit id {} is already in use",
                outfit.outfit_id
            )));
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for clothing_id in &outfit.clothing_ids {
            tx.execute(
                "INSERT INTO styled_outfits (outfit_id, clothing_id, outfit_desc, vibe) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![outfit.outfit_id, clothing_id, outfit.description, outfit.vibe],
            )
            .map_err(|e| {
                ClosetError::from_write(e, &format!("cannot add item {clothing_id} to the outfit"))
            })?;
        }
        tx.commit()?;
        info!(outfit_id = outfit.outfit_id, items = outfit.clothing_ids.len(), "outfit created");
        self.outfit_rows(outfit.outfit_id)
    }

    /// Rows of one outfit.
    pub fn outfit_rows(&self, outfit_id: i64) -> Result<Vec<OutfitRow>> {
        self.require(Capability::StyleOutfits)?;
        self.collect(
            "SELECT outfit_id, clothing_id, outfit_desc, vibe FROM styled_outfits \
             WHERE outfit_id = ?1 ORDER BY clothing_id",
            params![outfit_id],
            convert::outfit_from_row,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SCHEMA_SQL;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn
    }

    #[test]
    fn test_login_capabilities_cannot_browse() {
        let conn = conn();
        let closet = Closet::new(&conn, Capabilities::LOGIN);
        assert!(matches!(
            closet.store_inventory("shop"),
            Err(ClosetError::PermissionDenied(Capability::BrowseStores))
        ));
    }

    #[test]
    fn test_register_rejects_long_username_before_writing() {
        let conn = conn();
        let closet = Closet::new(&conn, Capabilities::LOGIN);
        let err = closet
            .register_account("X", &"x".repeat(21), "pw", Role::Personal)
            .unwrap_err();
        assert!(matches!(
            err,
            ClosetError::Validation(ValidationError::UsernameTooLong(21))
        ));
        for table in ["user_info", "permissions", "user"] {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 0, "{table} should be untouched");
        }
    }

    #[test]
    fn test_register_duplicate_rolls_back() {
        let conn = conn();
        let closet = Closet::new(&conn, Capabilities::LOGIN);
        closet.register_account("Ada", "ada", "pw", Role::Personal).unwrap();
        let err = closet
            .register_account("Other Ada", "ada", "pw2", Role::Stylist)
            .unwrap_err();
        assert!(matches!(err, ClosetError::Constraint(_)));
        // The role write inside the failed transaction was rolled back.
        assert_eq!(closet.get_permission("ada").unwrap(), Some(Role::Personal));
    }

    #[test]
    fn test_input_is_bound_not_interpolated() {
        let conn = conn();
        let closet = Closet::new(&conn, Role::Admin.capabilities());
        let hostile = "x' OR '1'='1";
        assert!(!closet.check_username(hostile).unwrap());
        assert!(closet.store_inventory(hostile).unwrap().is_empty());
        assert!(closet.personal_clothes("'; DROP TABLE clothes; --").unwrap().is_empty());
        assert!(closet.all_clothes().is_ok());
    }

    #[test]
    fn test_outfit_with_unknown_item_leaves_nothing() {
        let conn = conn();
        conn.execute("INSERT INTO clothes (clothing_id, clothing_type) VALUES (1, 'hat')", [])
            .unwrap();
        let closet = Closet::new(&conn, Role::Stylist.capabilities());
        let outfit = NewOutfit {
            outfit_id: 5,
            clothing_ids: vec![1, 404],
            description: String::new(),
            vibe: String::new(),
        };
        assert!(matches!(
            closet.create_outfit(&outfit),
            Err(ClosetError::Constraint(_))
        ));
        assert!(!closet.check_outfit_id(5).unwrap());
    }
}
