//! Row mapping between SQLite results and closet types.
//!
//! Queries select the clothing columns in the fixed order of
//! [`ITEM_COLUMNS`] and pass the column offset where they begin, so one
//! mapper serves every join.

use closetly_core::{
    ClothingItem, CollabClosetEntry, Discount, OutfitRow, PersonalClosetEntry, Price, Role,
    StoreClosetEntry, UserAccount,
};
use rusqlite::{Connection, Row, params};

use crate::error::Result;

/// Clothing columns, qualified with the `c` alias, in mapping order.
pub(crate) const ITEM_COLUMNS: &str = "c.clothing_id, c.clothing_type, c.size, c.gender, c.color, \
     c.brand, c.description, c.image_url, c.aesthetic, c.store_name";

/// Number of columns in [`ITEM_COLUMNS`].
pub(crate) const ITEM_COLUMN_COUNT: usize = 10;

/// Maps the clothing columns starting at `offset`.
pub(crate) fn item_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<ClothingItem> {
    Ok(ClothingItem {
        clothing_id: row.get(offset)?,
        clothing_type: row.get(offset + 1)?,
        size: row.get(offset + 2)?,
        gender: row.get(offset + 3)?,
        color: row.get(offset + 4)?,
        brand: row.get(offset + 5)?,
        description: row.get(offset + 6)?,
        image_url: row.get(offset + 7)?,
        aesthetic: row.get(offset + 8)?,
        store_name: row.get(offset + 9)?,
    })
}

/// Maps `ITEM_COLUMNS, is_clean, shared, num_wears`.
pub(crate) fn personal_from_row(row: &Row<'_>) -> rusqlite::Result<PersonalClosetEntry> {
    let n = ITEM_COLUMN_COUNT;
    Ok(PersonalClosetEntry {
        item: item_from_row(row, 0)?,
        is_clean: row.get(n)?,
        shared: row.get(n + 1)?,
        num_wears: row.get(n + 2)?,
    })
}

/// Maps `user_id, ITEM_COLUMNS, curr_condition, is_available, current_borrower`.
pub(crate) fn collab_from_row(row: &Row<'_>) -> rusqlite::Result<CollabClosetEntry> {
    let n = ITEM_COLUMN_COUNT + 1;
    Ok(CollabClosetEntry {
        user_id: row.get(0)?,
        item: item_from_row(row, 1)?,
        curr_condition: row.get(n)?,
        is_available: row.get(n + 1)?,
        current_borrower: row.get(n + 2)?,
    })
}

/// Maps `store_name, price, discount, ITEM_COLUMNS`.
pub(crate) fn store_from_row(row: &Row<'_>) -> rusqlite::Result<StoreClosetEntry> {
    let discount: u8 = row.get(2)?;
    Ok(StoreClosetEntry {
        store_name: row.get(0)?,
        price: Price::from_cents(row.get(1)?),
        // The schema's CHECK keeps stored discounts in range.
        discount: Discount::new(discount).unwrap_or_default(),
        item: item_from_row(row, 3)?,
    })
}

pub(crate) fn outfit_from_row(row: &Row<'_>) -> rusqlite::Result<OutfitRow> {
    Ok(OutfitRow {
        outfit_id: row.get(0)?,
        clothing_id: row.get(1)?,
        outfit_desc: row.get(2)?,
        vibe: row.get(3)?,
    })
}

/// Loads an account by username, joining its stored role.
pub(crate) fn load_account(conn: &Connection, username: &str) -> Result<Option<UserAccount>> {
    let mut stmt = conn.prepare(
        "SELECT u.user_id, u.username, u.name, p.role \
         FROM user u LEFT JOIN permissions p ON p.username = u.username \
         WHERE u.username = ?1",
    )?;
    let mut rows = stmt.query(params![username])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    let role: Option<String> = row.get(3)?;
    Ok(Some(UserAccount {
        user_id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        role: Role::from_stored(role.as_deref().unwrap_or_default()),
    }))
}

/// Inserts a clothing item row.
pub(crate) fn insert_item(conn: &Connection, item: &ClothingItem) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO clothes (clothing_id, clothing_type, size, gender, color, brand, \
         description, image_url, aesthetic, store_name) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            item.clothing_id,
            item.clothing_type,
            item.size,
            item.gender,
            item.color,
            item.brand,
            item.description,
            item.image_url,
            item.aesthetic,
            item.store_name,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SCHEMA_SQL;

    #[test]
    fn test_item_round_trip_through_row() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        let mut item = ClothingItem::new(3, "dress");
        item.color = Some("red".into());
        item.store_name = Some("Thrift Co".into());
        insert_item(&conn, &item).unwrap();

        let loaded = conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM clothes c WHERE c.clothing_id = 3"),
                [],
                |row| item_from_row(row, 0),
            )
            .unwrap();
        assert_eq!(loaded, item);
    }

    #[test]
    fn test_load_account_defaults_missing_role_to_personal() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn.execute_batch(
            "INSERT INTO user_info VALUES ('ada', 'h');
             INSERT INTO user (name, username) VALUES ('Ada', 'ada');",
        )
        .unwrap();
        let account = load_account(&conn, "ada").unwrap().unwrap();
        assert_eq!(account.role, Role::Personal);
        assert!(load_account(&conn, "nobody").unwrap().is_none());
    }
}
