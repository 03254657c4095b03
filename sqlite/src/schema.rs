//! SQL schema for the closet database.
//!
//! # Table structure
//!
//! - `user_info`: login credentials (username, Argon2 PHC hash string)
//! - `permissions`: stored role per username
//! - `user`: numeric user id and display name per username
//! - `clothes`: every clothing item, whichever closet it lives in
//! - `personal_closet`: ownership with cleanliness, shared flag, wear count
//! - `collab_closet`: lent items with availability and current borrower
//! - `store_closet`: store inventory with price (cents) and discount
//! - `styled_outfits`: one row per (outfit, item) pair
//!
//! `permissions` has no foreign key to `user_info`: sign-up records the role
//! before the credentials.

/// Statements creating every table and index.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS user_info (
    username TEXT PRIMARY KEY CHECK (length(username) BETWEEN 1 AND 20),
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS permissions (
    username TEXT PRIMARY KEY CHECK (length(username) BETWEEN 1 AND 20),
    role TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    username TEXT NOT NULL UNIQUE,
    FOREIGN KEY (username) REFERENCES user_info(username) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS clothes (
    clothing_id INTEGER PRIMARY KEY,
    clothing_type TEXT NOT NULL,
    size TEXT,
    gender TEXT,
    color TEXT,
    brand TEXT,
    description TEXT,
    image_url TEXT,
    aesthetic TEXT,
    store_name TEXT
);

CREATE TABLE IF NOT EXISTS personal_closet (
    user_id INTEGER NOT NULL,
    clothing_id INTEGER NOT NULL,
    is_clean INTEGER NOT NULL DEFAULT 1 CHECK (is_clean IN (0, 1)),
    shared INTEGER NOT NULL DEFAULT 0 CHECK (shared IN (0, 1)),
    num_wears INTEGER NOT NULL DEFAULT 0 CHECK (num_wears >= 0),
    PRIMARY KEY (user_id, clothing_id),
    FOREIGN KEY (user_id) REFERENCES user(user_id) ON DELETE CASCADE,
    FOREIGN KEY (clothing_id) REFERENCES clothes(clothing_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS collab_closet (
    clothing_id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    curr_condition TEXT,
    is_available INTEGER NOT NULL DEFAULT 1 CHECK (is_available IN (0, 1)),
    current_borrower INTEGER,
    CHECK (current_borrower IS NULL OR current_borrower <> user_id),
    CHECK ((is_available = 1) = (current_borrower IS NULL)),
    FOREIGN KEY (user_id) REFERENCES user(user_id) ON DELETE CASCADE,
    FOREIGN KEY (current_borrower) REFERENCES user(user_id) ON DELETE SET NULL,
    FOREIGN KEY (clothing_id) REFERENCES clothes(clothing_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS store_closet (
    store_name TEXT NOT NULL,
    clothing_id INTEGER NOT NULL,
    price INTEGER NOT NULL CHECK (price BETWEEN 0 AND 1000000000000),
    discount INTEGER NOT NULL DEFAULT 0 CHECK (discount BETWEEN 0 AND 99),
    PRIMARY KEY (store_name, clothing_id),
    FOREIGN KEY (clothing_id) REFERENCES clothes(clothing_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS styled_outfits (
    outfit_id INTEGER NOT NULL,
    clothing_id INTEGER NOT NULL,
    outfit_desc TEXT CHECK (outfit_desc IS NULL OR length(outfit_desc) <= 250),
    vibe TEXT,
    PRIMARY KEY (outfit_id, clothing_id),
    FOREIGN KEY (clothing_id) REFERENCES clothes(clothing_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_personal_closet_clothing ON personal_closet(clothing_id);
CREATE INDEX IF NOT EXISTS idx_collab_closet_user ON collab_closet(user_id);
CREATE INDEX IF NOT EXISTS idx_store_closet_clothing ON store_closet(clothing_id);
CREATE INDEX IF NOT EXISTS idx_clothes_type ON clothes(clothing_type);
"#;

/// Statements dropping every table in reverse dependency order.
pub const DROP_SQL: &str = r#"
DROP TABLE IF EXISTS styled_outfits;
DROP TABLE IF EXISTS store_closet;
DROP TABLE IF EXISTS collab_closet;
DROP TABLE IF EXISTS personal_closet;
DROP TABLE IF EXISTS clothes;
DROP TABLE IF EXISTS user;
DROP TABLE IF EXISTS permissions;
DROP TABLE IF EXISTS user_info;
"#;

/// Tables in creation order.
pub const TABLES: [&str; 8] = [
    "user_info",
    "permissions",
    "user",
    "clothes",
    "personal_closet",
    "collab_closet",
    "store_closet",
    "styled_outfits",
];

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::{Connection, params};

    fn migrated() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn.execute_batch(
            "INSERT INTO user_info VALUES ('ada', 'h'), ('bob', 'h');
             INSERT INTO user (name, username) VALUES ('Ada', 'ada'), ('Bob', 'bob');
             INSERT INTO clothes (clothing_id, clothing_type) VALUES (1, 'hat');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_schema_sql_mentions_every_table() {
        for table in TABLES {
            assert!(SCHEMA_SQL.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")));
            assert!(DROP_SQL.contains(&format!("DROP TABLE IF EXISTS {table};")));
        }
    }

    #[test]
    fn test_collab_rejects_self_borrow() {
        let conn = migrated();
        let result = conn.execute(
            "INSERT INTO collab_closet (clothing_id, user_id, is_available, current_borrower) \
             VALUES (1, 1, 0, 1)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_collab_availability_matches_borrower() {
        let conn = migrated();
        // Available but borrowed: inconsistent.
        assert!(conn
            .execute(
                "INSERT INTO collab_closet (clothing_id, user_id, is_available, current_borrower) \
                 VALUES (1, 1, 1, 2)",
                [],
            )
            .is_err());
        // Lent out to someone else: fine.
        assert!(conn
            .execute(
                "INSERT INTO collab_closet (clothing_id, user_id, is_available, current_borrower) \
                 VALUES (1, 1, 0, 2)",
                [],
            )
            .is_ok());
    }

    #[test]
    fn test_store_discount_range() {
        let conn = migrated();
        let insert = |discount: i64| {
            conn.execute(
                "INSERT OR REPLACE INTO store_closet VALUES ('shop', 1, 1000, ?1)",
                params![discount],
            )
        };
        assert!(insert(0).is_ok());
        assert!(insert(99).is_ok());
        assert!(insert(100).is_err());
    }

    #[test]
    fn test_store_price_range() {
        let conn = migrated();
        let insert = |price: i64| {
            conn.execute(
                "INSERT OR REPLACE INTO store_closet VALUES ('shop', 1, ?1, 0)",
                params![price],
            )
        };
        assert!(insert(0).is_ok());
        assert!(insert(1_000_000_000_000).is_ok());
        assert!(insert(-1).is_err());
        assert!(insert(1_000_000_000_001).is_err());
    }

    #[test]
    fn test_username_length_enforced_by_schema() {
        let conn = migrated();
        let long = "u".repeat(21);
        assert!(conn
            .execute("INSERT INTO user_info VALUES (?1, 'h')", params![long])
            .is_err());
    }
}
