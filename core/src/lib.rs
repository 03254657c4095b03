//! Core types for the Closetly closet database.
//!
//! This crate defines the pieces shared by storage and the console client:
//!
//! - [`Role`] and [`Capabilities`]: the closed set of account tiers and the
//!   privilege descriptor each one grants.
//! - [`ClothingItem`] and the per-closet entry types ([`PersonalClosetEntry`],
//!   [`CollabClosetEntry`], [`StoreClosetEntry`]) plus outfits.
//! - [`Price`] and [`Discount`]: cent-exact money and whole-percent
//!   discounts, with [`find_original_price`] / [`discounted_price`].
//! - Input validation ([`validate_username`], [`parse_id_list`], ...).
//!
//! # Example
//!
//! ```
//! use closetly_core::*;
//!
//! let caps = Role::from_stored("stylist").capabilities();
//! assert!(caps.allows(Capability::StyleOutfits));
//!
//! let original = find_original_price(Price::parse("15.00").unwrap(), Discount::NONE).unwrap();
//! let sale = discounted_price(original, Discount::parse("20").unwrap()).unwrap();
//! assert_eq!(sale, Price::parse("12").unwrap());
//! ```

mod money;
mod types;
mod validate;

pub use money::{Discount, Price, discounted_price, find_original_price};
pub use types::*;
pub use validate::{
    MAX_OUTFIT_DESCRIPTION_LEN, MAX_PASSWORD_LEN, MAX_USERNAME_LEN, Result, ValidationError,
    parse_id, parse_id_list, require_text, validate_outfit_description, validate_password,
    validate_username,
};
