//! Input validation for values typed at the console.
//!
//! Everything the operator enters passes through one of these checks before
//! it reaches the database, so limits like the 20-character username cap are
//! enforced before any write happens.
//!
//! # Examples
//!
//! ```
//! use closetly_core::*;
//!
//! assert!(validate_username("ada").is_ok());
//! assert_eq!(
//!     validate_username("a_very_long_username_indeed"),
//!     Err(ValidationError::UsernameTooLong(27)),
//! );
//! assert_eq!(parse_id_list("1 2 4").unwrap(), vec![1, 2, 4]);
//! ```

use std::collections::HashSet;

use thiserror::Error;

/// Maximum username length, in characters.
pub const MAX_USERNAME_LEN: usize = 20;

/// Maximum password length, in characters.
pub const MAX_PASSWORD_LEN: usize = 20;

/// Maximum outfit description length, in characters.
pub const MAX_OUTFIT_DESCRIPTION_LEN: usize = 250;

/// Input validation errors.
///
/// The `Display` impl is written for the person at the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Username is empty or whitespace-only.
    #[error("username cannot be empty")]
    EmptyUsername,
    /// Username exceeds [`MAX_USERNAME_LEN`]; carries the actual length.
    #[error("username is too long ({0} characters), must be {MAX_USERNAME_LEN} characters or less")]
    UsernameTooLong(usize),
    /// Password is empty.
    #[error("password cannot be empty")]
    EmptyPassword,
    /// Password exceeds [`MAX_PASSWORD_LEN`]; carries the actual length.
    #[error("password is too long ({0} characters), must be {MAX_PASSWORD_LEN} characters or less")]
    PasswordTooLong(usize),
    /// Outfit description exceeds [`MAX_OUTFIT_DESCRIPTION_LEN`].
    #[error("description is too long ({0} characters), must be {MAX_OUTFIT_DESCRIPTION_LEN} characters or less")]
    DescriptionTooLong(usize),
    /// A price could not be parsed.
    #[error("invalid price: {0}")]
    InvalidPrice(String),
    /// A price range has its bounds reversed.
    #[error("minimum price {min} is above maximum price {max}")]
    InvalidPriceRange { min: String, max: String },
    /// A discount is not a whole percent in `0..=99`.
    #[error("invalid discount: {0} (expected a whole percent from 0 to 99)")]
    InvalidDiscount(String),
    /// A discount range has its bounds reversed.
    #[error("minimum discount {min}% is above maximum discount {max}%")]
    InvalidDiscountRange { min: u8, max: u8 },
    /// An identifier is not a non-negative integer.
    #[error("invalid id: {0}")]
    InvalidId(String),
    /// An id list was empty.
    #[error("at least one clothing id is required")]
    EmptyIdList,
    /// An id list named the same item twice.
    #[error("clothing id {0} is listed more than once")]
    DuplicateId(i64),
    /// A role name is not one of the known tiers.
    #[error("unknown role: {0}")]
    UnknownRole(String),
    /// A required text field was left blank.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
}

/// Convenience alias for results with [`ValidationError`].
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Checks a username against the emptiness and length rules.
pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    let len = username.chars().count();
    if len > MAX_USERNAME_LEN {
        return Err(ValidationError::UsernameTooLong(len));
    }
    Ok(())
}

/// Checks a password against the emptiness and length rules.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    let len = password.chars().count();
    if len > MAX_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooLong(len));
    }
    Ok(())
}

pub fn validate_outfit_description(description: &str) -> Result<()> {
    let len = description.chars().count();
    if len > MAX_OUTFIT_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong(len));
    }
    Ok(())
}

/// Rejects blank required fields such as a store name or clothing type.
pub fn require_text<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed)
}

/// Parses a single non-negative integer identifier.
pub fn parse_id(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(id) if id >= 0 => Ok(id),
        _ => Err(ValidationError::InvalidId(trimmed.to_string())),
    }
}

/// Parses a whitespace-separated list of clothing ids (e.g. `"1 2 4"`).
///
/// Order is preserved. The list must be non-empty and free of duplicates,
/// since each id becomes one row of the outfit.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for token in raw.split_whitespace() {
        let id = parse_id(token)?;
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId(id));
        }
        ids.push(id);
    }
    if ids.is_empty() {
        return Err(ValidationError::EmptyIdList);
    }
    Ok(ids)
}
