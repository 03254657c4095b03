use std::io;

use closetly_core::ValidationError;
use closetly_sqlite::ClosetError;
use thiserror::Error;

/// Errors that end an interactive session.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reading from or writing to the terminal failed.
    #[error("console error: {0}")]
    Console(#[from] io::Error),

    #[error(transparent)]
    Closet(#[from] ClosetError),

    /// Console input that failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl AppError {
    /// Errors the menu loop reports and moves past.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Console(_) => false,
            AppError::Closet(err) => err.is_recoverable(),
            AppError::Validation(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
