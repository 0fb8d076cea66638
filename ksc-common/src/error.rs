//! Error types shared by the KSC crates

use thiserror::Error;

/// Result alias used throughout the KSC crates
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that cross the library boundary
///
/// Handler-specific conditions (duplicate submissions, incomplete rating
/// sheets) carry their own types; this enum covers the shared store,
/// filesystem and configuration layers.
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite operation failed
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Root folder or database file access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file missing, unreadable or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Project, invite token or other resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request carried a value the store cannot accept
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Anything that should never surface to a caller in detail
    #[error("Internal error: {0}")]
    Internal(String),
}
