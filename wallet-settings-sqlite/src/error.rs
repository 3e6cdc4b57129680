//! Error types

use wallet_settings_core::{LocalStoreError, SecureStoreError};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Encryption error
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Security error
    #[error("Security error: {0}")]
    Security(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Map into a read-side collaborator error
    pub fn into_read_error(self) -> LocalStoreError {
        match self {
            Error::NotFound(_) => LocalStoreError::NotFound,
            Error::Encryption(msg) => LocalStoreError::Corrupt(msg),
            other => LocalStoreError::ReadFailed(other.to_string()),
        }
    }

    /// Map into a write-side collaborator error
    pub fn into_write_error(self) -> LocalStoreError {
        LocalStoreError::WriteFailed(self.to_string())
    }
}

impl From<Error> for SecureStoreError {
    fn from(err: Error) -> Self {
        SecureStoreError::Failed(err.to_string())
    }
}
