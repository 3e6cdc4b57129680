//! Collaborator interfaces consumed by the settings store
//!
//! Implementations live elsewhere (the SQLite crate ships the production
//! ones, [`crate::memory`] ships in-memory ones for tests and tooling).

use crate::error::SettingsError;
use crate::user::UserId;

/// Local persistence errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocalStoreError {
    /// Nothing stored for this user
    #[error("no settings stored")]
    NotFound,

    /// Something is stored but cannot be handed back (e.g. fails to decrypt)
    #[error("stored settings unreadable: {0}")]
    Corrupt(String),

    /// Read failed for a reason unrelated to the stored data
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// Medium rejected the write; the previous blob is intact
    #[error("write failed: {0}")]
    WriteFailed(String),
}

/// Per-user blob persistence
///
/// `write_blob` must be atomic: a later `read_blob` returns either the
/// previous blob or the new one in full.
pub trait LocalStore: Send + Sync {
    /// Read the settings blob for `user`
    fn read_blob(&self, user: &UserId) -> Result<Vec<u8>, LocalStoreError>;

    /// Replace the settings blob for `user`
    fn write_blob(&self, user: &UserId, bytes: &[u8]) -> Result<(), LocalStoreError>;
}

/// Secure-store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecureStoreError {
    /// Device or platform has no biometric hardware
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Operation failed (user cancelled, keystore error, ...)
    #[error("failed: {0}")]
    Failed(String),
}

/// Platform credential vault gating secrets behind biometrics
///
/// Calls may block on a platform biometric prompt.
pub trait SecureStore: Send + Sync {
    /// Whether a biometric-guarded secret exists for `user`
    fn is_biometric_enabled(&self, user: &UserId) -> bool;

    /// Store `credential` behind biometric authentication
    fn provision_biometric(&self, user: &UserId, credential: &str) -> Result<(), SecureStoreError>;

    /// Remove the biometric-guarded secret; succeeds if none exists
    fn revoke_biometric(&self, user: &UserId) -> Result<(), SecureStoreError>;
}

impl LocalStoreError {
    /// Map a read failure into the settings taxonomy
    pub fn into_load_error(self, user: &UserId) -> SettingsError {
        match self {
            LocalStoreError::NotFound => SettingsError::NotFound(user.to_string()),
            LocalStoreError::Corrupt(msg) => SettingsError::CorruptData(msg),
            LocalStoreError::ReadFailed(msg) => SettingsError::StorageReadFailed(msg),
            LocalStoreError::WriteFailed(msg) => SettingsError::StorageWriteFailed(msg),
        }
    }
}

impl From<SecureStoreError> for SettingsError {
    fn from(err: SecureStoreError) -> Self {
        match err {
            SecureStoreError::Unsupported(msg) => SettingsError::UnsupportedCapability(msg),
            SecureStoreError::Failed(msg) => SettingsError::BiometricProvisionFailed(msg),
        }
    }
}
