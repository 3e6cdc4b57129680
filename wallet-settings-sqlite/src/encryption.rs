//! Database key derivation

use crate::security::derive_key_bytes;
use crate::{Error, Result};
use zeroize::Zeroizing;

/// SQLCipher page key
pub struct EncryptionKey(Zeroizing<[u8; 32]>);

impl EncryptionKey {
    /// Derive from passphrase using Argon2id + salt
    pub fn from_passphrase(passphrase: &str, salt: &[u8]) -> Result<Self> {
        let key = derive_key_bytes(passphrase, salt)?;
        Ok(Self(key))
    }

    /// Create from raw key bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Create from raw key bytes slice
    pub fn from_bytes_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::Encryption("Invalid key length".to_string()))?;
        Ok(Self::from_bytes(key))
    }

    /// Get key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}
