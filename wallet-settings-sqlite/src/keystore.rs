//! Platform keystore integration for biometric unlock
//!
//! A [`PlatformKeystore`] seals small secrets under hardware-held keys and
//! releases them only after the platform prompt succeeds. Native bindings
//! (Android Keystore, Keychain, DPAPI, libsecret) implement the trait from
//! the host application; [`MockKeystore`] stands in for them on desktop and
//! in tests.
//!
//! [`KeystoreSecureStore`] adapts a keystore to the settings
//! [`SecureStore`] seam, recording which users have a sealed unlock secret
//! in the `biometric_secrets` table.

use crate::database::SharedDatabase;
use crate::models::{parse_timestamp, BiometricSecretRow};
use crate::security::{hash_sha256, EncryptionAlgorithm, MasterKey, SealedKey};
use crate::{Error, Result};
use chrono::Utc;
use parking_lot::RwLock;
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use wallet_settings_core::{SecureStore, SecureStoreError, UserId};
use zeroize::Zeroizing;

/// Platform capabilities for secure storage
#[derive(Debug, Clone)]
pub struct KeystoreCapabilities {
    /// Has hardware-backed secure storage (TEE, StrongBox, Secure Enclave)
    pub has_secure_hardware: bool,
    /// Has biometric authentication available
    pub has_biometrics: bool,
    /// Platform name
    pub platform: Platform,
}

impl Default for KeystoreCapabilities {
    fn default() -> Self {
        Self {
            has_secure_hardware: false,
            has_biometrics: false,
            platform: Platform::Unknown,
        }
    }
}

/// Supported platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Android (Keystore, StrongBox)
    Android,
    /// iOS (Keychain, Secure Enclave)
    Ios,
    /// macOS (Keychain, Secure Enclave)
    MacOs,
    /// Windows (DPAPI)
    Windows,
    /// Linux (libsecret)
    Linux,
    /// Unknown platform
    Unknown,
}

impl Platform {
    /// Detect current platform at compile time
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Unknown
        }
    }
}

/// Biometric authentication type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricType {
    /// Fingerprint sensor
    Fingerprint,
    /// Face recognition
    Face,
    /// Iris scanner
    Iris,
    /// Multiple types available
    Multiple,
    /// Unknown or unavailable
    None,
}

/// Keystore result for operations that may require user interaction
#[derive(Debug)]
pub enum KeystoreResult<T> {
    /// Success
    Success(T),
    /// User cancelled authentication
    Cancelled,
    /// Authentication failed (wrong biometric, etc.)
    AuthFailed,
    /// Keystore not available on this platform
    NotAvailable,
    /// Error occurred
    Error(Error),
}

impl<T> From<Result<T>> for KeystoreResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(v) => KeystoreResult::Success(v),
            Err(e) => KeystoreResult::Error(e),
        }
    }
}

impl<T> KeystoreResult<T> {
    /// Value on success
    pub fn ok(self) -> Option<T> {
        match self {
            KeystoreResult::Success(v) => Some(v),
            _ => None,
        }
    }
}

/// Platform keystore interface
pub trait PlatformKeystore: Send + Sync {
    /// Get platform capabilities
    fn capabilities(&self) -> KeystoreCapabilities;

    /// Seal `secret` under the platform key `key_id`, creating it if needed
    fn seal_secret(&self, secret: &[u8], key_id: &str, require_biometric: bool)
        -> Result<SealedKey>;

    /// Unseal, showing `prompt` if the key is biometric-gated
    fn unseal_secret(&self, sealed: &SealedKey, prompt: &str) -> KeystoreResult<Zeroizing<Vec<u8>>>;

    /// Delete the platform key; deleting a missing key succeeds
    fn delete_key(&self, key_id: &str) -> Result<()>;

    /// Check if biometrics are available
    fn has_biometrics(&self) -> bool;

    /// Get biometric type
    fn biometric_type(&self) -> BiometricType;
}

/// Mock keystore for testing and platforms without native integration
///
/// Seals with an in-process device key; keys vanish with the process.
pub struct MockKeystore {
    capabilities: KeystoreCapabilities,
    device_key: MasterKey,
    keys: RwLock<HashMap<String, bool>>,
    cancel_next_prompt: AtomicBool,
}

impl MockKeystore {
    /// Create new mock keystore without biometrics
    pub fn new() -> Self {
        Self::with_capabilities(KeystoreCapabilities {
            has_secure_hardware: false,
            has_biometrics: false,
            platform: Platform::current(),
        })
    }

    /// Mock keystore reporting a fingerprint sensor
    pub fn with_biometrics() -> Self {
        Self::with_capabilities(KeystoreCapabilities {
            has_secure_hardware: true,
            has_biometrics: true,
            platform: Platform::current(),
        })
    }

    /// Create with custom capabilities (for testing)
    pub fn with_capabilities(capabilities: KeystoreCapabilities) -> Self {
        Self {
            capabilities,
            device_key: MasterKey::generate(EncryptionAlgorithm::ChaCha20Poly1305),
            keys: RwLock::new(HashMap::new()),
            cancel_next_prompt: AtomicBool::new(false),
        }
    }

    /// Make the next biometric prompt report a user cancel
    pub fn cancel_next_prompt(&self) {
        self.cancel_next_prompt.store(true, Ordering::SeqCst);
    }

    /// Whether a platform key with this id exists
    pub fn has_key(&self, key_id: &str) -> bool {
        self.keys.read().contains_key(key_id)
    }
}

impl Default for MockKeystore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformKeystore for MockKeystore {
    fn capabilities(&self) -> KeystoreCapabilities {
        self.capabilities.clone()
    }

    fn seal_secret(
        &self,
        secret: &[u8],
        key_id: &str,
        require_biometric: bool,
    ) -> Result<SealedKey> {
        if require_biometric && !self.has_biometrics() {
            return Err(Error::Security("Biometric key requested without biometrics".to_string()));
        }
        let encrypted = self.device_key.encrypt(secret)?;
        self.keys.write().insert(key_id.to_string(), require_biometric);
        Ok(SealedKey::new(
            encrypted,
            key_id.to_string(),
            self.device_key.algorithm(),
        ))
    }

    fn unseal_secret(&self, sealed: &SealedKey, _prompt: &str) -> KeystoreResult<Zeroizing<Vec<u8>>> {
        let require_biometric = match self.keys.read().get(&sealed.key_id) {
            Some(flag) => *flag,
            None => return KeystoreResult::Error(Error::NotFound(sealed.key_id.clone())),
        };
        if require_biometric {
            if !self.has_biometrics() {
                return KeystoreResult::NotAvailable;
            }
            if self.cancel_next_prompt.swap(false, Ordering::SeqCst) {
                return KeystoreResult::Cancelled;
            }
        }
        self.device_key
            .decrypt(&sealed.encrypted_key)
            .map(Zeroizing::new)
            .into()
    }

    fn delete_key(&self, key_id: &str) -> Result<()> {
        self.keys.write().remove(key_id);
        Ok(())
    }

    fn has_biometrics(&self) -> bool {
        self.capabilities.has_biometrics
    }

    fn biometric_type(&self) -> BiometricType {
        if self.capabilities.has_biometrics {
            BiometricType::Fingerprint
        } else {
            BiometricType::None
        }
    }
}

/// Per-user keystore key naming
pub struct KeystoreManager {
    key_id_prefix: String,
}

impl KeystoreManager {
    /// Create new keystore manager
    pub fn new(user_id: &str) -> Self {
        let digest = hash_sha256(user_id.as_bytes());
        Self {
            key_id_prefix: format!("wallet_settings_{}", hex::encode(&digest[..16])),
        }
    }

    /// Get key ID for the biometric unlock secret
    pub fn biometric_key_id(&self) -> String {
        format!("{}_biometric", self.key_id_prefix)
    }
}

/// [`SecureStore`] backed by a platform keystore and the settings database
pub struct KeystoreSecureStore {
    keystore: Arc<dyn PlatformKeystore>,
    db: SharedDatabase,
}

impl KeystoreSecureStore {
    /// Create secure store
    pub fn new(keystore: Arc<dyn PlatformKeystore>, db: SharedDatabase) -> Self {
        Self { keystore, db }
    }

    /// Stored sealed-secret row for `user`
    pub fn load_secret(&self, user: &UserId) -> Result<Option<BiometricSecretRow>> {
        let db = self.db.lock();
        let row = db
            .conn()
            .query_row(
                "SELECT user_id, key_id, sealed, created_at FROM biometric_secrets WHERE user_id = ?1",
                [user.as_str()],
                |row| {
                    let created_at: String = row.get(3)?;
                    Ok(BiometricSecretRow {
                        user_id: row.get(0)?,
                        key_id: row.get(1)?,
                        sealed: row.get(2)?,
                        created_at: parse_timestamp(&created_at)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Release the unlock credential after a biometric prompt
    pub fn unlock(&self, user: &UserId, prompt: &str) -> KeystoreResult<Zeroizing<String>> {
        let row = match self.load_secret(user) {
            Ok(Some(row)) => row,
            Ok(None) => {
                return KeystoreResult::Error(Error::NotFound(format!(
                    "biometric secret for {}",
                    user
                )))
            }
            Err(e) => return KeystoreResult::Error(e),
        };
        let sealed = match SealedKey::deserialize(&row.sealed) {
            Ok(sealed) => sealed,
            Err(e) => return KeystoreResult::Error(e),
        };
        match self.keystore.unseal_secret(&sealed, prompt) {
            KeystoreResult::Success(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(credential) => KeystoreResult::Success(Zeroizing::new(credential)),
                Err(_) => KeystoreResult::Error(Error::Security(
                    "Unsealed credential is not valid UTF-8".to_string(),
                )),
            },
            KeystoreResult::Cancelled => KeystoreResult::Cancelled,
            KeystoreResult::AuthFailed => KeystoreResult::AuthFailed,
            KeystoreResult::NotAvailable => KeystoreResult::NotAvailable,
            KeystoreResult::Error(e) => KeystoreResult::Error(e),
        }
    }

    fn store_secret(&self, user: &UserId, sealed: &SealedKey) -> Result<()> {
        let mut db = self.db.lock();
        let tx = db.transaction()?;
        tx.execute(
            "INSERT INTO biometric_secrets (user_id, key_id, sealed, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET key_id = excluded.key_id, sealed = excluded.sealed, created_at = excluded.created_at",
            params![
                user.as_str(),
                sealed.key_id,
                sealed.serialize(),
                Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn remove_secret(&self, user: &UserId) -> Result<()> {
        let db = self.db.lock();
        db.conn()
            .execute("DELETE FROM biometric_secrets WHERE user_id = ?1", [user.as_str()])?;
        Ok(())
    }
}

impl SecureStore for KeystoreSecureStore {
    fn is_biometric_enabled(&self, user: &UserId) -> bool {
        match self.load_secret(user) {
            Ok(row) => row.is_some(),
            Err(e) => {
                tracing::warn!("Failed to query biometric secret for {}: {}", user, e);
                false
            }
        }
    }

    fn provision_biometric(
        &self,
        user: &UserId,
        credential: &str,
    ) -> std::result::Result<(), SecureStoreError> {
        if !self.keystore.has_biometrics() {
            return Err(SecureStoreError::Unsupported(format!(
                "no biometric hardware on {:?}",
                self.keystore.capabilities().platform
            )));
        }

        let key_id = KeystoreManager::new(user.as_str()).biometric_key_id();
        let had_secret = self.load_secret(user)?.is_some();
        let sealed = self.keystore.seal_secret(credential.as_bytes(), &key_id, true)?;

        if let Err(e) = self.store_secret(user, &sealed) {
            // An existing row still points at this key id
            if !had_secret {
                if let Err(cleanup) = self.keystore.delete_key(&key_id) {
                    tracing::warn!("Failed to delete orphaned key {}: {}", key_id, cleanup);
                }
            }
            return Err(e.into());
        }

        tracing::info!("Biometric unlock provisioned for {}", user);
        Ok(())
    }

    fn revoke_biometric(&self, user: &UserId) -> std::result::Result<(), SecureStoreError> {
        let Some(row) = self.load_secret(user)? else {
            return Ok(());
        };
        self.remove_secret(user)?;
        if let Err(e) = self.keystore.delete_key(&row.key_id) {
            tracing::warn!("Failed to delete platform key {}: {}", row.key_id, e);
        }
        tracing::info!("Biometric unlock revoked for {}", user);
        Ok(())
    }
}
