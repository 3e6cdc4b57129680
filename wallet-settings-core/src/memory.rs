//! In-memory collaborators for tests, tooling and platforms without native storage

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use zeroize::Zeroizing;

use crate::store::{LocalStore, LocalStoreError, SecureStore, SecureStoreError};
use crate::user::UserId;

/// Blob store backed by a map
///
/// Each write swaps the whole blob under a lock, so readers never observe a
/// partial write. Writes can be made to fail to simulate a storage fault.
#[derive(Default)]
pub struct MemoryLocalStore {
    blobs: RwLock<HashMap<UserId, Vec<u8>>>,
    fail_writes: Mutex<Option<String>>,
    writes: Mutex<u64>,
}

impl MemoryLocalStore {
    /// Create empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail with `reason` until [`Self::heal`]
    pub fn fail_writes(&self, reason: impl Into<String>) {
        *self.fail_writes.lock() = Some(reason.into());
    }

    /// Stop failing writes
    pub fn heal(&self) {
        *self.fail_writes.lock() = None;
    }

    /// Plant raw bytes for `user`, bypassing encoding
    pub fn put_raw(&self, user: &UserId, bytes: impl Into<Vec<u8>>) {
        self.blobs.write().insert(user.clone(), bytes.into());
    }

    /// Get raw bytes stored for `user`
    pub fn raw(&self, user: &UserId) -> Option<Vec<u8>> {
        self.blobs.read().get(user).cloned()
    }

    /// Number of successful writes
    pub fn write_count(&self) -> u64 {
        *self.writes.lock()
    }
}

impl LocalStore for MemoryLocalStore {
    fn read_blob(&self, user: &UserId) -> Result<Vec<u8>, LocalStoreError> {
        self.blobs
            .read()
            .get(user)
            .cloned()
            .ok_or(LocalStoreError::NotFound)
    }

    fn write_blob(&self, user: &UserId, bytes: &[u8]) -> Result<(), LocalStoreError> {
        if let Some(reason) = self.fail_writes.lock().as_ref() {
            return Err(LocalStoreError::WriteFailed(reason.clone()));
        }
        self.blobs.write().insert(user.clone(), bytes.to_vec());
        *self.writes.lock() += 1;
        Ok(())
    }
}

/// Secure store keeping biometric-guarded secrets in memory
pub struct MemorySecureStore {
    has_biometrics: bool,
    secrets: RwLock<HashMap<UserId, Zeroizing<String>>>,
    fail_provision: Mutex<Option<String>>,
}

impl MemorySecureStore {
    /// Create a store on a device with biometric hardware
    pub fn with_biometrics() -> Self {
        Self::new(true)
    }

    /// Create a store on a device without biometric hardware
    pub fn without_biometrics() -> Self {
        Self::new(false)
    }

    fn new(has_biometrics: bool) -> Self {
        Self {
            has_biometrics,
            secrets: RwLock::new(HashMap::new()),
            fail_provision: Mutex::new(None),
        }
    }

    /// Make the next provisioning fail (e.g. user cancelled the prompt)
    pub fn fail_next_provision(&self, reason: impl Into<String>) {
        *self.fail_provision.lock() = Some(reason.into());
    }

    /// Release the guarded credential, as a successful biometric prompt would
    pub fn unlock(&self, user: &UserId) -> Option<Zeroizing<String>> {
        self.secrets.read().get(user).cloned()
    }
}

impl SecureStore for MemorySecureStore {
    fn is_biometric_enabled(&self, user: &UserId) -> bool {
        self.secrets.read().contains_key(user)
    }

    fn provision_biometric(&self, user: &UserId, credential: &str) -> Result<(), SecureStoreError> {
        if !self.has_biometrics {
            return Err(SecureStoreError::Unsupported(
                "no biometric hardware".to_string(),
            ));
        }
        if let Some(reason) = self.fail_provision.lock().take() {
            return Err(SecureStoreError::Failed(reason));
        }
        self.secrets
            .write()
            .insert(user.clone(), Zeroizing::new(credential.to_string()));
        Ok(())
    }

    fn revoke_biometric(&self, user: &UserId) -> Result<(), SecureStoreError> {
        self.secrets.write().remove(user);
        Ok(())
    }
}
