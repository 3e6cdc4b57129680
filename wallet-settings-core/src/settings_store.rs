//! Settings store bound to one user context
//!
//! ```text
//! Unloaded --load ok / NotFound--> Loaded --save / mutate / load--> Loaded
//! Unloaded --load CorruptData----> Corrupt --reset_to_defaults----> Loaded
//! any --unbind--> Unbound
//! ```
//!
//! One instance exists per user context and it is driven by a single owner;
//! `&mut self` on every state-changing call is the only synchronization.

use std::sync::Arc;

use crate::codec;
use crate::error::{Result, SettingsError};
use crate::record::SettingsRecord;
use crate::store::{LocalStore, LocalStoreError, SecureStore};
use crate::user::{UserContext, UserId};

/// Lifecycle state of a settings store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Nothing loaded yet
    Unloaded,
    /// Record in memory; saves allowed
    Loaded,
    /// Persisted blob is corrupt; saves refused until reset
    Corrupt,
    /// User context torn down
    Unbound,
}

/// Settings holder for one authenticated user
pub struct SettingsStore {
    user: Option<UserContext>,
    local: Arc<dyn LocalStore>,
    secure: Arc<dyn SecureStore>,
    record: SettingsRecord,
    state: StoreState,
}

impl SettingsStore {
    /// Bind a store to `user` and its collaborators (no I/O)
    pub fn new(user: UserContext, local: Arc<dyn LocalStore>, secure: Arc<dyn SecureStore>) -> Self {
        Self {
            user: Some(user),
            local,
            secure,
            record: SettingsRecord::default(),
            state: StoreState::Unloaded,
        }
    }

    /// Get current state
    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Get bound user id
    pub fn user_id(&self) -> Result<&UserId> {
        self.user
            .as_ref()
            .map(UserContext::user_id)
            .ok_or(SettingsError::Unbound)
    }

    /// Load settings from the local store
    ///
    /// On `NotFound` the record holds the defaults and the store is usable
    /// (first run). On `CorruptData` saving is refused until
    /// [`Self::reset_to_defaults`] is called.
    pub fn load(&mut self) -> Result<&SettingsRecord> {
        let user_id = self.user_id()?.clone();

        let bytes = match self.local.read_blob(&user_id) {
            Ok(bytes) => bytes,
            Err(LocalStoreError::NotFound) => {
                tracing::info!("No settings stored for {}, using defaults", user_id);
                self.record = SettingsRecord::default();
                self.state = StoreState::Loaded;
                return Err(SettingsError::NotFound(user_id.to_string()));
            }
            Err(LocalStoreError::Corrupt(msg)) => {
                tracing::warn!("Stored settings for {} are unreadable: {}", user_id, msg);
                self.state = StoreState::Corrupt;
                return Err(SettingsError::CorruptData(msg));
            }
            Err(e) => {
                tracing::warn!("Failed to read settings for {}: {}", user_id, e);
                return Err(e.into_load_error(&user_id));
            }
        };

        match codec::decode(&bytes) {
            Ok(record) => {
                self.record = record;
                self.state = StoreState::Loaded;
                tracing::debug!("Loaded settings for {}", user_id);
                Ok(&self.record)
            }
            Err(e) => {
                tracing::warn!("Corrupt settings blob for {}: {}", user_id, e);
                self.state = StoreState::Corrupt;
                Err(e)
            }
        }
    }

    /// Validate and atomically persist the in-memory record
    pub fn save(&mut self) -> Result<()> {
        self.ensure_loaded()?;
        let user_id = self.user_id()?.clone();

        self.record.validate()?;
        let bytes = codec::encode(&self.record)?;

        self.local.write_blob(&user_id, &bytes).map_err(|e| {
            tracing::warn!("Failed to save settings for {}: {}", user_id, e);
            match e {
                LocalStoreError::WriteFailed(msg) => SettingsError::StorageWriteFailed(msg),
                other => SettingsError::StorageWriteFailed(other.to_string()),
            }
        })?;

        tracing::debug!("Saved settings for {} ({} bytes)", user_id, bytes.len());
        Ok(())
    }

    /// Borrow the loaded record
    pub fn settings(&self) -> Result<&SettingsRecord> {
        self.ensure_loaded()?;
        Ok(&self.record)
    }

    /// Borrow the loaded record for in-place edits
    pub fn settings_mut(&mut self) -> Result<&mut SettingsRecord> {
        self.ensure_loaded()?;
        Ok(&mut self.record)
    }

    /// Replace the in-memory record with defaults
    ///
    /// This is the explicit way out of the `Corrupt` state: the next
    /// [`Self::save`] overwrites the unreadable blob.
    pub fn reset_to_defaults(&mut self) -> Result<&mut SettingsRecord> {
        let user_id = self.user_id()?;
        if self.state == StoreState::Corrupt {
            tracing::warn!("Discarding corrupt settings for {}", user_id);
        }
        self.record = SettingsRecord::default();
        self.state = StoreState::Loaded;
        Ok(&mut self.record)
    }

    /// Tear down the user context; all later calls fail with `Unbound`
    pub fn unbind(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::debug!("Unbinding settings for {}", user.user_id());
        }
        self.record = SettingsRecord::default();
        self.state = StoreState::Unbound;
    }

    /// Whether biometric unlock is provisioned in the secure store
    pub fn touch_id_enabled(&self) -> bool {
        match self.user_id() {
            Ok(user_id) => self.secure.is_biometric_enabled(user_id),
            Err(_) => false,
        }
    }

    /// Guard the user's credential behind biometric authentication
    pub fn enable_touch_id(&self) -> Result<()> {
        let user = self.user.as_ref().ok_or(SettingsError::Unbound)?;
        let user_id = user.user_id();

        self.secure
            .provision_biometric(user_id, user.credential())
            .map_err(|e| {
                tracing::warn!("Biometric provisioning for {} refused: {}", user_id, e);
                SettingsError::from(e)
            })?;

        if !self.secure.is_biometric_enabled(user_id) {
            return Err(SettingsError::BiometricProvisionFailed(
                "secure store did not confirm provisioning".to_string(),
            ));
        }

        tracing::info!("Biometric unlock enabled for {}", user_id);
        Ok(())
    }

    /// Remove the biometric-guarded credential; no-op if not enabled
    pub fn disable_touch_id(&self) -> Result<()> {
        let user_id = self.user_id()?;
        self.secure
            .revoke_biometric(user_id)
            .map_err(|e| SettingsError::BiometricProvisionFailed(e.to_string()))?;
        tracing::info!("Biometric unlock disabled for {}", user_id);
        Ok(())
    }

    fn ensure_loaded(&self) -> Result<()> {
        match self.state {
            StoreState::Loaded => Ok(()),
            StoreState::Unloaded => Err(SettingsError::NotLoaded),
            StoreState::Corrupt => Err(SettingsError::CorruptData(
                "stored settings are corrupt; reset before saving".to_string(),
            )),
            StoreState::Unbound => Err(SettingsError::Unbound),
        }
    }
}
