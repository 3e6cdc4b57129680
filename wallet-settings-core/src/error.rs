//! Error types for wallet settings
//!
//! Every failure crosses the component boundary as a value; none of these
//! conditions is fatal to the host process.

use std::fmt;

use crate::record::SettingsField;

/// Result type
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// No settings were ever saved for this user (first run)
    #[error("No settings found for user {0}")]
    NotFound(String),

    /// Persisted settings are malformed and must not be silently overwritten
    #[error("Corrupt settings data: {0}")]
    CorruptData(String),

    /// A field violates a record invariant; nothing was written
    #[error("Invalid value for {field}: {reason}")]
    ValidationFailed {
        /// Offending field
        field: SettingsField,
        /// Why the value was rejected
        reason: String,
    },

    /// The persistence medium rejected the write
    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    /// The persistence medium failed while reading
    #[error("Storage read failed: {0}")]
    StorageReadFailed(String),

    /// The device lacks the requested capability (e.g. biometric hardware)
    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(String),

    /// The secure store did not confirm biometric provisioning
    #[error("Biometric provisioning failed: {0}")]
    BiometricProvisionFailed(String),

    /// Settings have not been loaded for this user context yet
    #[error("Settings not loaded")]
    NotLoaded,

    /// The user context has been torn down
    #[error("Settings store is no longer bound to a user")]
    Unbound,

    /// A user context cannot be built from this identity
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),
}

impl SettingsError {
    /// Shorthand for a validation failure on `field`
    pub fn invalid(field: SettingsField, reason: impl Into<String>) -> Self {
        SettingsError::ValidationFailed {
            field,
            reason: reason.into(),
        }
    }

    /// Check if the caller can recover without user intervention
    /// (fall back to defaults, fix a field, or retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SettingsError::NotFound(_)
                | SettingsError::ValidationFailed { .. }
                | SettingsError::StorageWriteFailed(_)
                | SettingsError::StorageReadFailed(_)
                | SettingsError::BiometricProvisionFailed(_)
        )
    }

    /// Get the offending field of a validation failure
    pub fn field(&self) -> Option<SettingsField> {
        match self {
            SettingsError::ValidationFailed { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            SettingsError::NotFound(_) => {
                "No saved settings were found. Default settings will be used.".to_string()
            }
            SettingsError::CorruptData(_) => {
                "Your saved settings could not be read. Review them before saving again.".to_string()
            }
            SettingsError::StorageWriteFailed(_) => {
                "Settings could not be saved. Please try again.".to_string()
            }
            SettingsError::UnsupportedCapability(_) => {
                "This device does not support biometric unlock.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            SettingsError::NotFound(_) | SettingsError::CorruptData(_) => ErrorCategory::Data,
            SettingsError::ValidationFailed { .. } => ErrorCategory::Validation,
            SettingsError::StorageWriteFailed(_) | SettingsError::StorageReadFailed(_) => {
                ErrorCategory::Storage
            }
            SettingsError::UnsupportedCapability(_) | SettingsError::BiometricProvisionFailed(_) => {
                ErrorCategory::Biometric
            }
            SettingsError::NotLoaded | SettingsError::Unbound | SettingsError::InvalidUserId(_) => {
                ErrorCategory::Lifecycle
            }
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Persisted data missing or unreadable
    Data,
    /// Field validation
    Validation,
    /// Persistence medium
    Storage,
    /// Secure store / biometric gate
    Biometric,
    /// Store used outside its lifecycle
    Lifecycle,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Data => write!(f, "Data"),
            ErrorCategory::Validation => write!(f, "Validation"),
            ErrorCategory::Storage => write!(f, "Storage"),
            ErrorCategory::Biometric => write!(f, "Biometric"),
            ErrorCategory::Lifecycle => write!(f, "Lifecycle"),
        }
    }
}
