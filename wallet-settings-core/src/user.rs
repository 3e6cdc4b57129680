//! Authenticated user context
//!
//! A settings store is bound to exactly one of these. The context owns the
//! unlock credential used when provisioning biometric unlock, and it is the
//! place where PIN format is checked.

use std::fmt;
use zeroize::Zeroizing;

use crate::error::{Result, SettingsError};
use crate::record::SettingsField;

/// Required PIN length
pub const PIN_LENGTH: usize = 4;

/// User identity (trimmed, non-empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// Create a user id
    pub fn new(id: impl AsRef<str>) -> Result<Self> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            return Err(SettingsError::InvalidUserId("user id is empty".to_string()));
        }
        Ok(Self(id.to_string()))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One authenticated identity within the host application
pub struct UserContext {
    user_id: UserId,
    credential: Zeroizing<String>,
}

impl UserContext {
    /// Create a context for `user_id` unlocked with `credential`
    pub fn new(user_id: UserId, credential: impl Into<String>) -> Self {
        Self {
            user_id,
            credential: Zeroizing::new(credential.into()),
        }
    }

    /// Get user id
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Get unlock credential
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Check PIN format: exactly [`PIN_LENGTH`] ASCII digits
    pub fn check_pin_format(pin: &str) -> Result<()> {
        if pin.len() != PIN_LENGTH || !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(SettingsError::invalid(
                SettingsField::Pin,
                format!("PIN must be exactly {} digits", PIN_LENGTH),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for UserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserContext")
            .field("user_id", &self.user_id)
            .field("credential", &"<redacted>")
            .finish()
    }
}
