//! Row types

use chrono::{DateTime, Utc};

/// Stored settings blob for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRow {
    /// User identifier
    pub user_id: String,
    /// Encrypted settings blob
    pub blob: Vec<u8>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

/// Sealed biometric unlock secret for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiometricSecretRow {
    /// User identifier
    pub user_id: String,
    /// Platform keystore key identifier
    pub key_id: String,
    /// Serialized [`crate::SealedKey`]
    pub sealed: Vec<u8>,
    /// Provisioning time
    pub created_at: DateTime<Utc>,
}

pub(crate) fn parse_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}
