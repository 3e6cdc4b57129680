//! Settings blob encoding
//!
//! Pure functions between [`SettingsRecord`] and the persisted bytes, kept
//! apart from any storage transport. The blob is a versioned JSON envelope:
//!
//! ```json
//! { "version": 1, "settings": { "autoLogoutMinutes": 60, ... } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};
use crate::record::SettingsRecord;

/// Current blob schema version
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    settings: &'a SettingsRecord,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    #[serde(default = "empty_settings")]
    settings: serde_json::Value,
}

fn empty_settings() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Serialize a record into a settings blob
pub fn encode(record: &SettingsRecord) -> Result<Vec<u8>> {
    serde_json::to_vec(&EnvelopeRef {
        version: SCHEMA_VERSION,
        settings: record,
    })
    .map_err(|e| SettingsError::StorageWriteFailed(format!("Failed to encode settings: {}", e)))
}

/// Parse a settings blob; missing keys take their defaults
///
/// Missing denomination units and labels follow the stored
/// `denominationKind`, so a partial blob still satisfies the record
/// invariants.
pub fn decode(bytes: &[u8]) -> Result<SettingsRecord> {
    let envelope: Envelope = serde_json::from_slice(bytes)
        .map_err(|e| SettingsError::CorruptData(format!("Failed to parse settings: {}", e)))?;

    if envelope.version == 0 || envelope.version > SCHEMA_VERSION {
        return Err(SettingsError::CorruptData(format!(
            "Unsupported settings schema version {} (supported: 1..={})",
            envelope.version, SCHEMA_VERSION
        )));
    }

    let mut record = SettingsRecord::deserialize(&envelope.settings)
        .map_err(|e| SettingsError::CorruptData(format!("Failed to parse settings: {}", e)))?;

    let kind = record.denomination_kind;
    let named = |key: &str| envelope.settings.get(key).is_some();
    if !named("denominationUnits") {
        record.denomination_units = kind.units();
    }
    if !named("denominationLabel") {
        record.denomination_label = kind.label().to_string();
    }
    if !named("denominationLabelShort") {
        record.denomination_label_short = kind.short_label().to_string();
    }

    Ok(record)
}
