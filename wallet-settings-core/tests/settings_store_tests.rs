//! Settings store lifecycle tests
//!
//! Tests cover:
//! - save/load round trip on a fresh instance
//! - first-run defaults vs corrupt data
//! - validation failures leave the stored blob untouched
//! - biometric enable/disable/query through the secure store
//! - storage faults never expose a half-updated record

use std::sync::Arc;

use wallet_settings_core::{
    codec, CurrencyCode, DenominationKind, ExchangeRateSource, MemoryLocalStore,
    MemorySecureStore, SettingsError, SettingsField, SettingsRecord, SettingsStore, StoreState,
    UserContext, UserId,
};

fn user(name: &str) -> UserContext {
    UserContext::new(UserId::new(name).unwrap(), "unlock-credential")
}

fn open(
    name: &str,
    local: &Arc<MemoryLocalStore>,
    secure: &Arc<MemorySecureStore>,
) -> SettingsStore {
    SettingsStore::new(user(name), local.clone(), secure.clone())
}

fn customized() -> SettingsRecord {
    let mut record = SettingsRecord::default();
    record.auto_logout_minutes = 5;
    record.default_currency_code = CurrencyCode::Eur;
    record.set_denomination(DenominationKind::Micro);
    record.first_name = Some("Satoshi".to_string());
    record.last_name = Some("Nakamoto".to_string());
    record.nick_name = None;
    record.full_name = Some("Satoshi Nakamoto".to_string());
    record.pin = Some("2140".to_string());
    record.set_exchange_rate_source(ExchangeRateSource::Coinbase);
    record.show_name_on_payments = true;
    record.require_pin_above(250_000);
    record.pin_login_disabled = true;
    record
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_save_then_load_on_fresh_instance() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());

    let mut store = open("alice", &local, &secure);
    let _ = store.load();
    *store.settings_mut().unwrap() = customized();
    store.save().unwrap();

    let mut fresh = open("alice", &local, &secure);
    assert_eq!(fresh.load().unwrap(), &customized());
    assert_eq!(fresh.state(), StoreState::Loaded);
}

#[test]
fn test_field_mutation_persists() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());

    let mut store = open("alice", &local, &secure);
    let _ = store.load();
    store.settings_mut().unwrap().nick_name = Some("sats".to_string());
    store.save().unwrap();

    store.settings_mut().unwrap().auto_logout_minutes = 0;
    store.save().unwrap();

    let mut fresh = open("alice", &local, &secure);
    let record = fresh.load().unwrap();
    assert_eq!(record.nick_name.as_deref(), Some("sats"));
    assert_eq!(record.auto_logout_minutes, 0);
}

#[test]
fn test_users_do_not_share_settings() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());

    let mut alice = open("alice", &local, &secure);
    let _ = alice.load();
    alice.settings_mut().unwrap().auto_logout_minutes = 1;
    alice.save().unwrap();

    let mut bob = open("bob", &local, &secure);
    assert!(matches!(bob.load(), Err(SettingsError::NotFound(_))));
    assert_eq!(bob.settings().unwrap().auto_logout_minutes, 60);
}

// =============================================================================
// Load outcomes
// =============================================================================

#[test]
fn test_never_saved_user_gets_defaults_and_not_found() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());
    let mut store = open("newcomer", &local, &secure);

    let err = store.load().unwrap_err();
    assert!(matches!(err, SettingsError::NotFound(_)));
    assert!(err.is_recoverable());
    assert_eq!(store.settings().unwrap(), &SettingsRecord::default());
    assert_eq!(local.write_count(), 0, "load must never write");
}

#[test]
fn test_malformed_blob_is_corrupt_not_found() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());
    local.put_raw(&UserId::new("alice").unwrap(), b"\x00\x01 not json".to_vec());

    let mut store = open("alice", &local, &secure);
    let err = store.load().unwrap_err();
    assert!(matches!(err, SettingsError::CorruptData(_)));
    assert!(!err.is_recoverable());
    assert!(store.settings().is_err());
}

#[test]
fn test_partial_blob_fills_defaults() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());
    local.put_raw(
        &UserId::new("alice").unwrap(),
        br#"{"version":1,"settings":{"defaultCurrencyCode":"JPY"}}"#.to_vec(),
    );

    let mut store = open("alice", &local, &secure);
    let record = store.load().unwrap();
    assert_eq!(record.default_currency_code, CurrencyCode::Jpy);
    assert_eq!(record.auto_logout_minutes, 60);
    assert_eq!(record.denomination_kind, DenominationKind::Full);
    assert!(!record.spend_requires_pin);
}

#[test]
fn test_kind_only_blob_loads_and_saves_unchanged() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());
    local.put_raw(
        &UserId::new("alice").unwrap(),
        br#"{"version":1,"settings":{"denominationKind":"milli"}}"#.to_vec(),
    );

    let mut store = open("alice", &local, &secure);
    let record = store.load().unwrap();
    assert_eq!(record.denomination_kind, DenominationKind::Milli);
    assert_eq!(record.denomination_units, 100_000);
    assert_eq!(record.denomination_label, "mBTC");

    store.save().unwrap();
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_spend_pin_without_threshold_rejected_without_write() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());
    let alice = UserId::new("alice").unwrap();

    let mut store = open("alice", &local, &secure);
    let _ = store.load();
    store.save().unwrap();
    let before = local.raw(&alice).unwrap();
    let writes = local.write_count();

    for threshold in [None, Some(-1), Some(i64::MIN)] {
        let record = store.settings_mut().unwrap();
        record.spend_requires_pin = true;
        record.pin_required_above_amount = threshold;

        let err = store.save().unwrap_err();
        assert_eq!(err.field(), Some(SettingsField::PinRequiredAboveAmount));
        assert_eq!(local.raw(&alice).unwrap(), before);
        assert_eq!(local.write_count(), writes);
    }
}

#[test]
fn test_pin_format_left_to_user_context() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());

    let mut store = open("alice", &local, &secure);
    let _ = store.load();
    store.settings_mut().unwrap().pin = Some("123456".to_string());
    store.save().unwrap();

    let mut fresh = open("alice", &local, &secure);
    assert_eq!(fresh.load().unwrap().pin.as_deref(), Some("123456"));
}

#[test]
fn test_inconsistent_denomination_rejected() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());

    let mut store = open("alice", &local, &secure);
    let _ = store.load();
    let record = store.settings_mut().unwrap();
    record.denomination_kind = DenominationKind::Milli;

    let err = store.save().unwrap_err();
    assert!(matches!(err, SettingsError::ValidationFailed { .. }));
    assert_eq!(local.write_count(), 0);
}

// =============================================================================
// Biometric gate
// =============================================================================

#[test]
fn test_disable_touch_id_is_idempotent() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());
    let store = open("alice", &local, &secure);

    store.disable_touch_id().unwrap();
    store.disable_touch_id().unwrap();
    assert!(!store.touch_id_enabled());

    store.enable_touch_id().unwrap();
    store.disable_touch_id().unwrap();
    store.disable_touch_id().unwrap();
    assert!(!store.touch_id_enabled());
}

#[test]
fn test_enable_touch_id_without_hardware() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::without_biometrics());
    let store = open("alice", &local, &secure);

    let err = store.enable_touch_id().unwrap_err();
    assert!(matches!(err, SettingsError::UnsupportedCapability(_)));
    assert!(!store.touch_id_enabled());
}

#[test]
fn test_biometric_state_never_touches_blob() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());
    let mut store = open("alice", &local, &secure);
    let _ = store.load();
    store.save().unwrap();
    let writes = local.write_count();

    store.enable_touch_id().unwrap();
    assert!(store.touch_id_enabled());
    store.disable_touch_id().unwrap();
    assert_eq!(local.write_count(), writes);

    store.enable_touch_id().unwrap();
    store.save().unwrap();
    let blob = local.raw(&UserId::new("alice").unwrap()).unwrap();
    let text = String::from_utf8(blob).unwrap();
    assert!(!text.to_lowercase().contains("biometric"));
    assert!(!text.contains("unlock-credential"));
}

#[test]
fn test_biometric_works_without_loading() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());
    let store = open("alice", &local, &secure);

    assert_eq!(store.state(), StoreState::Unloaded);
    store.enable_touch_id().unwrap();
    assert!(store.touch_id_enabled());
}

// =============================================================================
// Storage faults
// =============================================================================

#[test]
fn test_failed_write_keeps_previous_record() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());

    let mut store = open("alice", &local, &secure);
    let _ = store.load();
    store.save().unwrap();

    *store.settings_mut().unwrap() = customized();
    local.fail_writes("I/O error");
    let err = store.save().unwrap_err();
    assert!(matches!(err, SettingsError::StorageWriteFailed(_)));
    assert!(err.is_recoverable());

    let mut fresh = open("alice", &local, &secure);
    assert_eq!(fresh.load().unwrap(), &SettingsRecord::default());

    // Caller retries once the medium recovers
    local.heal();
    store.save().unwrap();
    let mut fresh = open("alice", &local, &secure);
    assert_eq!(fresh.load().unwrap(), &customized());
}

#[test]
fn test_truncated_blob_never_yields_mixed_record() {
    let local = Arc::new(MemoryLocalStore::new());
    let secure = Arc::new(MemorySecureStore::with_biometrics());
    let alice = UserId::new("alice").unwrap();
    let full = codec::encode(&customized()).unwrap();

    // A torn write from a non-atomic medium must read back as corrupt, never
    // as a record assembled from defaults and a prefix of new fields.
    for cut in 1..full.len() {
        local.put_raw(&alice, full[..cut].to_vec());
        let mut store = open("alice", &local, &secure);
        match store.load() {
            Err(SettingsError::CorruptData(_)) => {}
            Ok(record) => assert_eq!(record, &customized(), "cut at {}", cut),
            Err(other) => panic!("unexpected error at cut {}: {}", cut, other),
        }
    }
}
