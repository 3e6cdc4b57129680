//! Settings store over the encrypted backends
//!
//! Tests cover:
//! - save/load through SQLCipher + sealed blobs
//! - blobs unreadable at rest
//! - file store atomicity with leftover temp files
//! - biometric enable/disable through the keystore secure store

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use wallet_settings_core::{
    CurrencyCode, DenominationKind, ExchangeRateSource, LocalStore, MemorySecureStore,
    SettingsError, SettingsRecord, SettingsStore, StoreState, UserContext, UserId,
};
use wallet_settings_sqlite::{
    Database, EncryptionAlgorithm, EncryptionKey, FileLocalStore, KeystoreSecureStore, MasterKey,
    MockKeystore, SharedDatabase, SqliteLocalStore,
};

const DB_KEY: [u8; 32] = [0x11; 32];
const BLOB_KEY: [u8; 32] = [0x22; 32];

fn open_db(dir: &TempDir) -> SharedDatabase {
    Database::open_shared(
        dir.path().join("settings.db"),
        &EncryptionKey::from_bytes(DB_KEY),
        MasterKey::from_bytes(&BLOB_KEY, EncryptionAlgorithm::ChaCha20Poly1305).unwrap(),
    )
    .unwrap()
}

fn user(name: &str) -> UserContext {
    UserContext::new(UserId::new(name).unwrap(), "unlock-credential")
}

fn customized() -> SettingsRecord {
    let mut record = SettingsRecord::default();
    record.auto_logout_minutes = 15;
    record.default_currency_code = CurrencyCode::Cad;
    record.set_denomination(DenominationKind::Milli);
    record.full_name = Some("Ada Lovelace".to_string());
    record.pin = Some("1815".to_string());
    record.set_exchange_rate_source(ExchangeRateSource::BraveNewCoin);
    record.require_pin_above(1_000_000);
    record
}

// =============================================================================
// SQLite local store
// =============================================================================

#[test]
fn test_sqlite_round_trip_across_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let db = open_db(&dir);
        let mut store = SettingsStore::new(
            user("alice"),
            Arc::new(SqliteLocalStore::new(db)),
            Arc::new(MemorySecureStore::with_biometrics()),
        );
        assert!(matches!(store.load(), Err(SettingsError::NotFound(_))));
        *store.settings_mut().unwrap() = customized();
        store.save().unwrap();
    }

    let db = open_db(&dir);
    let mut store = SettingsStore::new(
        user("alice"),
        Arc::new(SqliteLocalStore::new(db)),
        Arc::new(MemorySecureStore::with_biometrics()),
    );
    assert_eq!(store.load().unwrap(), &customized());
}

#[test]
fn test_sqlite_blob_encrypted_at_rest() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    let local = SqliteLocalStore::new(db);
    let alice = UserId::new("alice").unwrap();

    let mut store = SettingsStore::new(
        user("alice"),
        Arc::new(local.clone()),
        Arc::new(MemorySecureStore::with_biometrics()),
    );
    let _ = store.load();
    *store.settings_mut().unwrap() = customized();
    store.save().unwrap();

    let row = local.load_row(&alice).unwrap().unwrap();
    let needle = b"Lovelace";
    assert!(!row.blob.windows(needle.len()).any(|w| w == needle));

    let file = fs::read(dir.path().join("settings.db")).unwrap();
    assert!(!file.windows(needle.len()).any(|w| w == needle));
    assert!(!file.starts_with(b"SQLite format 3"));
}

#[test]
fn test_sqlite_wrong_blob_key_reads_as_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    {
        let local = SqliteLocalStore::new(open_db(&dir));
        local
            .write_blob(&UserId::new("alice").unwrap(), b"{\"version\":1,\"settings\":{}}")
            .unwrap();
    }

    let db = Database::open_shared(
        dir.path().join("settings.db"),
        &EncryptionKey::from_bytes(DB_KEY),
        MasterKey::generate(EncryptionAlgorithm::ChaCha20Poly1305),
    )
    .unwrap();
    let mut store = SettingsStore::new(
        user("alice"),
        Arc::new(SqliteLocalStore::new(db)),
        Arc::new(MemorySecureStore::with_biometrics()),
    );
    assert!(matches!(store.load(), Err(SettingsError::CorruptData(_))));
    assert_eq!(store.state(), StoreState::Corrupt);
    assert!(store.save().is_err());
}

// =============================================================================
// File local store
// =============================================================================

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let local = Arc::new(FileLocalStore::new(dir.path()).unwrap());
    let secure = Arc::new(MemorySecureStore::with_biometrics());

    let mut store = SettingsStore::new(user("alice"), local.clone(), secure.clone());
    let _ = store.load();
    *store.settings_mut().unwrap() = customized();
    store.save().unwrap();

    let mut fresh = SettingsStore::new(user("alice"), local, secure);
    assert_eq!(fresh.load().unwrap(), &customized());
}

#[test]
fn test_file_store_ignores_stray_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let local = Arc::new(FileLocalStore::new(dir.path()).unwrap());
    let secure = Arc::new(MemorySecureStore::with_biometrics());

    let mut store = SettingsStore::new(user("alice"), local.clone(), secure.clone());
    let _ = store.load();
    store.save().unwrap();

    // Interrupted write: a half-written temp file next to the real one
    fs::write(dir.path().join(".tmpAbC123"), b"{\"version\":1,\"sett").unwrap();

    let mut fresh = SettingsStore::new(user("alice"), local.clone(), secure.clone());
    assert_eq!(fresh.load().unwrap(), &SettingsRecord::default());

    *fresh.settings_mut().unwrap() = customized();
    fresh.save().unwrap();
    let mut again = SettingsStore::new(user("alice"), local, secure);
    assert_eq!(again.load().unwrap(), &customized());
}

#[test]
fn test_file_store_truncated_file_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let local = Arc::new(FileLocalStore::new(dir.path()).unwrap());
    let alice = UserId::new("alice").unwrap();
    fs::write(local.path_for(&alice), b"{\"version\":1,\"settings\":{\"pin\":\"12").unwrap();

    let mut store = SettingsStore::new(
        user("alice"),
        local,
        Arc::new(MemorySecureStore::with_biometrics()),
    );
    assert!(matches!(store.load(), Err(SettingsError::CorruptData(_))));
}

// =============================================================================
// Keystore secure store
// =============================================================================

#[test]
fn test_touch_id_through_keystore() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    let keystore = Arc::new(MockKeystore::with_biometrics());
    let secure = Arc::new(KeystoreSecureStore::new(keystore, db.clone()));
    let local = Arc::new(SqliteLocalStore::new(db));
    let alice = UserId::new("alice").unwrap();

    let mut store = SettingsStore::new(user("alice"), local.clone(), secure.clone());
    let _ = store.load();
    store.save().unwrap();
    let before = local.load_row(&alice).unwrap().unwrap().blob;

    assert!(!store.touch_id_enabled());
    store.enable_touch_id().unwrap();
    assert!(store.touch_id_enabled());

    let credential = secure.unlock(&alice, "Unlock").ok().unwrap();
    assert_eq!(credential.as_str(), "unlock-credential");

    store.disable_touch_id().unwrap();
    store.disable_touch_id().unwrap();
    assert!(!store.touch_id_enabled());

    // Biometric state lives beside the blob, never in it
    assert_eq!(local.load_row(&alice).unwrap().unwrap().blob, before);
}

#[test]
fn test_touch_id_without_hardware() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    let secure = Arc::new(KeystoreSecureStore::new(Arc::new(MockKeystore::new()), db.clone()));
    let store = SettingsStore::new(user("alice"), Arc::new(SqliteLocalStore::new(db)), secure);

    assert!(matches!(
        store.enable_touch_id(),
        Err(SettingsError::UnsupportedCapability(_))
    ));
    assert!(!store.touch_id_enabled());
    store.disable_touch_id().unwrap();
}

#[test]
fn test_touch_id_is_per_user() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    let secure = Arc::new(KeystoreSecureStore::new(
        Arc::new(MockKeystore::with_biometrics()),
        db.clone(),
    ));
    let local = Arc::new(SqliteLocalStore::new(db));

    let alice = SettingsStore::new(user("alice"), local.clone(), secure.clone());
    let bob = SettingsStore::new(user("bob"), local, secure);
    alice.enable_touch_id().unwrap();
    assert!(alice.touch_id_enabled());
    assert!(!bob.touch_id_enabled());
}
