//! Encrypted storage backends for wallet settings
//!
//! Production implementations of the [`wallet_settings_core::LocalStore`]
//! and [`wallet_settings_core::SecureStore`] seams.
//!
//! ## Security Features
//!
//! - **Database Encryption**: SQLCipher page encryption keyed by Argon2id
//! - **Blob Sealing**: settings blobs sealed with AES-256-GCM or ChaCha20-Poly1305
//! - **Passphrase KDF**: Argon2id with 64 MiB memory, 3 iterations, 4 lanes
//! - **Biometric Unlock**: unlock credential sealed under a platform keystore key
//! - **Atomic Writes**: single-statement transactions, or temp file + rename

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod database;
pub mod encryption;
pub mod error;
pub mod file_store;
pub mod keystore;
pub mod migrations;
pub mod models;
pub mod security;
pub mod settings_repo;

pub use database::{Database, SharedDatabase};
pub use encryption::EncryptionKey;
pub use error::{Error, Result};
pub use file_store::FileLocalStore;
pub use keystore::{
    BiometricType, KeystoreCapabilities, KeystoreManager, KeystoreResult, KeystoreSecureStore,
    MockKeystore, Platform, PlatformKeystore,
};
pub use models::{BiometricSecretRow, SettingsRow};
pub use security::{
    derive_key_bytes, generate_salt, hash_sha256, EncryptionAlgorithm, MasterKey, SealedKey,
};
pub use settings_repo::SqliteLocalStore;
