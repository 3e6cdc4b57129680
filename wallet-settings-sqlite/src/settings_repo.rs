//! SQLite-backed settings blobs

use crate::database::SharedDatabase;
use crate::models::{parse_timestamp, SettingsRow};
use crate::{Error, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use wallet_settings_core::{LocalStore, LocalStoreError, UserId};

/// [`LocalStore`] over the `user_settings` table
///
/// Blobs are sealed with the database master key on top of SQLCipher page
/// encryption. Each write is a single UPSERT in its own transaction.
#[derive(Clone)]
pub struct SqliteLocalStore {
    db: SharedDatabase,
}

impl SqliteLocalStore {
    /// Create store over an open database
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    /// Load the raw (still encrypted) row for `user`
    pub fn load_row(&self, user: &UserId) -> Result<Option<SettingsRow>> {
        let db = self.db.lock();
        let row = db
            .conn()
            .query_row(
                "SELECT user_id, blob, updated_at FROM user_settings WHERE user_id = ?1",
                [user.as_str()],
                |row| {
                    let updated_at: String = row.get(2)?;
                    Ok(SettingsRow {
                        user_id: row.get(0)?,
                        blob: row.get(1)?,
                        updated_at: parse_timestamp(&updated_at)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Decrypted blob for `user`
    pub fn read(&self, user: &UserId) -> Result<Vec<u8>> {
        let row = self
            .load_row(user)?
            .ok_or_else(|| Error::NotFound(format!("settings for {}", user)))?;
        let db = self.db.lock();
        db.master_key().decrypt(&row.blob)
    }

    /// Encrypt and upsert the blob for `user`
    pub fn write(&self, user: &UserId, bytes: &[u8]) -> Result<()> {
        let mut db = self.db.lock();
        let sealed = db.master_key().encrypt(bytes)?;
        let now = Utc::now().to_rfc3339();

        let tx = db.transaction()?;
        tx.execute(
            "INSERT INTO user_settings (user_id, blob, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET blob = excluded.blob, updated_at = excluded.updated_at",
            params![user.as_str(), sealed, now],
        )?;
        tx.commit()?;

        tracing::debug!("Stored settings blob for {} ({} bytes)", user, bytes.len());
        Ok(())
    }

    /// Remove stored settings for `user`; returns whether a row existed
    pub fn delete(&self, user: &UserId) -> Result<bool> {
        let db = self.db.lock();
        let removed = db
            .conn()
            .execute("DELETE FROM user_settings WHERE user_id = ?1", [user.as_str()])?;
        Ok(removed > 0)
    }

    /// Users with stored settings, sorted
    pub fn users(&self) -> Result<Vec<String>> {
        let db = self.db.lock();
        let mut stmt = db
            .conn()
            .prepare("SELECT user_id FROM user_settings ORDER BY user_id")?;
        let users = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(users)
    }
}

impl LocalStore for SqliteLocalStore {
    fn read_blob(&self, user: &UserId) -> std::result::Result<Vec<u8>, LocalStoreError> {
        self.read(user).map_err(|e| {
            if !matches!(e, Error::NotFound(_)) {
                tracing::warn!("Failed to read settings for {}: {}", user, e);
            }
            e.into_read_error()
        })
    }

    fn write_blob(&self, user: &UserId, bytes: &[u8]) -> std::result::Result<(), LocalStoreError> {
        self.write(user, bytes).map_err(|e| {
            tracing::warn!("Failed to write settings for {}: {}", user, e);
            e.into_write_error()
        })
    }
}
