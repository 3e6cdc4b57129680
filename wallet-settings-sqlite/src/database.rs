//! Database connection and initialization

use crate::{encryption::EncryptionKey, migrations, security::MasterKey, Error, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::Arc;

/// Database handle shared between the local and secure stores
pub type SharedDatabase = Arc<Mutex<Database>>;

/// Database connection wrapper
pub struct Database {
    conn: Connection,
    master_key: MasterKey,
}

impl Database {
    /// Open database with encryption
    ///
    /// The page key is applied before any other statement; an existing file
    /// that cannot be read with `key` is rejected rather than overwritten.
    pub fn open<P: AsRef<Path>>(path: P, key: &EncryptionKey, master_key: MasterKey) -> Result<Self> {
        let path = path.as_ref();
        let db_exists = path.exists();

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        apply_key(&conn, key)?;
        verify_cipher(&conn)?;

        // Journal mode touches the file header, so a bad key has to be
        // caught first.
        if db_exists {
            verify_readable(&conn, path)?;
        }

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=OFF;")?;

        migrations::run_migrations(&conn)?;
        tracing::debug!("Opened settings database at {}", path.display());

        Ok(Self { conn, master_key })
    }

    /// Open and wrap for sharing between stores
    pub fn open_shared<P: AsRef<Path>>(
        path: P,
        key: &EncryptionKey,
        master_key: MasterKey,
    ) -> Result<SharedDatabase> {
        Ok(Arc::new(Mutex::new(Self::open(path, key, master_key)?)))
    }

    /// Get connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Get master key for field-level encryption
    pub fn master_key(&self) -> &MasterKey {
        &self.master_key
    }

    /// Begin transaction
    pub fn transaction(&mut self) -> Result<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

// PRAGMA statements may hand back a row; rusqlite reports that as an error.
fn apply_key(conn: &Connection, key: &EncryptionKey) -> Result<()> {
    let key_hex = hex::encode(key.as_bytes());
    if let Err(e) = conn.execute(&format!("PRAGMA key = \"x'{}'\";", key_hex), []) {
        if !e.to_string().contains("Execute returned results") {
            return Err(Error::Encryption(format!(
                "Failed to set database encryption key: {}",
                e
            )));
        }
    }
    Ok(())
}

fn verify_cipher(conn: &Connection) -> Result<()> {
    let version: std::result::Result<String, rusqlite::Error> =
        conn.query_row("PRAGMA cipher_version", [], |row| row.get(0));

    match version {
        Ok(version) if !version.is_empty() => {
            tracing::debug!("SQLCipher version: {}", version);
            Ok(())
        }
        _ => Err(Error::Encryption(
            "SQLCipher encryption verification failed".to_string(),
        )),
    }
}

fn verify_readable(conn: &Connection, path: &Path) -> Result<()> {
    let readable: std::result::Result<i64, rusqlite::Error> =
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0));
    if readable.is_ok() {
        return Ok(());
    }

    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if file_size < 100 {
        tracing::warn!(
            "Database file exists but is too small ({} bytes), may be corrupted",
            file_size
        );
        return Err(Error::Encryption(
            "Database file appears to be corrupted".to_string(),
        ));
    }

    Err(Error::Encryption(
        "Cannot read database: wrong key or not a settings database".to_string(),
    ))
}
