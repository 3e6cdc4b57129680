//! File-per-user settings store

use crate::security::{hash_sha256, MasterKey};
use crate::{Error, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use wallet_settings_core::{LocalStore, LocalStoreError, UserId};

const FILE_EXTENSION: &str = "settings";

/// [`LocalStore`] keeping one file per user in a directory
///
/// Writes land in a temp file beside the target, are synced, then renamed
/// over it. Leftover temp files from an interrupted write are ignored. A
/// failed directory sync after the rename is logged, not reported, since
/// the new blob is already what `read_blob` returns.
pub struct FileLocalStore {
    dir: PathBuf,
    master_key: Option<MasterKey>,
}

impl FileLocalStore {
    /// Plaintext store rooted at `dir` (created if missing)
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            master_key: None,
        })
    }

    /// Store that seals every blob with `master_key`
    pub fn encrypted<P: AsRef<Path>>(dir: P, master_key: MasterKey) -> Result<Self> {
        let mut store = Self::new(dir)?;
        store.master_key = Some(master_key);
        Ok(store)
    }

    /// Directory holding the settings files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `user`'s settings
    pub fn path_for(&self, user: &UserId) -> PathBuf {
        let name = hex::encode(hash_sha256(user.as_str().as_bytes()));
        self.dir.join(format!("{}.{}", name, FILE_EXTENSION))
    }

    fn read(&self, user: &UserId) -> Result<Vec<u8>> {
        let path = self.path_for(user);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        match &self.master_key {
            Some(key) => key.decrypt(&bytes),
            None => Ok(bytes),
        }
    }

    fn write(&self, user: &UserId, bytes: &[u8]) -> Result<()> {
        let payload = match &self.master_key {
            Some(key) => key.encrypt(bytes)?,
            None => bytes.to_vec(),
        };

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&payload)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(user)).map_err(|e| Error::Io(e.error))?;

        // The rename is already visible; only its durability is in doubt.
        if let Err(e) = sync_dir(&self.dir) {
            tracing::warn!("Failed to sync {}: {}", self.dir.display(), e);
        }
        Ok(())
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

impl LocalStore for FileLocalStore {
    fn read_blob(&self, user: &UserId) -> std::result::Result<Vec<u8>, LocalStoreError> {
        self.read(user).map_err(|e| match e {
            Error::NotFound(_) => LocalStoreError::NotFound,
            other => {
                tracing::warn!("Failed to read settings file for {}: {}", user, other);
                other.into_read_error()
            }
        })
    }

    fn write_blob(&self, user: &UserId, bytes: &[u8]) -> std::result::Result<(), LocalStoreError> {
        self.write(user, bytes).map_err(|e| {
            tracing::warn!("Failed to write settings file for {}: {}", user, e);
            e.into_write_error()
        })
    }
}
