//! # File Key Store
//!
//! Keeps the active C2 private key in a single file and the rotation backup
//! next to it at `<path>.old`.
//!
//! ## Atomic Swap
//!
//! Every write goes to `<file>.tmp`, is flushed to disk, then renamed over the
//! target. A crash leaves either the old file or the new one in place.

use crate::domain::errors::KeyStoreError;
use crate::ports::outbound::{C2KeyStore, C2Secret};
use shared_types::CURVE25519_KEY_LEN;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroizing;

/// Suffix of the rotation backup file.
pub const BACKUP_SUFFIX: &str = ".old";

const TEMP_SUFFIX: &str = ".tmp";

/// File-backed [`C2KeyStore`].
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
    backup_path: PathBuf,
}

impl FileKeyStore {
    /// Store the active key at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let backup_path = with_suffix(&path, BACKUP_SUFFIX);
        Self { path, backup_path }
    }

    /// Location of the active key.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the rotation backup.
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }
}

impl C2KeyStore for FileKeyStore {
    fn load_active(&self) -> Result<Option<C2Secret>, KeyStoreError> {
        read_secret(&self.path)
    }

    fn store_active(&self, secret: &[u8; CURVE25519_KEY_LEN]) -> Result<(), KeyStoreError> {
        write_atomic(&self.path, secret)
    }

    fn store_backup(&self, secret: &[u8; CURVE25519_KEY_LEN]) -> Result<(), KeyStoreError> {
        write_atomic(&self.backup_path, secret)
    }

    fn load_backup(&self) -> Result<Option<C2Secret>, KeyStoreError> {
        read_secret(&self.backup_path)
    }

    fn delete_backup(&self) -> Result<(), KeyStoreError> {
        match fs::remove_file(&self.backup_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn read_secret(path: &Path) -> Result<Option<C2Secret>, KeyStoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => Zeroizing::new(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let secret: [u8; CURVE25519_KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
        KeyStoreError::Corrupt(format!(
            "{}: expected {} bytes, found {}",
            path.display(),
            CURVE25519_KEY_LEN,
            bytes.len()
        ))
    })?;
    Ok(Some(Zeroizing::new(secret)))
}

fn write_atomic(path: &Path, secret: &[u8; CURVE25519_KEY_LEN]) -> Result<(), KeyStoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp = with_suffix(path, TEMP_SUFFIX);
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&temp)?;
    file.write_all(secret)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp, path)?;
    debug!(path = %path.display(), "C2 key file written");
    Ok(())
}
