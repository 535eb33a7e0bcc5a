#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use zeroize::Zeroizing;

/// Errors from a credential store.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing slot failed.
    #[error("credential store I/O: {0}")]
    Io(#[from] io::Error),
}

/// An API credential held in memory.
///
/// The only way to read the value is [`Credential::as_str`]. `Debug` is
/// redacted, and there is intentionally no `Display`, `Clone`, or
/// `Serialize`. Memory is zeroed on drop via [`Zeroizing`].
pub struct Credential {
    inner: Zeroizing<String>,
}

impl Credential {
    /// Wrap a credential value. The input is moved, not copied.
    pub fn new(value: String) -> Self {
        Self {
            inner: Zeroizing::new(value),
        }
    }

    /// Borrow the credential, e.g. for a request header.
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// A single named credential slot.
///
/// Implementations hold exactly one string value. Blank values (empty or
/// whitespace-only) read back as `None`, so callers never distinguish
/// "absent" from "empty".
pub trait CredentialStore: Send + Sync {
    /// Read the stored credential, if any.
    fn get(&self) -> Result<Option<Credential>, StoreError>;

    /// Store a credential, replacing any previous value.
    fn set(&self, value: &str) -> Result<(), StoreError>;

    /// Remove the stored credential. Clearing an empty slot is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Normalize a raw slot value: blank reads as `None`.
fn non_blank(value: &str) -> Option<Credential> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(Credential::new(trimmed.to_string()))
    }
}

/// Persists the credential as a file `<dir>/<name>`.
///
/// `set` writes to a temporary file and renames it into place, so readers
/// never observe a partial value. The directory is created on first `set`.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by `<dir>/<name>`.
    pub fn new(dir: impl AsRef<Path>, name: &str) -> Self {
        Self {
            path: dir.as_ref().join(name),
        }
    }

    /// Create a store under the user's config directory, e.g.
    /// `~/.config/<app>/<name>` on Linux. Returns `None` when the platform
    /// reports no config directory.
    pub fn in_config_dir(app: &str, name: &str) -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join(app), name))
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<Credential>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(non_blank(&contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, value: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory credential slot for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with a value.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: Mutex::new(Some(value.to_string())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.value.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.slot().as_deref().and_then(non_blank))
    }

    fn set(&self, value: &str) -> Result<(), StoreError> {
        *self.slot() = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("sk-super-secret".into());
        let debug = format!("{credential:?}");
        assert_eq!(debug, "[REDACTED]");
        assert!(!debug.contains("sk-super-secret"));
    }

    #[test]
    fn credential_exposes_value_through_as_str() {
        let credential = Credential::new("sk-test".into());
        assert_eq!(credential.as_str(), "sk-test");
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert!(store.get().unwrap().is_none());

        store.set("sk-abc").unwrap();
        assert_eq!(store.get().unwrap().unwrap().as_str(), "sk-abc");

        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn memory_store_blank_value_reads_as_none() {
        let store = MemoryCredentialStore::with_value("   ");
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn memory_store_trims_stored_value() {
        let store = MemoryCredentialStore::with_value("  sk-abc\n");
        assert_eq!(store.get().unwrap().unwrap().as_str(), "sk-abc");
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path(), "api-key");

        assert!(store.get().unwrap().is_none());

        store.set("sk-file").unwrap();
        assert_eq!(store.get().unwrap().unwrap().as_str(), "sk-file");

        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested/deeper"), "api-key");
        store.set("sk-nested").unwrap();
        assert_eq!(store.get().unwrap().unwrap().as_str(), "sk-nested");
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path(), "api-key");
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn file_store_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path(), "api-key");
        store.set("first").unwrap();
        store.set("second").unwrap();
        assert_eq!(store.get().unwrap().unwrap().as_str(), "second");
    }

    #[test]
    fn file_store_blank_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path(), "api-key");
        store.set("\n  \n").unwrap();
        assert!(store.get().unwrap().is_none());
    }

    // Object safety
    fn _assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn store_is_object_safe_send_sync() {
        _assert_send_sync::<Box<dyn CredentialStore>>();
        let _: Box<dyn CredentialStore> = Box::new(MemoryCredentialStore::new());
    }
}
