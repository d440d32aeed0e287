//! Persistent key-value storage for the session record.
//!
//! The record is three independent keys. Writes and removals are not
//! transactional; readers always key off [`ACCESS_TOKEN_KEY`].

use std::{
    collections::{BTreeMap, HashMap},
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use shared::models::{LoginSuccessResponse, UserInfo};
use thiserror::Error;
use tracing::{debug, warn};

/// Key holding the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Key holding the JSON-serialized [`UserInfo`].
pub const USER_KEY: &str = "user";

/// Every key that makes up the session record.
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

/// Failures surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("session storage I/O failed at {path}: {source}")]
    Io {
        /// Backing file.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The backing file does not hold a JSON object of strings.
    #[error("session storage at {path} is corrupt: {source}")]
    Corrupt {
        /// Backing file.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// A value could not be serialized for storage.
    #[error("failed to encode session value: {0}")]
    Encode(#[from] serde_json::Error),
    /// Another holder of the storage lock panicked.
    #[error("session storage lock poisoned")]
    Poisoned,
}

/// A string-to-string store in the manner of browser local storage.
pub trait KeyValueStorage: Send + Sync + fmt::Debug {
    /// Returns the value under `key`, if any.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten on every mutation.
///
/// The file is created with owner-only permissions on Unix and deleted once
/// its last key is removed.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Uses `path` as the backing file. Nothing is touched until first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Entries to mutate. A corrupt file is discarded so writes can replace it;
    /// the flag reports whether that happened.
    fn entries_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.read_entries() {
            Ok(entries) => Ok((entries, false)),
            Err(StorageError::Corrupt { path, source }) => {
                warn!(path = %path.display(), error = %source, "discarding corrupt session file");
                Ok((BTreeMap::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(io_error)?;
                debug!(path = %self.path.display(), "removed empty session file");
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }
        let serialized = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, serialized.as_bytes()).map_err(io_error)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(io_error)?;
        }
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let (mut entries, _) = self.entries_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let (mut entries, discarded) = self.entries_for_write()?;
        if entries.remove(key).is_none() && !discarded {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

/// Typed access to the session keys of a [`KeyValueStorage`].
///
/// Reads never fail: a backend error is logged and treated as an absent key.
#[derive(Clone, Debug)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    /// Wraps a storage backend.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStorage>) -> Self {
        Self { backend }
    }

    /// A store over a fresh [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn KeyValueStorage> {
        &self.backend
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "failed to read session storage");
                None
            }
        }
    }

    /// The persisted access token.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    /// The persisted refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Whether an access token is persisted.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        self.access_token().is_some()
    }

    /// The persisted user, or `None` if missing or not valid JSON.
    #[must_use]
    pub fn user(&self) -> Option<UserInfo> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "stored user is not valid JSON; ignoring it");
                None
            }
        }
    }

    /// Persists the user under [`USER_KEY`].
    ///
    /// # Errors
    /// Returns a [`StorageError`] if encoding or writing fails.
    pub fn save_user(&self, user: &UserInfo) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(user)?;
        self.backend.set(USER_KEY, &encoded)
    }

    /// Persists a login response: access token, then refresh token, then user.
    ///
    /// A failure part-way leaves the earlier keys written.
    ///
    /// # Errors
    /// Returns the first [`StorageError`] encountered.
    pub fn save(&self, login: &LoginSuccessResponse) -> Result<(), StorageError> {
        self.backend.set(ACCESS_TOKEN_KEY, &login.access_token)?;
        self.backend.set(REFRESH_TOKEN_KEY, &login.refresh_token)?;
        self.save_user(&login.user)
    }

    /// Removes every session key, continuing past individual failures.
    pub fn clear(&self) {
        for key in SESSION_KEYS {
            if let Err(err) = self.backend.remove(key) {
                warn!(key, error = %err, "failed to remove session key");
            }
        }
    }
}
