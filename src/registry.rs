//! Public key registries.
//!
//! The verifier resolves a signer's public key through [`KeyRegistry`]. A
//! missing user is a normal outcome (`Ok(None)`); `Err` is reserved for a
//! registry that cannot be reached or read.
//!
//! Two implementations ship with the crate: [`MemoryRegistry`] for embedding
//! and tests, and [`DirectoryRegistry`], which keeps one key file per user.

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Longest username accepted by [`DirectoryRegistry`].
pub const MAX_USERNAME_LEN: usize = 64;

/// Extension of key files in a [`DirectoryRegistry`].
pub const KEY_FILE_EXTENSION: &str = "pub";

/// Source of record for users' encoded public keys.
#[allow(async_fn_in_trait)]
pub trait KeyRegistry {
    /// Look up the encoded public key registered for `username`.
    async fn lookup(&self, username: &str) -> Result<Option<String>>;
}

impl<R: KeyRegistry> KeyRegistry for &R {
    async fn lookup(&self, username: &str) -> Result<Option<String>> {
        (**self).lookup(username).await
    }
}

/// In-memory registry.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    keys: RwLock<HashMap<String, String>>,
    lookups: AtomicUsize,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user's encoded public key. Usernames are unique.
    pub fn register(&self, username: &str, encoded_key: &str) -> Result<()> {
        let mut keys = self
            .keys
            .write()
            .map_err(|_| Error::Transport("registry lock poisoned".to_string()))?;
        if keys.contains_key(username) {
            return Err(Error::UsernameTaken(username.to_string()));
        }
        keys.insert(username.to_string(), encoded_key.to_string());
        log::debug!("Registered key for '{}'", username);
        Ok(())
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.keys.read().map(|keys| keys.len()).unwrap_or(0)
    }

    /// Check if no users are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many lookups this registry has served.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl KeyRegistry for MemoryRegistry {
    async fn lookup(&self, username: &str) -> Result<Option<String>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let keys = self
            .keys
            .read()
            .map_err(|_| Error::Transport("registry lock poisoned".to_string()))?;
        Ok(keys.get(username).cloned())
    }
}

/// Registry backed by a directory of `<username>.pub` files.
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    root: PathBuf,
}

impl DirectoryRegistry {
    /// Use `root` as the registry directory. It is created on first registration.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Registry directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register a user's encoded public key, refusing to replace an existing one.
    pub fn register(&self, username: &str, encoded_key: &str) -> Result<()> {
        validate_username(username)?;
        std::fs::create_dir_all(&self.root)?;

        let path = self.key_path(username);
        if path.exists() {
            return Err(Error::UsernameTaken(username.to_string()));
        }

        // Write the whole key aside first; only a complete file is linked into place.
        let mut staged = NamedTempFile::new_in(&self.root)?;
        staged.write_all(encoded_key.as_bytes())?;
        staged.flush()?;
        if let Err(e) = staged.persist_noclobber(&path) {
            return Err(match e.error.kind() {
                ErrorKind::AlreadyExists => Error::UsernameTaken(username.to_string()),
                _ => e.error.into(),
            });
        }

        log::info!("Registered key for '{}' at {}", username, path.display());
        Ok(())
    }

    fn key_path(&self, username: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", username, KEY_FILE_EXTENSION))
    }
}

impl KeyRegistry for DirectoryRegistry {
    async fn lookup(&self, username: &str) -> Result<Option<String>> {
        if validate_username(username).is_err() {
            log::debug!("Lookup of unstorable username {:?}", username);
            return Ok(None);
        }

        let path = self.key_path(username);
        match std::fs::read_to_string(&path) {
            Ok(key) => Ok(Some(key)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Transport(format!("cannot read {}: {}", path.display(), e))),
        }
    }
}

/// Check that a username can be used as a key file name.
pub fn validate_username(username: &str) -> Result<()> {
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && !username.starts_with('.')
        && !username
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control());
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidUsername(username.to_string()))
    }
}
