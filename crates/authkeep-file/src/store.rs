//! A key-value store persisted as a single JSON file.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use authkeep_core::{KeyValueStore, StorageError};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn map_io(err: io::Error) -> StorageError {
    StorageError::Unavailable {
        message: format!("IO error: {}", err),
    }
}

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: BTreeMap<String, StoredEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    updated_at: DateTime<Utc>,
}

/// A [`KeyValueStore`] backed by one JSON file.
///
/// Every operation takes an advisory lock on a sibling `.lock` file, so
/// several processes may share the same store. Writes go to a temporary file
/// that is renamed over the original.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    owner_only: bool,
}

impl FileStore {
    /// File name used for tokens.
    pub const SECURE_FILE: &'static str = "credentials.json";

    /// File name used for cached user data.
    pub const PLAIN_FILE: &'static str = "user_data.json";

    /// Create a store at `path` with default permissions.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            owner_only: false,
        }
    }

    /// The token store inside `dir`, readable by the owner only.
    pub fn secure(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(Self::SECURE_FILE),
            owner_only: true,
        }
    }

    /// The user-data store inside `dir`.
    pub fn plain(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(Self::PLAIN_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn open_lock(&self) -> Result<File, StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_io)
    }

    fn load(&self) -> Result<StoreFile, StorageError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StoreFile::default()),
            Err(e) => return Err(map_io(e)),
        };

        serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
            message: format!("{}: {}", self.path.display(), e),
        })
    }

    fn save(&self, contents: &StoreFile) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(contents).map_err(|e| StorageError::Corrupt {
            message: e.to_string(),
        })?;

        let temp = self.temp_path();
        let mut file = File::create(&temp).map_err(map_io)?;

        // Restrict before any secret is written (Unix only)
        #[cfg(unix)]
        {
            if self.owner_only {
                let mut perms = file.metadata().map_err(map_io)?.permissions();
                perms.set_mode(0o600);
                fs::set_permissions(&temp, perms).map_err(map_io)?;
            }
        }

        file.write_all(json.as_bytes()).map_err(map_io)?;
        file.sync_data().map_err(map_io)?;
        fs::rename(&temp, &self.path).map_err(map_io)?;

        Ok(())
    }

    /// Read-modify-write under the exclusive lock. `apply` returns whether
    /// anything changed.
    ///
    /// An unparsable file is replaced rather than left in place, so a later
    /// write can still recover the store.
    fn update(&self, apply: impl FnOnce(&mut StoreFile) -> bool) -> Result<(), StorageError> {
        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(map_io)?;

        let (mut contents, replace) = match self.load() {
            Ok(contents) => (contents, false),
            Err(StorageError::Corrupt { message }) => {
                warn!(%message, "discarding unreadable store file");
                (StoreFile::default(), true)
            }
            Err(e) => return Err(e),
        };
        if apply(&mut contents) || replace {
            self.save(&contents)?;
        }

        lock.unlock().map_err(map_io)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        lock.lock_shared().map_err(map_io)?;
        let contents = self.load();
        lock.unlock().map_err(map_io)?;

        Ok(contents?.entries.get(key).map(|entry| entry.value.clone()))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|contents| {
            contents.entries.insert(
                key.to_string(),
                StoredEntry {
                    value: value.to_string(),
                    updated_at: Utc::now(),
                },
            );
            true
        })?;
        debug!("entry written");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|contents| contents.entries.remove(key).is_some())
    }
}
