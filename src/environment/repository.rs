use serde_json::{from_slice, to_string_pretty};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

const STORE_PATH: &str = "store.json";
const TOKEN_KEY: &str = "token";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Couldn't find a folder to save data")]
    NoDataDirectory,
    #[error("Store lock poisoned")]
    Poisoned,
}

/// A string key-value store. On device this would be the platform secure
/// store; here it is a private JSON file.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Default, Clone)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

/// JSON file store. Every mutation rewrites the whole file.
pub struct FileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = read(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Opens the store in the platform config directory.
    pub fn in_data_directory() -> Result<Self, StorageError> {
        Self::open(data_directory()?.join(STORE_PATH))
    }

    fn mutate(&self, action: impl FnOnce(&mut HashMap<String, String>)) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        action(&mut values);
        write(&self.path, &values)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(|values| {
            values.remove(key);
        })
    }
}

/// Owns the persisted `token` key.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").finish()
    }
}

impl Repository {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }

    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(TOKEN_KEY)
    }

    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.store.remove(TOKEN_KEY)
    }
}

fn read(path: &Path) -> Result<Option<HashMap<String, String>>, StorageError> {
    if !path.exists() {
        return Ok(None);
    };
    let data = std::fs::read(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let values = from_slice(&data).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(values))
}

fn write(path: &Path, values: &HashMap<String, String>) -> Result<(), StorageError> {
    let write_error = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    let data = to_string_pretty(values).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(write_error)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(write_error)?;
    }
    Ok(())
}

fn data_directory() -> Result<PathBuf, StorageError> {
    use directories_next::ProjectDirs;
    let proj_dirs =
        ProjectDirs::from("in", "loanreferral", "partner").ok_or(StorageError::NoDataDirectory)?;
    let dirs = proj_dirs.config_dir().to_path_buf();
    if !dirs.exists() {
        std::fs::create_dir_all(&dirs).map_err(|source| {
            log::error!("Could not create directory {}: {source:?}", dirs.display());
            StorageError::Write {
                path: dirs.clone(),
                source,
            }
        })?;
    }
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_repository_round_trips_token() {
        let repository = Repository::in_memory();
        assert_eq!(repository.token().unwrap(), None);
        repository.set_token("abc").unwrap();
        assert_eq!(repository.token().unwrap().as_deref(), Some("abc"));
        repository.clear_token().unwrap();
        assert_eq!(repository.token().unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_PATH);
        {
            let repository = Repository::new(FileStore::open(&path).unwrap());
            repository.set_token("persisted").unwrap();
        }
        let reopened = Repository::new(FileStore::open(&path).unwrap());
        assert_eq!(reopened.token().unwrap().as_deref(), Some("persisted"));

        reopened.clear_token().unwrap();
        let again = Repository::new(FileStore::open(&path).unwrap());
        assert_eq!(again.token().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_PATH);
        let store = FileStore::open(&path).unwrap();
        store.set(TOKEN_KEY, "secret").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_PATH);
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(StorageError::Parse { .. })
        ));
    }
}
