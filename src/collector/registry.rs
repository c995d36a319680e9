//! JSON file holding every issued prompt record.
//!
//! The whole document is read and rewritten on each access. Mutations go
//! through [`RegistryStore::update`], which holds the store lock across the
//! load-modify-save cycle.

use std::fmt;
use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::collector::record::PromptRecord;

/// Errors from reading or writing the registry file.
#[derive(Debug)]
pub enum RegistryError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Serialize(serde_json::Error),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "registry I/O error on '{}': {}", path.display(), source)
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse registry '{}': {}", path.display(), source)
            }
            Self::Serialize(e) => write!(f, "failed to serialize registry: {e}"),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(e) => Some(e),
        }
    }
}

pub struct RegistryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RegistryStore {
    /// Open the registry at `path`, creating an empty one if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let store = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };
        store.ensure_exists().await?;
        info!("Registry at {:?}", store.path);
        Ok(store)
    }

    /// Read the full collection.
    pub async fn load(&self) -> Result<Vec<PromptRecord>, RegistryError> {
        self.ensure_exists().await?;
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        serde_json::from_str(&json).map_err(|source| RegistryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the collection with `records`.
    ///
    /// Writes a sibling temp file and renames it over the registry.
    pub async fn save(&self, records: &[PromptRecord]) -> Result<(), RegistryError> {
        let json = serde_json::to_string_pretty(records).map_err(RegistryError::Serialize)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json).await.map_err(|e| RegistryError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        debug!("Saved registry ({} records)", records.len());
        Ok(())
    }

    /// Load, apply `f`, save. Concurrent callers are serialized.
    ///
    /// The registry is saved even when `f` leaves it untouched.
    pub async fn update<F, R>(&self, f: F) -> Result<R, RegistryError>
    where
        F: FnOnce(&mut Vec<PromptRecord>) -> R,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let result = f(&mut records);
        self.save(&records).await?;
        Ok(result)
    }

    async fn ensure_exists(&self) -> Result<(), RegistryError> {
        if tokio::fs::try_exists(&self.path).await.map_err(|e| self.io_error(e))? {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| RegistryError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        info!("No registry file, creating {:?}", self.path);
        self.save(&[]).await
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> RegistryError {
        RegistryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
