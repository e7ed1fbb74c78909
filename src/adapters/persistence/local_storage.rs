//! Implements BillStorePort using a JSON file.
//!
//! The file is a flat key -> JSON value map, like browser local storage. The staged
//! bill lives under [`BILL_KEY`].

use crate::domain::{DomainError, StoredBill};
use crate::ports::BillStorePort;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Well-known key of the staged bill.
pub const BILL_KEY: &str = "billData";

/// JSON file-based key/value storage.
pub struct LocalStorageJson {
    path: std::path::PathBuf,
    cache: tokio::sync::RwLock<Map<String, Value>>,
}

impl LocalStorageJson {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: tokio::sync::RwLock::new(Map::new()),
        }
    }

    /// Load from disk. Call after construction. A missing or corrupt file starts empty;
    /// any other read failure is an error so the file is never overwritten blind.
    pub async fn load(&self) -> Result<(), DomainError> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "local storage is corrupt, starting empty");
                Map::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no local storage yet");
                Map::new()
            }
            Err(e) => {
                return Err(DomainError::Store(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        *self.cache.write().await = data;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.cache.read().await.get(key).cloned()
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<(), DomainError> {
        self.cache.write().await.insert(key.to_string(), value);
        self.save().await
    }

    pub async fn remove(&self, key: &str) -> Result<(), DomainError> {
        let removed = self.cache.write().await.remove(key);
        if removed.is_some() {
            self.save().await?;
        }
        Ok(())
    }

    /// Atomic save using write-replace pattern.
    /// 1. Write to temp file
    /// 2. sync_all() to ensure flush to disk
    /// 3. Atomic rename to target path
    async fn save(&self) -> Result<(), DomainError> {
        let json = {
            let data = self.cache.read().await;
            serde_json::to_string_pretty(&*data).map_err(|e| DomainError::Store(e.to_string()))?
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Store(format!("create data dir: {}", e)))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Store(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Store(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Store(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Store(format!("atomic rename failed: {}", e)))?;

        debug!(path = %self.path.display(), "local storage saved");
        Ok(())
    }
}

#[async_trait::async_trait]
impl BillStorePort for LocalStorageJson {
    async fn save_bill(&self, bill: &StoredBill) -> Result<(), DomainError> {
        let value = serde_json::to_value(bill).map_err(|e| DomainError::Store(e.to_string()))?;
        self.set(BILL_KEY, value).await
    }

    async fn load_bill(&self) -> Result<Option<StoredBill>, DomainError> {
        match self.get(BILL_KEY).await {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| DomainError::Store(format!("stored bill is malformed: {}", e))),
            None => Ok(None),
        }
    }

    async fn clear_bill(&self) -> Result<(), DomainError> {
        self.remove(BILL_KEY).await
    }
}
