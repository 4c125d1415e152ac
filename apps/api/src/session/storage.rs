//! Durable storage for the single session record.
//!
//! One slot, holding one serialized string. The session store owns the
//! (de)serialization; backends only move bytes.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::fs;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::errors::AppError;

/// Default slot name, kept from the browser build so existing records load.
pub const DEFAULT_SESSION_KEY: &str = "vertexUser";

const REDIS_TIMEOUT: Duration = Duration::from_secs(2);

#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Returns the stored record, or `None` when the slot is empty.
    async fn load(&self) -> Result<Option<String>, AppError>;
    async fn save(&self, record: &str) -> Result<(), AppError>;
    /// Empties the slot. Clearing an empty slot is not an error.
    async fn clear(&self) -> Result<(), AppError>;
}

/// In-process slot. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(record.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, AppError> {
        self.slot
            .lock()
            .map_err(|_| AppError::Storage("memory slot poisoned".to_string()))
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.clone())
    }

    async fn save(&self, record: &str) -> Result<(), AppError> {
        *self.lock()? = Some(record.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        *self.lock()? = None;
        Ok(())
    }
}

/// One JSON file on disk. Writes go to a sibling temp file first and are
/// renamed into place so a crash never leaves a half-written record.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    async fn load(&self) -> Result<Option<String>, AppError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, record: &str) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let tmp = self.path.with_extension("tmp");
        let written = match fs::write(&tmp, record).await {
            Ok(()) => fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        written.map_err(|e| {
            AppError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })?;
        debug!("Session record written to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// One Redis key over a shared multiplexed connection, opened on first use.
/// Every round-trip is bounded by `REDIS_TIMEOUT`.
pub struct RedisStorage {
    client: redis::Client,
    key: String,
    connection: OnceCell<MultiplexedConnection>,
}

impl RedisStorage {
    pub fn new(client: redis::Client, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
            connection: OnceCell::new(),
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, AppError> {
        let con = self
            .connection
            .get_or_try_init(|| {
                bounded(
                    "redis connect",
                    self.client.get_multiplexed_async_connection(),
                )
            })
            .await?;
        Ok(con.clone())
    }
}

/// Runs one Redis call under `REDIS_TIMEOUT`, mapping both failure modes to
/// `AppError::Storage`.
async fn bounded<T, F>(what: &str, call: F) -> Result<T, AppError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(REDIS_TIMEOUT, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AppError::Storage(format!("{what} failed: {e}"))),
        Err(_) => Err(AppError::Storage(format!(
            "{what} timed out after {}ms",
            REDIS_TIMEOUT.as_millis()
        ))),
    }
}

#[async_trait]
impl SessionStorage for RedisStorage {
    async fn load(&self) -> Result<Option<String>, AppError> {
        let mut con = self.connection().await?;
        bounded("redis GET", con.get::<_, Option<String>>(&self.key)).await
    }

    async fn save(&self, record: &str) -> Result<(), AppError> {
        let mut con = self.connection().await?;
        bounded("redis SET", con.set::<_, _, ()>(&self.key, record)).await
    }

    async fn clear(&self) -> Result<(), AppError> {
        let mut con = self.connection().await?;
        bounded("redis DEL", con.del::<_, ()>(&self.key)).await
    }
}
