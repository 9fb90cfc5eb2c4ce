//! Durable key-value storage for session state.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Key holding the cached admin flag (`"true"` when set)
pub const ADMIN_FLAG_KEY: &str = "is_admin";

/// Trait for session storage that survives process restarts
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    /// Remove a value; removing a missing key is not an error
    async fn remove(&self, key: &str) -> ClientResult<()>;
}

/// In-memory implementation of SessionStore
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let values = self.values.read().await;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        let mut values = self.values.write().await;
        values.remove(key);
        Ok(())
    }
}

/// JSON file backed SessionStore.
///
/// The whole map is rewritten on every change; the file is small and only
/// touched on login, profile load and logout.
pub struct FileSessionStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// `<config dir>/sweetshop/session.json`
    pub fn default_path() -> ClientResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ClientError::storage("Failed to get config directory"))?;
        Ok(config_dir.join("sweetshop").join("session.json"))
    }

    async fn read_map(&self) -> ClientResult<HashMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(values) => Ok(values),
                Err(e) => {
                    // Unreadable contents are replaced on the next write.
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Ignoring corrupt session file"
                    );
                    Ok(HashMap::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(ClientError::storage(format!(
                "Failed to read session file: {}",
                e
            ))),
        }
    }

    async fn write_map(&self, values: &HashMap<String, String>) -> ClientResult<()> {
        if values.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(ClientError::storage(format!(
                    "Failed to delete session file: {}",
                    e
                ))),
            };
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ClientError::storage(format!("Failed to create session directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(values)
            .map_err(|e| ClientError::storage(format!("Failed to serialize session: {}", e)))?;

        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| ClientError::storage(format!("Failed to write session file: {}", e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, permissions)
                .await
                .map_err(|e| {
                    ClientError::storage(format!("Failed to restrict session file: {}", e))
                })?;
        }

        debug!(path = %self.path.display(), "Session file written");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let _guard = self.lock.read().await;
        let values = self.read_map().await?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let _guard = self.lock.write().await;
        let mut values = self.read_map().await?;
        values.insert(key.to_string(), value.to_string());
        self.write_map(&values).await
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        let _guard = self.lock.write().await;
        let mut values = self.read_map().await?;
        let removed = values.remove(key).is_some();
        // An empty map also drops a file whose contents could not be read.
        if removed || values.is_empty() {
            self.write_map(&values).await
        } else {
            Ok(())
        }
    }
}
