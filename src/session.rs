use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::UserProfile;

pub const SESSION_ID_KEY: &str = "tmdb_session_id";
pub const USER_KEY: &str = "tmdb_user";

/// String key/value store with local-storage semantics: single calls, last
/// write wins.
#[async_trait]
pub trait LocalStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
    async fn remove_item(&self, key: &str) -> Result<()>;
    /// Remove several keys as one write: either all go or none do.
    async fn remove_items(&self, keys: &[&str]) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().await.remove(key);
        Ok(())
    }

    async fn remove_items(&self, keys: &[&str]) -> Result<()> {
        let mut items = self.items.lock().await;
        for key in keys {
            items.remove(*key);
        }
        Ok(())
    }
}

/// JSON object on disk, loaded once and rewritten on every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let items = match tokio::fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => HashMap::new(),
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("Storage file {} is not valid JSON", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No storage file at {}, starting empty", path.display());
                HashMap::new()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read storage file {}", path.display()))
            }
        };
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    async fn persist(&self, items: &HashMap<String, String>) -> Result<()> {
        let text = serde_json::to_string_pretty(items).context("Failed to encode storage")?;
        tokio::fs::write(&self.path, text)
            .await
            .with_context(|| format!("Failed to write storage file {}", self.path.display()))
    }
}

#[async_trait]
impl LocalStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().await;
        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next).await?;
        *items = next;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.remove_items(&[key]).await
    }

    async fn remove_items(&self, keys: &[&str]) -> Result<()> {
        let mut items = self.items.lock().await;
        let mut next = items.clone();
        let mut changed = false;
        for key in keys {
            changed |= next.remove(*key).is_some();
        }
        if !changed {
            return Ok(());
        }
        // Memory only changes once the file has the new contents.
        self.persist(&next).await?;
        *items = next;
        Ok(())
    }
}

/// Persisted TMDB session and profile, shared by every page.
#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<dyn LocalStorage>,
}

impl SessionContext {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Open the file-backed store and report what was persisted.
    pub async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let storage = FileStorage::open(path).await?;
        let ctx = Self::new(Arc::new(storage));
        match ctx.user().await {
            Some(user) => info!(
                "Restored TMDB session for '{}'",
                user.name.as_deref().unwrap_or("Unnamed")
            ),
            None => info!("No stored TMDB user"),
        }
        Ok(ctx)
    }

    pub async fn session_id(&self) -> Option<String> {
        match self.storage.get_item(SESSION_ID_KEY).await {
            Ok(v) => v.filter(|s| !s.is_empty()),
            Err(e) => {
                warn!("Failed to read {}: {:#}", SESSION_ID_KEY, e);
                None
            }
        }
    }

    /// Stored profile; an unreadable entry counts as no user.
    pub async fn user(&self) -> Option<UserProfile> {
        let raw = match self.storage.get_item(USER_KEY).await {
            Ok(v) => v?,
            Err(e) => {
                warn!("Failed to read {}: {:#}", USER_KEY, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Ignoring malformed {}: {}", USER_KEY, e);
                None
            }
        }
    }

    pub async fn save_session_id(&self, session_id: &str) -> Result<()> {
        self.storage.set_item(SESSION_ID_KEY, session_id).await
    }

    pub async fn save_user(&self, user: &UserProfile) -> Result<()> {
        let raw = serde_json::to_string(user).context("Failed to encode user profile")?;
        self.storage.set_item(USER_KEY, &raw).await
    }

    /// Drop both persisted values in one write. On failure both stay.
    pub async fn logout(&self) -> Result<()> {
        self.storage
            .remove_items(&[USER_KEY, SESSION_ID_KEY])
            .await
            .context("Failed to clear stored TMDB session")?;
        info!("Cleared stored TMDB session");
        Ok(())
    }
}
