//! User config store: one JSON document, on disk or in memory.
//! Persistent mode keeps `userConfig.json` under the data directory; transient
//! mode (serverless deployments) holds the document in process memory.
//! A missing or unreadable document is replaced by defaults.

use async_trait::async_trait;
use linkpost_core::config::StorageConfig;
use linkpost_core::error::{LinkPostError, Result};
use linkpost_core::traits::ConfigStore;
use linkpost_core::types::{UserConfig, UserConfigPatch};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const FILE_NAME: &str = "userConfig.json";

pub struct UserConfigStore {
    /// `None` = transient.
    path: Option<PathBuf>,
    /// Cached document; the only copy in transient mode.
    current: Mutex<Option<UserConfig>>,
}

impl UserConfigStore {
    pub fn new(persistent: bool, data_dir: &Path) -> Self {
        let path = persistent.then(|| data_dir.join(FILE_NAME));
        match &path {
            Some(p) => tracing::info!("💾 User config store: {}", p.display()),
            None => tracing::info!("💾 User config store: in-memory (not persisted)"),
        }
        Self {
            path,
            current: Mutex::new(None),
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.persistent, &storage.data_path())
    }

    pub fn in_memory() -> Self {
        Self::new(false, Path::new("."))
    }

    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the stored document, falling back to (and storing) defaults.
    /// Caller holds the lock.
    async fn load(&self, cached: &mut Option<UserConfig>) -> Result<UserConfig> {
        let Some(path) = &self.path else {
            return Ok(cached.get_or_insert_with(UserConfig::default).clone());
        };

        match tokio::fs::read_to_string(path).await {
            Ok(json) => match serde_json::from_str::<UserConfig>(&json) {
                Ok(config) => {
                    *cached = Some(config.clone());
                    return Ok(config);
                }
                Err(e) => tracing::warn!("⚠️ Failed to parse {}: {e} — resetting to defaults", path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No user config at {}, creating defaults", path.display());
            }
            Err(e) => tracing::warn!("⚠️ Failed to read {}: {e} — resetting to defaults", path.display()),
        }

        let defaults = UserConfig::default();
        self.save(&defaults).await?;
        *cached = Some(defaults.clone());
        Ok(defaults)
    }

    async fn save(&self, config: &UserConfig) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(config)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| LinkPostError::Config(format!("Failed to write {}: {e}", path.display())))?;
        tracing::debug!("💾 Saved user config to {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for UserConfigStore {
    async fn get(&self) -> Result<UserConfig> {
        let mut cached = self.current.lock().await;
        self.load(&mut cached).await
    }

    async fn update(&self, patch: UserConfigPatch) -> Result<UserConfig> {
        let mut cached = self.current.lock().await;
        let current = self.load(&mut cached).await?;
        let next = current.merged(&patch);
        self.save(&next).await?;
        *cached = Some(next.clone());
        tracing::info!("📝 User config updated (frequency: {})", next.post_frequency);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkpost_core::types::Frequency;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_creates_defaults_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UserConfigStore::new(true, &tmp.path().join("data"));
        let config = store.get().await.unwrap();
        assert_eq!(config.post_frequency, Frequency::Weekly);

        let on_disk = std::fs::read_to_string(tmp.path().join("data").join(FILE_NAME)).unwrap();
        assert!(on_disk.contains("professionalBackground"));
    }

    #[tokio::test]
    async fn test_update_persists_across_instances() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UserConfigStore::new(true, tmp.path());
        let before = store.get().await.unwrap();
        let updated = store
            .update(UserConfigPatch {
                post_frequency: Some(Frequency::Daily),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(updated.last_updated > before.last_updated);
        assert_eq!(updated.tone, before.tone);

        let reopened = UserConfigStore::new(true, tmp.path());
        assert_eq!(reopened.get().await.unwrap().post_frequency, Frequency::Daily);
    }

    #[tokio::test]
    async fn test_corrupt_file_resets_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(FILE_NAME), "{ not json").unwrap();

        let store = UserConfigStore::new(true, tmp.path());
        let config = store.get().await.unwrap();
        assert_eq!(config.topics.len(), 5);

        let repaired = std::fs::read_to_string(tmp.path().join(FILE_NAME)).unwrap();
        assert!(serde_json::from_str::<UserConfig>(&repaired).is_ok());
    }

    #[tokio::test]
    async fn test_in_memory_does_not_touch_disk() {
        let store = UserConfigStore::in_memory();
        assert!(!store.is_persistent());
        assert!(store.path().is_none());

        store
            .update(UserConfigPatch {
                topics: Some(vec!["Rust".into()]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(store.get().await.unwrap().topics, vec!["Rust".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_serialized() {
        let store = Arc::new(UserConfigStore::in_memory());
        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update(UserConfigPatch {
                        tone: Some(format!("tone-{i}")),
                        ..Default::default()
                    })
                    .await
                    .unwrap()
                    .last_updated
            }));
        }
        let mut stamps = Vec::new();
        for h in handles {
            stamps.push(h.await.unwrap());
        }
        stamps.sort();
        stamps.dedup();
        assert_eq!(stamps.len(), 10);
    }
}
