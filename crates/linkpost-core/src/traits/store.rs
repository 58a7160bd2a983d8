//! Configuration store trait for user preferences.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{UserConfig, UserConfigPatch};

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Current config. Creates and stores defaults when nothing is stored yet.
    async fn get(&self) -> Result<UserConfig>;

    /// Merge `patch` over the current config, refresh its timestamp and store it.
    async fn update(&self, patch: UserConfigPatch) -> Result<UserConfig>;
}
