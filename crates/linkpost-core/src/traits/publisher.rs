//! Publisher trait: submits finished drafts to a social platform.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{EngagementMetrics, MediaAsset, PostDraft, PublishResult};

#[async_trait]
pub trait Publisher: Send + Sync {
    fn name(&self) -> &str;

    /// Publish a draft, uploading `media` first when non-empty.
    /// `token` overrides the publisher's configured credential.
    async fn publish(
        &self,
        draft: &PostDraft,
        media: &[MediaAsset],
        token: Option<&str>,
    ) -> Result<PublishResult>;

    /// Fetch engagement counters for a published post.
    async fn fetch_engagement(
        &self,
        post_id: &str,
        token: Option<&str>,
    ) -> Result<EngagementMetrics>;
}
