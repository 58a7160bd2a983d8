//! LinkedIn publisher: UGC posts, image uploads and engagement metrics.
//!
//! Without a bearer token the publisher runs in simulated mode: publishes
//! succeed with a synthetic `urn:li:share:<millis>` id and no HTTP traffic.

use async_trait::async_trait;
use chrono::Utc;
use futures::future::try_join_all;
use linkpost_core::config::LinkedInConfig;
use linkpost_core::error::{LinkPostError, Result};
use linkpost_core::traits::Publisher;
use linkpost_core::types::{EngagementMetrics, MediaAsset, PostDraft, PublishResult};
use serde_json::Value;
use std::time::Duration;

use crate::format;

const RESTLI_VERSION: &str = "2.0.0";
const STATS_API_VERSION: &str = "202304";
const METRICS_DELAY_NOTE: &str = "Metrics might not be available immediately after posting";

/// A registered upload slot: where to PUT the bytes and the asset URN to reference.
#[derive(Debug, Clone)]
struct RegisteredUpload {
    upload_url: String,
    asset: String,
}

pub struct LinkedInPublisher {
    api_url: String,
    author: String,
    default_token: String,
    client: reqwest::Client,
}

impl LinkedInPublisher {
    pub fn new(config: &LinkedInConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LinkPostError::Http(format!("Failed to build HTTP client: {e}")))?;

        let author = format::author_urn(&config.person_id);
        if config.access_token.is_empty() {
            tracing::info!("📣 LinkedIn publisher ready for {author} (no default token, simulated unless a token is supplied)");
        } else {
            tracing::info!("📣 LinkedIn publisher ready for {author}");
        }

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            author,
            default_token: config.access_token.clone(),
            client,
        })
    }

    /// Explicit token first, then the configured one. Blank counts as absent.
    fn resolve_token<'a>(&'a self, token: Option<&'a str>) -> Option<&'a str> {
        token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| Some(self.default_token.as_str()).filter(|t| !t.is_empty()))
    }

    fn simulated(&self, draft: &PostDraft) -> PublishResult {
        let now = Utc::now();
        let id = format!("urn:li:share:{}", now.timestamp_millis());
        tracing::warn!("🧪 No LinkedIn access token — simulating publish as {id}");
        PublishResult {
            success: true,
            id,
            timestamp: now,
            post: draft.clone(),
            message: Some("Post simulated — no access token configured".into()),
        }
    }

    async fn register_upload(&self, token: &str) -> Result<RegisteredUpload> {
        let url = format!("{}/assets?action=registerUpload", self.api_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("X-Restli-Protocol-Version", RESTLI_VERSION)
            .json(&format::register_upload_request(&self.author))
            .send()
            .await
            .map_err(|e| LinkPostError::Publish(format!("registerUpload failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(LinkPostError::Publish(format!(
                "registerUpload returned {status}: {text}"
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| LinkPostError::Publish(format!("Invalid registerUpload response: {e}")))?;
        let (upload_url, asset) = format::parse_registered_upload(&body).ok_or_else(|| {
            LinkPostError::Publish("registerUpload response missing uploadUrl or asset".into())
        })?;
        Ok(RegisteredUpload { upload_url, asset })
    }

    async fn upload_bytes(&self, slot: &RegisteredUpload, asset: &MediaAsset, token: &str) -> Result<()> {
        let content_type = asset
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");
        let resp = self
            .client
            .put(&slot.upload_url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(asset.data.clone())
            .send()
            .await
            .map_err(|e| LinkPostError::Publish(format!("Media upload failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(LinkPostError::Publish(format!(
                "Media upload for {} returned {}",
                slot.asset,
                resp.status()
            )));
        }
        tracing::debug!("📤 Uploaded {} bytes as {}", asset.data.len(), slot.asset);
        Ok(())
    }

    /// Register and upload every asset concurrently. Any failure fails the batch.
    async fn upload_media(&self, media: &[MediaAsset], token: &str) -> Result<Vec<String>> {
        let slots = try_join_all(media.iter().map(|_| self.register_upload(token))).await?;
        try_join_all(
            slots
                .iter()
                .zip(media)
                .map(|(slot, asset)| self.upload_bytes(slot, asset, token)),
        )
        .await?;
        tracing::info!("🖼️ Uploaded {} media asset(s)", slots.len());
        Ok(slots.into_iter().map(|s| s.asset).collect())
    }

    async fn create_post(&self, body: &Value, token: &str) -> Result<String> {
        let url = format!("{}/ugcPosts", self.api_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("X-Restli-Protocol-Version", RESTLI_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| LinkPostError::Publish(format!("LinkedIn API unreachable: {e}")))?;

        let status = resp.status();
        let header_id = resp
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::error!("❌ LinkedIn ugcPosts returned {status}: {text}");
            return Err(LinkPostError::Publish(format!(
                "Failed to publish to LinkedIn ({status}): {text}"
            )));
        }

        let body_id = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(String::from));

        body_id
            .or(header_id)
            .ok_or_else(|| LinkPostError::Publish("LinkedIn response carried no post id".into()))
    }

    async fn organization_stats(&self, post_id: &str, token: &str) -> Result<EngagementMetrics> {
        let mut url = reqwest::Url::parse(&format!(
            "{}/organizationalEntityShareStatistics",
            self.api_url
        ))
        .map_err(|e| LinkPostError::Config(format!("Invalid LinkedIn API URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("q", "organizationalEntity")
            .append_pair("shares[0]", post_id);

        let body = self.get_json(url.as_str(), token, true).await?;
        let stats = body
            .get("elements")
            .and_then(|e| e.get(0))
            .and_then(|e| e.get("totalShareStatistics"))
            .ok_or_else(|| LinkPostError::Publish("No share statistics returned".into()))?;

        Ok(EngagementMetrics {
            likes: count(stats, "likeCount"),
            comments: count(stats, "commentCount"),
            shares: count(stats, "shareCount"),
            views: count(stats, "impressionCount"),
            ..EngagementMetrics::empty(post_id)
        })
    }

    async fn social_metrics(&self, post_id: &str, token: &str) -> Result<EngagementMetrics> {
        let url = format!("{}/socialMetrics/{}", self.api_url, format::encode_urn(post_id));
        let body = self.get_json(&url, token, false).await?;
        Ok(EngagementMetrics {
            likes: count(&body, "numLikes"),
            comments: count(&body, "numComments"),
            shares: count(&body, "numShares"),
            views: count(&body, "numViews"),
            ..EngagementMetrics::empty(post_id)
        })
    }

    async fn get_json(&self, url: &str, token: &str, versioned: bool) -> Result<Value> {
        let mut req = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("X-Restli-Protocol-Version", RESTLI_VERSION);
        if versioned {
            req = req.header("LinkedIn-Version", STATS_API_VERSION);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| LinkPostError::Http(format!("LinkedIn API unreachable: {e}")))?;
        if !resp.status().is_success() {
            return Err(LinkPostError::Http(format!("LinkedIn API returned {}", resp.status())));
        }
        resp.json()
            .await
            .map_err(|e| LinkPostError::Http(format!("Invalid LinkedIn response: {e}")))
    }
}

fn count(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

#[async_trait]
impl Publisher for LinkedInPublisher {
    fn name(&self) -> &str {
        "linkedin"
    }

    async fn publish(
        &self,
        draft: &PostDraft,
        media: &[MediaAsset],
        token: Option<&str>,
    ) -> Result<PublishResult> {
        if draft.content.trim().is_empty() {
            return Err(LinkPostError::InvalidInput("post content is required".into()));
        }
        let Some(token) = self.resolve_token(token) else {
            return Ok(self.simulated(draft));
        };

        let media_urns = if media.is_empty() {
            Vec::new()
        } else {
            self.upload_media(media, token).await?
        };

        let body = format::ugc_post(&self.author, &draft.content, &media_urns);
        let id = self.create_post(&body, token).await?;
        tracing::info!("✅ Published to LinkedIn: {id}");

        Ok(PublishResult {
            success: true,
            id,
            timestamp: Utc::now(),
            post: draft.clone(),
            message: None,
        })
    }

    async fn fetch_engagement(
        &self,
        post_id: &str,
        token: Option<&str>,
    ) -> Result<EngagementMetrics> {
        if post_id.trim().is_empty() {
            return Err(LinkPostError::InvalidInput("post id is required".into()));
        }
        let urn = format::share_urn(post_id);
        let post_id = urn.as_str();
        let Some(token) = self.resolve_token(token) else {
            return Ok(EngagementMetrics {
                note: Some("Simulated metrics — no access token configured".into()),
                ..EngagementMetrics::empty(post_id)
            });
        };

        match self.organization_stats(post_id, token).await {
            Ok(metrics) => return Ok(metrics),
            Err(e) => tracing::debug!("Organization stats unavailable for {post_id}: {e}"),
        }

        match self.social_metrics(post_id, token).await {
            Ok(metrics) => Ok(metrics),
            Err(e) => {
                tracing::warn!("⚠️ Engagement metrics unavailable for {post_id}: {e}");
                Ok(EngagementMetrics {
                    error: Some(e.to_string()),
                    note: Some(METRICS_DELAY_NOTE.into()),
                    ..EngagementMetrics::empty(post_id)
                })
            }
        }
    }
}
