//! Data model: user preferences, drafts, publish results and metrics.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How often the scheduled trigger should publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
}

impl Frequency {
    /// Parse a frequency label, case-insensitively.
    /// Unrecognized labels fall back to `Weekly`.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "biweekly" | "bi-weekly" => Frequency::BiWeekly,
            "monthly" => Frequency::Monthly,
            other => {
                tracing::debug!("Unrecognized post frequency '{other}', using Weekly");
                Frequency::Weekly
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::BiWeekly => "BiWeekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

impl From<String> for Frequency {
    fn from(s: String) -> Self {
        Frequency::parse_lenient(&s)
    }
}

impl From<Frequency> for String {
    fn from(f: Frequency) -> Self {
        f.label().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User-level preferences used to steer post generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    #[serde(default = "default_background")]
    pub professional_background: String,
    #[serde(default = "default_audience")]
    pub target_audience: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_post_length")]
    pub post_length: String,
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
    #[serde(default = "default_frequency")]
    pub post_frequency: Frequency,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

pub fn default_background() -> String { "Web Developer".into() }
pub fn default_audience() -> String { "Web developers and tech professionals".into() }
pub fn default_tone() -> String { "Professional but conversational".into() }
pub fn default_post_length() -> String { "Medium (1500-2000 characters)".into() }
fn default_topics() -> Vec<String> {
    vec![
        "React.js",
        "Next.js",
        "Backend Development",
        "AI Tools for Development",
        "Web Development Best Practices",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_frequency() -> Frequency { Frequency::Weekly }

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            professional_background: default_background(),
            target_audience: default_audience(),
            tone: default_tone(),
            post_length: default_post_length(),
            topics: default_topics(),
            post_frequency: default_frequency(),
            last_updated: Utc::now(),
        }
    }
}

impl UserConfig {
    /// Overlay `patch` on top of this config. Fields absent from the patch are
    /// kept; `last_updated` always moves forward.
    pub fn merged(&self, patch: &UserConfigPatch) -> UserConfig {
        let mut next = self.clone();
        if let Some(v) = &patch.professional_background {
            next.professional_background = v.clone();
        }
        if let Some(v) = &patch.target_audience {
            next.target_audience = v.clone();
        }
        if let Some(v) = &patch.tone {
            next.tone = v.clone();
        }
        if let Some(v) = &patch.post_length {
            next.post_length = v.clone();
        }
        if let Some(v) = &patch.topics {
            next.topics = v.clone();
        }
        if let Some(v) = patch.post_frequency {
            next.post_frequency = v;
        }
        next.last_updated = next_timestamp(self.last_updated);
        next
    }
}

/// A timestamp strictly after `previous`, normally just `Utc::now()`.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

/// Partial update for `UserConfig`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfigPatch {
    pub professional_background: Option<String>,
    pub target_audience: Option<String>,
    pub tone: Option<String>,
    pub post_length: Option<String>,
    pub topics: Option<Vec<String>>,
    pub post_frequency: Option<Frequency>,
}

/// A generated (possibly refined) post that has not necessarily been published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    #[serde(default)]
    pub topic: String,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: PostMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetadata {
    /// Generator / model identity that produced the content.
    #[serde(default)]
    pub generated_with: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_config: Option<UserConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refinement_history: Vec<Refinement>,
}

/// One step of refinement history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refinement {
    pub previous_content: String,
    pub feedback: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a successful publish call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub success: bool,
    /// Platform-assigned identifier (URN).
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub post: PostDraft,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Engagement counters for a published post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub post_id: String,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub views: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl EngagementMetrics {
    /// Zeroed metrics, used when the platform cannot supply real numbers.
    pub fn empty(post_id: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            likes: 0,
            comments: 0,
            shares: 0,
            views: 0,
            timestamp: Utc::now(),
            error: None,
            note: None,
        }
    }
}

/// A media file to attach to a post.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl MediaAsset {
    pub fn image(data: Vec<u8>) -> Self {
        Self {
            data,
            content_type: None,
        }
    }
}

/// OAuth tokens returned by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetails {
    pub access_token: String,
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Result of one generate-and-maybe-publish cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleOutcome {
    pub topic: String,
    pub draft: PostDraft,
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_result: Option<PublishResult>,
}
