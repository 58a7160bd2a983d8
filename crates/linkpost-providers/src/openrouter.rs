//! OpenRouter provider: OpenAI-compatible chat completions.
//!
//! Any failure (missing key, transport error, timeout, non-2xx, empty choice)
//! is reported as an error so the failover chain can move on to the next
//! generator.

use async_trait::async_trait;
use linkpost_core::config::OpenRouterConfig;
use linkpost_core::error::{LinkPostError, Result};
use linkpost_core::traits::{ContentGenerator, GenerationRequest};
use serde_json::{Value, json};
use std::time::Duration;

/// Live text generator backed by OpenRouter.
pub struct OpenRouterGenerator {
    /// Display name, `openrouter/<model>`.
    name: String,
    api_key: String,
    base_url: String,
    model: String,
    app_title: String,
    client: reqwest::Client,
}

impl OpenRouterGenerator {
    pub fn new(config: &OpenRouterConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LinkPostError::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: format!("openrouter/{}", config.model),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            app_title: config.app_title.clone(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Preview of the key for logs: first 8 + last 4 characters.
    fn key_preview(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 12 {
            return "••••".to_string();
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

#[async_trait]
impl ContentGenerator for OpenRouterGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(LinkPostError::ApiKeyMissing("openrouter".into()));
        }

        let body = json!({
            "model": self.model,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.prompt },
            ],
        });

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(
            "🧠 Calling OpenRouter model={} key={} url={}",
            self.model,
            self.key_preview(),
            url
        );

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", &self.app_title)
            .json(&body)
            .send()
            .await
            .map_err(|e| LinkPostError::Http(format!("openrouter connection failed ({url}): {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(LinkPostError::Provider(format!(
                "openrouter API error {status}: {text}"
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| LinkPostError::Http(e.to_string()))?;

        let choice = json["choices"]
            .get(0)
            .ok_or_else(|| LinkPostError::Provider("No content was generated by the model".into()))?;

        let content = choice["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LinkPostError::Provider("Model returned an empty message".into()))?;

        if let Some(usage) = json["usage"].as_object() {
            tracing::debug!(
                "📊 OpenRouter usage: prompt={} completion={}",
                usage.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0),
                usage.get("completion_tokens").and_then(|v| v.as_u64()).unwrap_or(0)
            );
        }

        Ok(content.to_string())
    }
}
