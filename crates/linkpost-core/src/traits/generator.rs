//! Content generator trait: anything that can turn a prompt into post text.

use async_trait::async_trait;

use crate::error::Result;

/// A single text-generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Post topic, used by offline generators to pick canned content.
    pub topic: String,
    pub system_prompt: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(topic: &str, system_prompt: &str, prompt: &str) -> Self {
        Self {
            topic: topic.to_string(),
            system_prompt: system_prompt.to_string(),
            prompt: prompt.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generator identity, recorded in draft metadata.
    fn name(&self) -> &str;

    /// Produce post text for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
