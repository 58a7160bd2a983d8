//! Post composer: turns topics and feedback into sanitized `PostDraft`s.

use chrono::Utc;
use linkpost_core::error::{LinkPostError, Result};
use linkpost_core::traits::{ContentGenerator, GenerationRequest};
use linkpost_core::types::{PostDraft, PostMetadata, Refinement, UserConfig};
use std::sync::Arc;

use crate::prompt;

const COMPOSE_TEMPERATURE: f32 = 0.8;
const REFINE_TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1500;

/// Builds drafts on top of a content generator (normally a `GeneratorChain`).
pub struct PostComposer {
    generator: Arc<dyn ContentGenerator>,
}

impl PostComposer {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Generate a new draft about `topic`, styled by `style`.
    pub async fn compose(
        &self,
        topic: &str,
        style: &UserConfig,
        additional_context: &str,
    ) -> Result<PostDraft> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(LinkPostError::InvalidInput("topic is required".into()));
        }
        tracing::info!("✍️ Generating post about: {topic}");

        let request = GenerationRequest::new(
            topic,
            prompt::COMPOSE_SYSTEM_PROMPT,
            &prompt::compose_prompt(topic, style, additional_context),
        )
        .with_sampling(COMPOSE_TEMPERATURE, MAX_TOKENS);

        let raw = self.generator.generate(&request).await?;

        Ok(PostDraft {
            topic: topic.to_string(),
            content: sanitize(&raw),
            timestamp: Utc::now(),
            metadata: PostMetadata {
                generated_with: self.generator.name().to_string(),
                user_config: Some(style.clone()),
                refinement_history: Vec::new(),
            },
        })
    }

    /// Produce a new draft from `draft` revised per `feedback`.
    /// The previous content is appended to the refinement history.
    pub async fn refine(&self, draft: &PostDraft, feedback: &str) -> Result<PostDraft> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(LinkPostError::InvalidInput("feedback is required".into()));
        }
        tracing::info!("🔁 Refining post with feedback: {feedback}");

        let request = GenerationRequest::new(
            &draft.topic,
            prompt::REFINE_SYSTEM_PROMPT,
            &prompt::refine_prompt(&draft.content, feedback),
        )
        .with_sampling(REFINE_TEMPERATURE, MAX_TOKENS);

        let raw = self.generator.generate(&request).await?;
        let now = Utc::now();

        let mut metadata = draft.metadata.clone();
        metadata.refinement_history.push(Refinement {
            previous_content: draft.content.clone(),
            feedback: feedback.to_string(),
            timestamp: now,
        });

        Ok(PostDraft {
            topic: draft.topic.clone(),
            content: sanitize(&raw),
            timestamp: now,
            metadata,
        })
    }
}

/// Strip encoding artifacts, control characters and markdown emphasis.
pub fn sanitize(content: &str) -> String {
    let replaced = content
        .replace("â€”", "-")
        .replace("â€“", "-")
        .replace(['—', '–'], "-")
        .replace('*', "");

    replaced
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failover::GeneratorChain;
    use crate::fallback::StaticContentGenerator;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records requests and echoes a fixed reply.
    struct Recording {
        reply: String,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl Recording {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.into(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ContentGenerator for Recording {
        fn name(&self) -> &str {
            "recording"
        }
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    struct Down;

    #[async_trait]
    impl ContentGenerator for Down {
        fn name(&self) -> &str {
            "down"
        }
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            Err(LinkPostError::Http("connection refused".into()))
        }
    }

    #[test]
    fn test_sanitize() {
        let raw = "**Bold** claim â€” really\u{0007} — yes\r\n";
        assert_eq!(sanitize(raw), "Bold claim - really - yes");
    }

    #[test]
    fn test_sanitize_keeps_newlines() {
        assert_eq!(sanitize("line one\nline two"), "line one\nline two");
    }

    #[tokio::test]
    async fn test_compose_builds_draft() {
        let generator = Recording::new("*Great* post");
        let composer = PostComposer::new(generator.clone());
        let style = UserConfig::default();

        let draft = composer.compose("Rust", &style, "").await.unwrap();
        assert_eq!(draft.topic, "Rust");
        assert_eq!(draft.content, "Great post");
        assert_eq!(draft.metadata.generated_with, "recording");
        assert_eq!(draft.metadata.user_config.as_ref(), Some(&style));

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!((seen[0].temperature - 0.8).abs() < f32::EPSILON);
        assert_eq!(seen[0].max_tokens, 1500);
    }

    #[tokio::test]
    async fn test_compose_rejects_blank_topic() {
        let composer = PostComposer::new(Recording::new("x"));
        let err = composer.compose("  ", &UserConfig::default(), "").await.unwrap_err();
        assert!(matches!(err, LinkPostError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_refine_appends_history() {
        let composer = PostComposer::new(Recording::new("v2"));
        let first = composer.compose("Rust", &UserConfig::default(), "").await.unwrap();
        let second = composer.refine(&first, "make it shorter").await.unwrap();
        let third = composer.refine(&second, "add emoji").await.unwrap();

        assert_eq!(third.metadata.refinement_history.len(), 2);
        assert_eq!(third.metadata.refinement_history[0].previous_content, first.content);
        assert_eq!(third.metadata.refinement_history[0].feedback, "make it shorter");
        assert_eq!(third.metadata.refinement_history[1].feedback, "add emoji");
        assert_eq!(third.topic, "Rust");
        // Original draft untouched.
        assert!(first.metadata.refinement_history.is_empty());
    }

    #[tokio::test]
    async fn test_compose_survives_provider_outage() {
        let chain = GeneratorChain::with_fallback(Arc::new(Down), Arc::new(StaticContentGenerator::new()));
        let composer = PostComposer::new(Arc::new(chain));
        let draft = composer.compose("Next.js", &UserConfig::default(), "").await.unwrap();
        assert!(!draft.content.is_empty());
        assert!(draft.content.contains("App Router"));
    }
}
