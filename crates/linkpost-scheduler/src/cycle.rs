//! One generate-and-maybe-publish cycle.

use linkpost_core::error::{CycleStage, LinkPostError, Result};
use linkpost_core::traits::{ConfigStore, Publisher};
use linkpost_core::types::CycleOutcome;
use linkpost_providers::PostComposer;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Runs cycles: load preferences, pick a topic, compose, optionally publish.
pub struct CycleRunner {
    store: Arc<dyn ConfigStore>,
    composer: Arc<PostComposer>,
    publisher: Arc<dyn Publisher>,
    auto_publish: bool,
}

impl CycleRunner {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        composer: Arc<PostComposer>,
        publisher: Arc<dyn Publisher>,
        auto_publish: bool,
    ) -> Self {
        Self {
            store,
            composer,
            publisher,
            auto_publish,
        }
    }

    pub fn auto_publish(&self) -> bool {
        self.auto_publish
    }

    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        tracing::info!("⏰ Running scheduled post cycle");

        let config = self
            .store
            .get()
            .await
            .map_err(|e| fail(CycleStage::LoadConfig, None, e))?;

        let topic = select_topic(&config.topics)
            .ok_or_else(|| {
                LinkPostError::Config("No topics configured for scheduled posts".into())
            })
            .map_err(|e| fail(CycleStage::SelectTopic, None, e))?
            .to_string();
        tracing::info!("🎯 Selected topic: {topic}");

        let draft = self
            .composer
            .compose(&topic, &config, "")
            .await
            .map_err(|e| fail(CycleStage::Generate, Some(&topic), e))?;

        if !self.auto_publish {
            tracing::info!("📝 Draft generated for '{topic}' (auto-publish disabled)");
            return Ok(CycleOutcome {
                topic,
                draft,
                published: false,
                publish_result: None,
            });
        }

        let result = self
            .publisher
            .publish(&draft, &[], None)
            .await
            .map_err(|e| fail(CycleStage::Publish, Some(&topic), e))?;
        tracing::info!("🚀 Scheduled post published: {}", result.id);

        Ok(CycleOutcome {
            topic,
            draft,
            published: true,
            publish_result: Some(result),
        })
    }
}

fn fail(stage: CycleStage, topic: Option<&str>, source: LinkPostError) -> LinkPostError {
    tracing::error!(
        "❌ Scheduled cycle failed at {stage} (topic: {}): {source}",
        topic.unwrap_or("-")
    );
    LinkPostError::cycle(stage, topic, source)
}

/// Uniform random choice among the stored topics, returned as stored.
/// `None` only for an empty list; blank topics are rejected later by the composer.
pub fn select_topic(topics: &[String]) -> Option<&str> {
    topics.choose(&mut rand::thread_rng()).map(String::as_str)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::UserConfigStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use linkpost_core::traits::{ContentGenerator, GenerationRequest};
    use linkpost_core::types::{
        EngagementMetrics, MediaAsset, PostDraft, PublishResult, UserConfigPatch,
    };
    use linkpost_providers::StaticContentGenerator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Generator that counts calls and echoes the topic.
    pub(crate) struct CountingGenerator {
        pub calls: AtomicUsize,
    }

    impl CountingGenerator {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ContentGenerator for CountingGenerator {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Thoughts on {}", request.topic))
        }
    }

    /// Publisher that counts calls and optionally fails.
    pub(crate) struct CountingPublisher {
        pub calls: AtomicUsize,
        pub fail: bool,
    }

    impl CountingPublisher {
        pub fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl Publisher for CountingPublisher {
        fn name(&self) -> &str {
            "counting"
        }

        async fn publish(
            &self,
            draft: &PostDraft,
            _media: &[MediaAsset],
            _token: Option<&str>,
        ) -> Result<PublishResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LinkPostError::Publish("401 Unauthorized".into()));
            }
            Ok(PublishResult {
                success: true,
                id: "urn:li:share:1".into(),
                timestamp: Utc::now(),
                post: draft.clone(),
                message: None,
            })
        }

        async fn fetch_engagement(
            &self,
            post_id: &str,
            _token: Option<&str>,
        ) -> Result<EngagementMetrics> {
            Ok(EngagementMetrics::empty(post_id))
        }
    }

    pub(crate) fn runner(
        store: Arc<UserConfigStore>,
        publisher: Arc<CountingPublisher>,
        auto_publish: bool,
    ) -> CycleRunner {
        let composer = Arc::new(PostComposer::new(Arc::new(StaticContentGenerator::new())));
        CycleRunner::new(store, composer, publisher, auto_publish)
    }

    fn runner_with_generator(
        store: Arc<UserConfigStore>,
        generator: Arc<CountingGenerator>,
        publisher: Arc<CountingPublisher>,
    ) -> CycleRunner {
        let composer = Arc::new(PostComposer::new(generator));
        CycleRunner::new(store, composer, publisher, true)
    }

    async fn store_with_topics(topics: &[&str]) -> Arc<UserConfigStore> {
        let store = Arc::new(UserConfigStore::in_memory());
        store
            .update(UserConfigPatch {
                topics: Some(topics.iter().map(|t| t.to_string()).collect()),
                ..Default::default()
            })
            .await
            .unwrap();
        store
    }

    #[test]
    fn test_select_topic() {
        let topics = vec!["A".to_string(), " Rust ".to_string(), "   ".to_string()];
        for _ in 0..50 {
            let t = select_topic(&topics).unwrap();
            assert!(topics.iter().any(|stored| stored == t));
        }
        assert!(select_topic(&[]).is_none());
        assert_eq!(select_topic(&["  ".to_string()]), Some("  "));
    }

    #[tokio::test]
    async fn test_cycle_topic_is_stored_element() {
        let store = store_with_topics(&[" Rust "]).await;
        let outcome = runner(store, CountingPublisher::new(false), false)
            .run_cycle()
            .await
            .unwrap();
        assert_eq!(outcome.topic, " Rust ");
    }

    #[tokio::test]
    async fn test_blank_topic_fails_at_generate_stage() {
        let store = store_with_topics(&["   "]).await;
        let generator = CountingGenerator::new();
        let publisher = CountingPublisher::new(false);
        let err = runner_with_generator(store, generator.clone(), publisher.clone())
            .run_cycle()
            .await
            .unwrap_err();

        match &err {
            LinkPostError::Cycle { stage, topic, .. } => {
                assert_eq!(*stage, CycleStage::Generate);
                assert_eq!(topic.as_deref(), Some("   "));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cycle_without_auto_publish() {
        let store = store_with_topics(&["React.js"]).await;
        let publisher = CountingPublisher::new(false);
        let outcome = runner(store, publisher.clone(), false).run_cycle().await.unwrap();

        assert_eq!(outcome.topic, "React.js");
        assert!(!outcome.published);
        assert!(outcome.publish_result.is_none());
        assert!(!outcome.draft.content.is_empty());
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cycle_with_auto_publish() {
        let store = store_with_topics(&["Next.js"]).await;
        let publisher = CountingPublisher::new(false);
        let outcome = runner(store, publisher.clone(), true).run_cycle().await.unwrap();

        assert!(outcome.published);
        assert_eq!(outcome.publish_result.unwrap().id, "urn:li:share:1");
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_topics_fail_at_select_stage() {
        let store = store_with_topics(&[]).await;
        let generator = CountingGenerator::new();
        let publisher = CountingPublisher::new(false);
        let err = runner_with_generator(store, generator.clone(), publisher.clone())
            .run_cycle()
            .await
            .unwrap_err();

        match &err {
            LinkPostError::Cycle { stage, topic, source } => {
                assert_eq!(*stage, CycleStage::SelectTopic);
                assert!(topic.is_none());
                assert!(source.is_config());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_publish_failure_carries_topic() {
        let store = store_with_topics(&["API Design"]).await;
        let err = runner(store, CountingPublisher::new(true), true)
            .run_cycle()
            .await
            .unwrap_err();

        match &err {
            LinkPostError::Cycle { stage, topic, .. } => {
                assert_eq!(*stage, CycleStage::Publish);
                assert_eq!(topic.as_deref(), Some("API Design"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(err.root_cause(), LinkPostError::Publish(_)));
    }
}
