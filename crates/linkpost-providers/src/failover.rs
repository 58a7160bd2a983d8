//! Generator failover chain: try primary → fallback₁ → fallback₂.
//!
//! Each slot tracks consecutive failures; a slot that failed `max_failures`
//! times in a row is skipped until its cool-down expires. Putting the static
//! generator last makes the chain infallible.

use async_trait::async_trait;
use linkpost_core::error::{LinkPostError, Result};
use linkpost_core::traits::{ContentGenerator, GenerationRequest};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Per-generator health tracking.
struct GeneratorSlot {
    generator: Arc<dyn ContentGenerator>,
    /// Consecutive failure count.
    failures: AtomicU32,
    /// Unix secs of the last failure, 0 = never.
    last_failure: AtomicU64,
    max_failures: u32,
    cooldown_secs: u64,
}

impl GeneratorSlot {
    fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            generator,
            failures: AtomicU32::new(0),
            last_failure: AtomicU64::new(0),
            max_failures: 3,
            cooldown_secs: 60,
        }
    }

    fn is_healthy(&self) -> bool {
        let fails = self.failures.load(Ordering::Relaxed);
        if fails < self.max_failures {
            return true;
        }
        let last = self.last_failure.load(Ordering::Relaxed);
        unix_now().saturating_sub(last) > self.cooldown_secs
    }

    fn record_success(&self) {
        self.failures.store(0, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.last_failure.store(unix_now(), Ordering::Relaxed);
    }
}

/// Chain of responsibility over content generators.
pub struct GeneratorChain {
    slots: Vec<GeneratorSlot>,
}

impl GeneratorChain {
    /// First generator is primary, the rest are fallbacks in order.
    pub fn new(generators: Vec<Arc<dyn ContentGenerator>>) -> Self {
        Self {
            slots: generators.into_iter().map(GeneratorSlot::new).collect(),
        }
    }

    pub fn with_fallback(
        primary: Arc<dyn ContentGenerator>,
        fallback: Arc<dyn ContentGenerator>,
    ) -> Self {
        Self::new(vec![primary, fallback])
    }

    /// Override failure threshold and cool-down for every slot.
    pub fn with_health_policy(mut self, max_failures: u32, cooldown_secs: u64) -> Self {
        for slot in &mut self.slots {
            slot.max_failures = max_failures;
            slot.cooldown_secs = cooldown_secs;
        }
        self
    }

    pub fn chain_len(&self) -> usize {
        self.slots.len()
    }

    /// (name, healthy, consecutive failures) per generator.
    pub fn health_status(&self) -> Vec<(&str, bool, u32)> {
        self.slots
            .iter()
            .map(|s| {
                (
                    s.generator.name(),
                    s.is_healthy(),
                    s.failures.load(Ordering::Relaxed),
                )
            })
            .collect()
    }
}

#[async_trait]
impl ContentGenerator for GeneratorChain {
    fn name(&self) -> &str {
        self.slots
            .first()
            .map(|s| s.generator.name())
            .unwrap_or("generator-chain")
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let mut last_error = None;

        for (idx, slot) in self.slots.iter().enumerate() {
            if !slot.is_healthy() {
                tracing::debug!(
                    "⏭️ Skipping unhealthy generator: {} ({} failures)",
                    slot.generator.name(),
                    slot.failures.load(Ordering::Relaxed)
                );
                continue;
            }

            match slot.generator.generate(request).await {
                Ok(content) => {
                    if idx > 0 {
                        tracing::info!(
                            "🔄 Failover: {} → {} (success)",
                            self.slots[0].generator.name(),
                            slot.generator.name()
                        );
                    }
                    slot.record_success();
                    return Ok(content);
                }
                Err(e) => {
                    slot.record_failure();
                    tracing::warn!(
                        "⚠️ Generator {} failed (attempt {}): {}",
                        slot.generator.name(),
                        slot.failures.load(Ordering::Relaxed),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| LinkPostError::Provider("All generators unhealthy".into())))
    }
}
