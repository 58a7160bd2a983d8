//! # LinkPost Providers
//!
//! Content generation for LinkPost. The live `OpenRouterGenerator` sits in
//! front of a `StaticContentGenerator` inside a `GeneratorChain`, so a
//! provider outage degrades to canned content instead of failing the caller.

pub mod composer;
pub mod failover;
pub mod fallback;
pub mod openrouter;
pub mod prompt;

use linkpost_core::config::OpenRouterConfig;
use linkpost_core::error::Result;
use linkpost_core::traits::ContentGenerator;
use std::sync::Arc;

pub use composer::{PostComposer, sanitize};
pub use failover::GeneratorChain;
pub use fallback::StaticContentGenerator;
pub use openrouter::OpenRouterGenerator;

/// Build the generator chain from configuration.
///
/// Without an API key only the static generator is used.
pub fn create_generator(config: &OpenRouterConfig) -> Result<Arc<dyn ContentGenerator>> {
    let fallback: Arc<dyn ContentGenerator> = Arc::new(StaticContentGenerator::new());

    if config.api_key.trim().is_empty() {
        tracing::warn!("⚠️ OPENROUTER_API_KEY not set — posts will use canned content");
        return Ok(Arc::new(GeneratorChain::new(vec![fallback])));
    }

    let live: Arc<dyn ContentGenerator> = Arc::new(OpenRouterGenerator::new(config)?);
    tracing::info!("✅ Content generator: {} (fallback: static)", live.name());
    Ok(Arc::new(GeneratorChain::with_fallback(live, fallback)))
}
