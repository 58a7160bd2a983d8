//! # LinkPost Core
//!
//! Shared data model, error taxonomy, configuration and the trait seams the
//! rest of the workspace plugs into.
//!
//! ```text
//! ScheduledTrigger ──► ConfigStore      (user preferences)
//!        │
//!        ├──────────► ContentGenerator  (OpenRouter → static fallback)
//!        │
//!        └──────────► Publisher         (LinkedIn UGC API)
//! ```

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::AppConfig;
pub use error::{CycleStage, LinkPostError, Result};
pub use traits::{ConfigStore, ContentGenerator, GenerationRequest, Publisher};
pub use types::{
    CycleOutcome, EngagementMetrics, Frequency, MediaAsset, PostDraft, PostMetadata,
    PublishResult, Refinement, TokenDetails, UserConfig, UserConfigPatch,
};
