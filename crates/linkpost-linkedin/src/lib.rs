//! # LinkPost LinkedIn
//!
//! LinkedIn integration: the [`LinkedInPublisher`] (UGC posts, image uploads,
//! engagement metrics) and the [`LinkedInOAuth`] three-legged auth flow.

pub mod format;
pub mod oauth;
pub mod publisher;

pub use oauth::{LOGIN_SCOPES, LinkedInOAuth, POSTING_SCOPES, generate_state, verify_state};
pub use publisher::LinkedInPublisher;
