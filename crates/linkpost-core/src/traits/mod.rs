//! Trait seams between the trigger and its collaborators.

pub mod generator;
pub mod publisher;
pub mod store;

pub use generator::{ContentGenerator, GenerationRequest};
pub use publisher::Publisher;
pub use store::ConfigStore;
