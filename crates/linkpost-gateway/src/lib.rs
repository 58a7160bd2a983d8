//! # LinkPost Gateway
//!
//! HTTP façade over the composer, publisher, config store and trigger.
//! JSON bodies use `{success, data}` on success and `{success:false, error}`
//! on failure.

pub mod auth;
pub mod error;
pub mod extract;
pub mod routes;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use extract::ApiJson;
pub use server::{AppState, build_router, start};
