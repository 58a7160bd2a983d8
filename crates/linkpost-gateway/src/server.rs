//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use linkpost_core::config::{AppConfig, GatewayConfig};
use linkpost_core::error::Result;
use linkpost_core::traits::{ConfigStore, Publisher};
use linkpost_linkedin::{LinkedInOAuth, LinkedInPublisher};
use linkpost_providers::PostComposer;
use linkpost_scheduler::{CycleRunner, ScheduledTrigger, TriggerMode, UserConfigStore};
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<PostComposer>,
    pub publisher: Arc<dyn Publisher>,
    pub oauth: Arc<LinkedInOAuth>,
    pub store: Arc<dyn ConfigStore>,
    /// Owns the recurring timer; also runs cycles for the cron endpoint.
    pub trigger: Arc<ScheduledTrigger>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Wire every component from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let generator = linkpost_providers::create_generator(&config.openrouter)?;
        let composer = Arc::new(PostComposer::new(generator));
        let publisher: Arc<dyn Publisher> = Arc::new(LinkedInPublisher::new(&config.linkedin)?);
        let oauth = Arc::new(LinkedInOAuth::new(&config.linkedin)?);
        let store: Arc<dyn ConfigStore> = Arc::new(UserConfigStore::from_config(&config.storage));

        let runner = Arc::new(CycleRunner::new(
            store.clone(),
            composer.clone(),
            publisher.clone(),
            config.scheduler.auto_publish,
        ));
        let trigger = Arc::new(ScheduledTrigger::new(
            TriggerMode::from(config.scheduler.mode),
            runner,
            store.clone(),
        ));

        Ok(Self {
            composer,
            publisher,
            oauth,
            store,
            trigger,
            start_time: std::time::Instant::now(),
        })
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    build_router_from_arc(Arc::new(state))
}

pub fn build_router_from_arc(shared: Arc<AppState>) -> Router {
    let posts = Router::new()
        .route("/generate", post(super::routes::generate_post))
        .route("/refine", post(super::routes::refine_post))
        .route("/publish", post(super::routes::publish_post))
        .route("/engagement/{post_id}", get(super::routes::post_engagement))
        .route(
            "/config",
            get(super::routes::get_user_config).put(super::routes::update_user_config),
        )
        .route("/linkedin-auth", get(super::auth::linkedin_auth_url));

    let auth = Router::new()
        .route("/linkedin", get(super::auth::linkedin_redirect))
        .route("/linkedin/callback", get(super::auth::linkedin_callback))
        .route("/linkedin/refresh", post(super::auth::linkedin_refresh));

    let api = Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/cron/scheduled-post", post(super::routes::scheduled_post))
        .nest("/posts", posts)
        .nest("/auth", auth);

    Router::new()
        .nest("/api", api)
        .layer(
            CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .allow_origin(Any)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server and arm the scheduled trigger. The trigger is
/// stopped once `shutdown` resolves.
pub async fn start(
    config: &GatewayConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let trigger = state.trigger.clone();
    trigger.initialize().await;

    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    trigger.stop().await;
    tracing::info!("👋 Gateway server stopped");
    Ok(())
}
