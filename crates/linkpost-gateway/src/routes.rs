//! API route handlers for posts, user config and the cron entry point.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use linkpost_core::types::{PostDraft, UserConfigPatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::error::{ApiError, ApiResult};
use super::extract::ApiJson;
use super::server::AppState;

/// `{success: true, data}` envelope.
fn success<T: Serialize>(data: T) -> Json<Value> {
    Json(serde_json::json!({
        "success": true,
        "data": data,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    pub topic: Option<String>,
    pub additional_context: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefineRequest {
    pub post_draft: Option<PostDraft>,
    pub feedback: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishRequest {
    pub finalized_post: Option<PostDraft>,
    pub access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenQuery {
    pub access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigUpdateRequest {
    pub config: Option<UserConfigPatch>,
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "linkpost",
        "version": env!("CARGO_PKG_VERSION"),
        "mode": state.trigger.mode(),
        "uptimeSecs": state.start_time.elapsed().as_secs(),
    }))
}

/// Generate a post draft from a topic and the stored preferences.
pub async fn generate_post(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<GenerateRequest>,
) -> ApiResult<Json<Value>> {
    let topic = body
        .topic
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Topic is required"))?;

    let style = state.store.get().await?;
    tracing::info!("📝 Generating post draft on topic: {topic}");
    let draft = state
        .composer
        .compose(&topic, &style, body.additional_context.as_deref().unwrap_or(""))
        .await?;
    Ok(success(draft))
}

/// Refine a draft according to feedback.
pub async fn refine_post(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RefineRequest>,
) -> ApiResult<Json<Value>> {
    let draft = body
        .post_draft
        .ok_or_else(|| ApiError::bad_request("postDraft is required"))?;
    let feedback = body
        .feedback
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Feedback is required"))?;

    let refined = state.composer.refine(&draft, &feedback).await?;
    Ok(success(refined))
}

/// Publish a finalized draft.
pub async fn publish_post(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<PublishRequest>,
) -> ApiResult<Json<Value>> {
    let draft = body
        .finalized_post
        .ok_or_else(|| ApiError::bad_request("finalizedPost is required"))?;

    tracing::info!("📤 Publishing post to {}", state.publisher.name());
    let result = state
        .publisher
        .publish(&draft, &[], body.access_token.as_deref())
        .await?;
    Ok(success(result))
}

/// Engagement metrics for a published post.
pub async fn post_engagement(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<Value>> {
    tracing::info!("📊 Getting engagement metrics for post: {post_id}");
    let metrics = state
        .publisher
        .fetch_engagement(&post_id, query.access_token.as_deref())
        .await?;
    Ok(success(metrics))
}

pub async fn get_user_config(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    Ok(success(state.store.get().await?))
}

/// Merge a partial config. A changed frequency re-arms the trigger.
pub async fn update_user_config(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ConfigUpdateRequest>,
) -> ApiResult<Json<Value>> {
    let patch = body
        .config
        .ok_or_else(|| ApiError::bad_request("config is required"))?;

    let before = state.store.get().await?;
    let updated = state.store.update(patch).await?;

    if updated.post_frequency != before.post_frequency {
        tracing::info!(
            "🔁 Post frequency changed {} → {}",
            before.post_frequency,
            updated.post_frequency
        );
        state
            .trigger
            .set_schedule(updated.post_frequency.label())
            .await;
    }
    Ok(success(updated))
}

/// Cron entry point: run one generate-and-maybe-publish cycle.
pub async fn scheduled_post(State(state): State<Arc<AppState>>) -> Response {
    tracing::info!("⏰ Running scheduled post via cron endpoint");

    match state.trigger.run_cycle().await {
        Ok(outcome) => {
            let body = match &outcome.publish_result {
                Some(result) => serde_json::json!({
                    "success": true,
                    "message": "Post generated and published successfully",
                    "topic": outcome.topic,
                    "postId": result.id,
                }),
                None => serde_json::json!({
                    "success": true,
                    "message": "Post generated successfully (not published - auto-publish is disabled)",
                    "topic": outcome.topic,
                }),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => ApiError::internal(e.to_string()).into_response(),
    }
}
