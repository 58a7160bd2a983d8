//! LinkedIn OAuth routes. The CSRF `state` travels in a short-lived HttpOnly
//! cookie and must match the callback's `state` before any code exchange.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{
    Json,
    extract::{Query, State},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use linkpost_linkedin::{LOGIN_SCOPES, POSTING_SCOPES, generate_state, verify_state};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::error::{ApiError, ApiResult};
use super::extract::ApiJson;
use super::server::AppState;

pub const STATE_COOKIE: &str = "linkedin_oauth_state";
const STATE_TTL_SECS: u64 = 600;

fn state_cookie(state: &str) -> ApiResult<Cookie<'static>> {
    Cookie::parse(format!(
        "{STATE_COOKIE}={state}; Max-Age={STATE_TTL_SECS}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .map_err(|e| ApiError::internal(format!("Failed to build state cookie: {e}")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScopesQuery {
    /// Comma-separated scope list.
    pub scopes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// `GET /api/posts/linkedin-auth`: authorization URL plus its state.
pub async fn linkedin_auth_url(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<ScopesQuery>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let scopes: Vec<String> = match query.scopes.as_deref() {
        Some(list) if !list.trim().is_empty() => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => POSTING_SCOPES.iter().map(|s| s.to_string()).collect(),
    };

    let csrf = generate_state();
    let auth_url = state.oauth.authorization_url(&scopes, &csrf)?;
    let jar = jar.add(state_cookie(&csrf)?);

    Ok((
        jar,
        Json(serde_json::json!({
            "success": true,
            "data": { "authUrl": auth_url, "state": csrf },
        })),
    ))
}

/// `GET /api/auth/linkedin`: send the browser to LinkedIn.
pub async fn linkedin_redirect(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let csrf = generate_state();
    let prepared = state
        .oauth
        .authorization_url(LOGIN_SCOPES, &csrf)
        .map_err(ApiError::from)
        .and_then(|url| state_cookie(&csrf).map(|cookie| (url, cookie)));

    match prepared {
        Ok((url, cookie)) => (jar.add(cookie), Redirect::temporary(&url)).into_response(),
        Err(e) => {
            tracing::error!("❌ Error initiating LinkedIn auth: {e:?}");
            ApiError::internal("Failed to initiate LinkedIn authentication").into_response()
        }
    }
}

/// `GET /api/auth/linkedin/callback`
pub async fn linkedin_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error.as_deref() {
        let detail = query.error_description.as_deref().unwrap_or("");
        tracing::error!("❌ LinkedIn auth error: {error} {detail}");
        return ApiError::bad_request(format!("LinkedIn authentication error: {error}"))
            .into_response();
    }

    let stored = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    if verify_state(stored.as_deref(), query.state.as_deref()).is_err() {
        return ApiError::new(
            StatusCode::FORBIDDEN,
            "State parameter mismatch. Possible CSRF attack.",
        )
        .into_response();
    }

    let Some(code) = query.code.filter(|c| !c.trim().is_empty()) else {
        return ApiError::bad_request("Authorization code is required").into_response();
    };

    match state.oauth.exchange_code(&code).await {
        Ok(tokens) => {
            tracing::info!("✅ LinkedIn authentication successful");
            let jar = jar.remove(Cookie::build(STATE_COOKIE).path("/"));
            (
                jar,
                Json(serde_json::json!({
                    "success": true,
                    "message": "Authentication successful",
                    "tokenDetails": tokens,
                })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("❌ Error in LinkedIn callback: {e}");
            ApiError::internal("Failed to complete LinkedIn authentication").into_response()
        }
    }
}

/// `POST /api/auth/linkedin/refresh`
pub async fn linkedin_refresh(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> ApiResult<Json<Value>> {
    let refresh_token = body
        .refresh_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Refresh token is required"))?;

    let tokens = state.oauth.refresh(&refresh_token).await.map_err(|e| {
        tracing::error!("❌ Error refreshing token: {e}");
        ApiError::internal("Failed to refresh token")
    })?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Token refreshed successfully",
        "tokenDetails": tokens,
    })))
}
