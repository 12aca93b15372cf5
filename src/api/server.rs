//! HTTP management API
//!
//! Exposes plugin lifecycle operations and registry introspection over a
//! small JSON API. Every response uses one envelope shape:
//!
//! ```json
//! {"success": true,  "data": ..., "timestamp": "..."}
//! {"success": false, "error": {"code": "...", "message": "..."}, "timestamp": "..."}
//! ```
//!
//! Requests pass through a gate that applies rate limiting and, when an API
//! key is configured, `x-api-key` authentication. `/health` is exempt.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{ConnectInfo, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{Result, ToolbeltError};
use crate::plugins::PluginManager;
use crate::registry::{ToolCategory, ToolFilter, ToolRegistry};

use super::rate_limit::RateLimiter;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub manager: Arc<PluginManager>,
    pub registry: Arc<ToolRegistry>,
    api_key: Option<String>,
    limiter: Option<Arc<RateLimiter>>,
}

impl ApiState {
    pub fn new(manager: Arc<PluginManager>, config: &ServerConfig) -> Self {
        let registry = manager.registry().clone();
        let limiter = config
            .enable_rate_limit
            .then(|| Arc::new(RateLimiter::new(config.rate_limit_max)));
        Self {
            manager,
            registry,
            api_key: config.api_key.clone(),
            limiter,
        }
    }
}

/// Uniform response envelope.
#[derive(Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    timestamp: String,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data: Some(data),
        error: None,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

impl ToolbeltError {
    fn status(&self) -> StatusCode {
        match self {
            ToolbeltError::PluginNotFound(_) => StatusCode::NOT_FOUND,
            ToolbeltError::PluginAlreadyLoaded(_) => StatusCode::CONFLICT,
            ToolbeltError::PluginUnloadFailed { .. } => StatusCode::CONFLICT,
            ToolbeltError::PluginLoadFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ToolbeltError::DependencyCycle(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ToolbeltError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ToolbeltError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ToolbeltError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ToolbeltError {
    fn into_response(self) -> Response {
        let envelope = Envelope::<()> {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: self.code(),
                message: self.to_string(),
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (self.status(), Json(envelope)).into_response()
    }
}

/// Build the management router.
pub fn create_router(state: ApiState, enable_cors: bool) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/plugins", get(list_plugins))
        .route("/plugins/load", post(load_plugin))
        .route("/plugins/unload", post(unload_plugin))
        .route("/plugins/reload", post(reload_plugins))
        .route("/commands", get(list_commands))
        .route("/tools", get(list_tools))
        .route("/tools/stats", get(tool_stats))
        .layer(middleware::from_fn_with_state(state.clone(), gate))
        .with_state(state);

    if enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

/// Bind and serve the management API until the process exits.
pub async fn serve(state: ApiState, config: &ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Management API listening");

    let router = create_router(state, config.enable_cors);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| ToolbeltError::Server(format!("server error: {}", e)))?;
    Ok(())
}

/// Rate limiting and API key gate. Runs before every handler except that
/// `/health` is exempt from both checks.
async fn gate(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    if req.uri().path() == "/health" {
        return next.run(req).await;
    }

    let request_id = Uuid::new_v4();
    let client = client_key(&req);

    if let Some(limiter) = &state.limiter {
        if !limiter.check(&client) {
            warn!(%request_id, client = %client, "Rate limit exceeded");
            return ToolbeltError::RateLimited(format!(
                "rate limit exceeded for {}",
                client
            ))
            .into_response();
        }
    }

    if let Some(expected) = &state.api_key {
        let provided = req
            .headers()
            .get("x-api-key")
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            warn!(%request_id, client = %client, "Rejected request with bad API key");
            return ToolbeltError::Unauthorized("invalid or missing API key".to_string())
                .into_response();
        }
    }

    info!(%request_id, method = %req.method(), path = %req.uri().path(), "API request");
    next.run(req).await
}

/// Client identity for rate limiting: forwarded header when present,
/// otherwise the peer address.
fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|c| c.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// ---- handlers ----

async fn health() -> impl IntoResponse {
    ok(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_plugins(State(state): State<ApiState>) -> impl IntoResponse {
    ok(state.manager.list())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadRequest {
    path: String,
    #[serde(default)]
    force: bool,
}

async fn load_plugin(
    State(state): State<ApiState>,
    body: std::result::Result<Json<LoadRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(body) = body.map_err(|e| ToolbeltError::InvalidRequest(e.body_text()))?;
    if body.path.trim().is_empty() {
        return Err(ToolbeltError::InvalidRequest(
            "'path' must not be empty".to_string(),
        ));
    }
    let info = state.manager.load(&body.path, body.force).await?;
    Ok(ok(info).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnloadRequest {
    plugin_id: String,
    #[serde(default)]
    cascade: bool,
}

async fn unload_plugin(
    State(state): State<ApiState>,
    body: std::result::Result<Json<UnloadRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(body) = body.map_err(|e| ToolbeltError::InvalidRequest(e.body_text()))?;
    if body.plugin_id.trim().is_empty() {
        return Err(ToolbeltError::InvalidRequest(
            "'pluginId' must not be empty".to_string(),
        ));
    }
    state.manager.unload(&body.plugin_id, body.cascade).await?;
    Ok(ok(json!({ "pluginId": body.plugin_id })).into_response())
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ReloadRequest {
    #[serde(default)]
    plugin_id: Option<String>,
}

async fn reload_plugins(
    State(state): State<ApiState>,
    body: std::result::Result<Option<Json<ReloadRequest>>, JsonRejection>,
) -> Result<Response> {
    let body = body
        .map_err(|e| ToolbeltError::InvalidRequest(e.body_text()))?
        .map(|Json(b)| b)
        .unwrap_or_default();
    let infos = state.manager.reload(body.plugin_id.as_deref()).await?;
    Ok(ok(infos).into_response())
}

async fn list_commands(State(state): State<ApiState>) -> impl IntoResponse {
    ok(state.manager.list_commands())
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ToolsQuery {
    category: Option<ToolCategory>,
    tag: Option<String>,
    enabled: Option<bool>,
    query: Option<String>,
    author: Option<String>,
}

async fn list_tools(
    State(state): State<ApiState>,
    params: std::result::Result<Query<ToolsQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = params.map_err(|e| ToolbeltError::InvalidRequest(e.body_text()))?;
    let filter = ToolFilter {
        category: params.category,
        tags: params.tag.into_iter().collect(),
        enabled: params.enabled,
        query: params.query,
        author: params.author,
    };
    let tools = state.registry.search(&filter).await;
    Ok(ok(tools).into_response())
}

async fn tool_stats(State(state): State<ApiState>) -> impl IntoResponse {
    ok(state.registry.statistics().await)
}
