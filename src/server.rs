//! Pass-through fetch relay.
//!
//! Browsers cannot read a published spreadsheet cross-origin, and hitting
//! the export endpoint directly from many clients trips rate limits. The relay
//! fetches the target on the client's behalf and returns the upstream body
//! verbatim with a cacheable policy. It does no parsing or other processing.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/proxy?url=<target>` | Fetch `target` and return its body |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "missing 'url' query parameter" } }
//! ```
//!
//! | Status | Code | When |
//! |--------|------|------|
//! | 400 | `bad_request` | `url` missing, blank, or not an http(s) URL |
//! | 502 | `upstream_error` | upstream answered with a non-success status |
//! | 500 | `transport_error` | upstream could not be reached or read |
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the directory page can
//! call the relay from any host.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use url::Url;

use crate::config::Config;

const FALLBACK_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Shared state for the relay handlers.
#[derive(Clone)]
pub struct RelayState {
    client: reqwest::Client,
    cache_control: Arc<str>,
}

impl RelayState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.relay.timeout_secs))
            .user_agent(concat!("sheetdir-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            cache_control: Arc::from(config.relay.cache_control.as_str()),
        })
    }
}

/// Starts the relay on `[relay].bind` and serves until the process exits.
pub async fn run_relay(config: &Config) -> anyhow::Result<()> {
    let state = RelayState::from_config(config)?;
    let listener = TcpListener::bind(&config.relay.bind).await?;
    tracing::info!("relay listening on http://{}", config.relay.bind);
    serve_relay(listener, state).await
}

/// Serves the relay on an already-bound listener.
pub async fn serve_relay(listener: TcpListener, state: RelayState) -> anyhow::Result<()> {
    axum::serve(listener, relay_router(state)).await?;
    Ok(())
}

pub fn relay_router(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/proxy", get(handle_proxy))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn upstream_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_GATEWAY,
        code: "upstream_error",
        message: message.into(),
    }
}

fn transport_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "transport_error",
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /proxy ============

#[derive(Deserialize)]
struct ProxyParams {
    url: Option<String>,
}

async fn handle_proxy(
    State(state): State<RelayState>,
    params: Result<Query<ProxyParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) = params.map_err(|e| bad_request(e.body_text()))?;
    let target = params
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| bad_request("missing 'url' query parameter"))?;

    let target = Url::parse(target).map_err(|e| bad_request(format!("invalid url: {}", e)))?;
    if !matches!(target.scheme(), "http" | "https") {
        return Err(bad_request("url must use http or https"));
    }

    tracing::debug!(upstream = %target, "relaying");

    let upstream = state.client.get(target.clone()).send().await.map_err(|e| {
        tracing::warn!(upstream = %target, error = %e, "relay transport failure");
        transport_error(format!("failed to reach upstream: {}", e))
    })?;

    let status = upstream.status();
    if !status.is_success() {
        tracing::warn!(upstream = %target, status = %status, "upstream returned error status");
        return Err(upstream_error(format!("upstream returned HTTP {}", status)));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();

    let body = upstream
        .bytes()
        .await
        .map_err(|e| transport_error(format!("failed to read upstream body: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, state.cache_control.to_string()),
        ],
        body,
    )
        .into_response())
}
