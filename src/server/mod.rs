//! Webhook server for LINE
//!
//! `POST /webhook` checks the `X-Line-Signature` header, runs every event of
//! the batch concurrently and answers each through the LINE reply API.
//! `/api` serves the task board as JSON.

pub mod api;
pub mod error;
pub mod events;
pub mod line;
pub mod signature;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::command;
use crate::config::Config;
use crate::processor::MessageProcessor;

pub use error::{Result, ServerError};
use events::{Event, EventAction, Greeting, WebhookBody};
pub use line::LineClient;

pub struct AppState {
    pub processor: MessageProcessor,
    pub line: LineClient,
    pub channel_secret: Option<String>,
    /// Skip signature checks and expose the /test routes
    pub skip_signature: bool,
}

impl AppState {
    pub fn from_config(config: &Config, processor: MessageProcessor) -> Result<Self> {
        Ok(Self {
            processor,
            line: LineClient::new(
                &config.line.api_base,
                config.line.channel_access_token.clone(),
            )?,
            channel_secret: config.line.channel_secret.clone(),
            skip_signature: config.line.skip_signature,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .route("/webhook/line", post(webhook))
        .nest("/api", api::router());

    if state.skip_signature {
        warn!("Signature checks are off; /test routes are enabled");
        app = app
            .route("/test/parse", post(test_parse))
            .route("/test/message", post(test_message));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    info!("Server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.processor.store().name(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !state.skip_signature {
        let signature = headers
            .get(signature::SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());
        let secret = state.channel_secret.as_deref().unwrap_or_default();
        let valid = match signature {
            Some(sig) if !secret.is_empty() => signature::verify(secret, &body, sig),
            _ => false,
        };
        if !valid {
            warn!(present = signature.is_some(), "Rejected webhook signature");
            return bad_request("invalid signature");
        }
    }

    let payload: WebhookBody = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Unreadable webhook body: {}", e);
            return bad_request("invalid body");
        }
    };

    info!(events = payload.events.len(), "Webhook received");
    join_all(payload.events.iter().map(|event| handle_event(&state, event))).await;

    Json(json!({ "status": "ok" })).into_response()
}

async fn handle_event(state: &AppState, event: &Event) {
    let user = event.source.id();
    let formatter = state.processor.formatter();

    let text = match event.action() {
        EventAction::Process(text) => state.processor.process(&text, user).await.message,
        EventAction::Greet(Greeting::Follow) => {
            info!(user, "New follower");
            formatter.follow_text().to_string()
        }
        EventAction::Greet(Greeting::Join) => {
            info!(source = user, "Joined group");
            formatter.join_text().to_string()
        }
        EventAction::BadPostback => formatter.postback_failed_text().to_string(),
        EventAction::UnknownAction(action) => {
            debug!(user, action = %action, "Unknown postback action");
            formatter.unknown_action_text().to_string()
        }
        EventAction::Ignore(reason) => {
            info!(user, reason, "Ignoring event");
            return;
        }
    };

    let Some(token) = event.reply_token.as_deref() else {
        debug!(user, "Event has no reply token");
        return;
    };

    if let Err(e) = state.line.reply(token, &text).await {
        warn!(user, "Failed to reply: {}", e);
        let fallback = formatter.event_error_text(&e.to_string());
        if let Err(e) = state.line.reply(token, &fallback).await {
            warn!(user, "Failed to send error reply: {}", e);
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default = "default_test_user")]
    user_id: String,
}

fn default_test_user() -> String {
    "test-user".to_string()
}

async fn test_parse(Json(req): Json<TestRequest>) -> Response {
    let Some(message) = req.message else {
        return bad_request("Missing message parameter");
    };
    let parsed = command::parse(&message);
    Json(json!({ "success": true, "input": message, "command": parsed })).into_response()
}

async fn test_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TestRequest>,
) -> Response {
    let Some(message) = req.message else {
        return bad_request("Missing message parameter");
    };
    let reply = state.processor.process(&message, &req.user_id).await;
    Json(json!({
        "success": true,
        "input": { "message": message, "userId": req.user_id },
        "result": reply,
    }))
    .into_response()
}
