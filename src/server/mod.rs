//! HTTP surface: the Slack Events API endpoint and the liveness check.
//!
//! The events endpoint verifies every request, acknowledges right away, and
//! hands mentions to a background task so Slack never waits on image generation.

pub mod signature;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, info, instrument, warn};

use crate::{
    base::types::{SlackEnvelope, SlackInnerEvent, Void},
    interaction,
    runtime::Runtime,
};

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "memory-lane-slack-bot";

/// Build the application router.
pub fn router(runtime: Runtime) -> Router {
    Router::new()
        .route("/slack/events", post(handle_events))
        .route("/health", get(handle_health))
        .with_state(runtime)
}

/// Bind the configured address and serve until Ctrl-C.
///
/// Background generation tasks still running at shutdown are dropped with the runtime.
pub async fn serve(runtime: Runtime) -> Void {
    let listener = TcpListener::bind(&runtime.config.bind_address).await?;

    info!("Listening on {} (webhook endpoint: /slack/events)", listener.local_addr()?);

    axum::serve(listener, router(runtime)).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server stopped.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }

    info!("Shutdown requested ...");
}

// Handlers.

/// Handles Slack Events API deliveries.
#[instrument(skip_all)]
async fn handle_events(State(runtime): State<Runtime>, headers: HeaderMap, body: Bytes) -> Response {
    // Verify the request before looking at it.

    if let Err(err) = signature::verify_signature(
        &runtime.config.slack_signing_secret,
        header_str(&headers, signature::TIMESTAMP_HEADER),
        header_str(&headers, signature::SIGNATURE_HEADER),
        &body,
        chrono::Utc::now().timestamp(),
        runtime.config.signature_max_age_secs,
    ) {
        warn!("Rejected webhook request: {}", err);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    // Parse the envelope.

    let envelope = match serde_json::from_slice::<SlackEnvelope>(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!("Failed to parse webhook body: {}", err);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match envelope {
        SlackEnvelope::UrlVerification { challenge } => {
            info!("URL verification challenge received.");
            Json(json!({ "challenge": challenge })).into_response()
        }
        SlackEnvelope::EventCallback {
            event_id,
            event: SlackInnerEvent::AppMention(mention),
        } => {
            info!("Received app mention event {} ...", event_id.as_deref().unwrap_or("<none>"));

            // Not awaited; Slack expects an answer within three seconds.
            let _ = interaction::app_mention::handle_app_mention(mention, runtime.config.clone(), runtime.image.clone(), runtime.chat.clone());

            Json(json!({ "status": "ok" })).into_response()
        }
        SlackEnvelope::EventCallback { .. } | SlackEnvelope::Other => {
            debug!("Ignoring unhandled Slack payload.");
            Json(json!({ "status": "ok" })).into_response()
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Liveness check.
async fn handle_health(State(runtime): State<Runtime>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "slack_configured": !runtime.config.slack_bot_token.is_empty(),
        "replicate_configured": !runtime.config.replicate_api_token.is_empty(),
        "trigger_word": runtime.config.trigger_word,
    }))
}
