//! Webhook endpoint: signature check, event routing, hand-off to the responder.

pub mod signature;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use tokio::signal;
use tracing::{debug, error, info, info_span, Instrument};

use crate::handler::Responder;
use crate::pr::{self, PullRequestContext};
use crate::report::{self, DeliveryError};

const EVENT_HEADER: &str = "x-github-event";
const DELIVERY_HEADER: &str = "x-github-delivery";
const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Process-wide, read-only state shared by every delivery.
pub struct AppState {
    pub webhook_secret: String,
    pub responder: Responder,
}

/// Build the router: the webhook endpoint at `webhook_path` plus a liveness check.
pub fn create_router(state: Arc<AppState>, webhook_path: &str) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route(webhook_path, post(webhook))
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(state: Arc<AppState>, port: u16, webhook_path: &str) -> Result<(), std::io::Error> {
    let app = create_router(state, webhook_path);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, path = %webhook_path, "listening for webhook deliveries");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn health() -> &'static str {
    "ok"
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let event = header_str(&headers, EVENT_HEADER).unwrap_or_default().to_string();
    let delivery_id = header_str(&headers, DELIVERY_HEADER).unwrap_or("unknown").to_string();
    let signature = header_str(&headers, SIGNATURE_HEADER).map(str::to_string);

    let span = info_span!("delivery", id = %delivery_id, event = %event);
    async move {
        match dispatch(&state, &event, &delivery_id, signature.as_deref(), &body).await {
            Ok(outcome) => (StatusCode::OK, outcome),
            Err(e) => {
                report::report_delivery_error(&e);
                rejection(&e)
            }
        }
    }
    .instrument(span)
    .await
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn dispatch(
    state: &AppState,
    event: &str,
    delivery_id: &str,
    signature: Option<&str>,
    body: &[u8],
) -> Result<&'static str, DeliveryError> {
    signature::verify(&state.webhook_secret, body, signature)?;

    match event {
        "ping" => Ok("pong"),
        "pull_request" => {
            let payload = pr::parse_event(body)?;
            if payload.action.as_deref() != Some("opened") {
                debug!(action = ?payload.action, "ignoring pull_request action");
                return Ok("ignored");
            }

            let ctx = PullRequestContext::from_event(&payload)?;
            info!(repo = %ctx.full_name, pr = ctx.number, "handling opened pull request");
            state
                .responder
                .respond(&ctx)
                .await
                .map_err(|source| DeliveryError::Handler {
                    delivery_id: delivery_id.to_string(),
                    source,
                })?;
            Ok("ok")
        }
        other => {
            debug!(event = other, "ignoring unsubscribed event");
            Ok("ignored")
        }
    }
}

fn rejection(err: &DeliveryError) -> (StatusCode, &'static str) {
    match err {
        DeliveryError::Signature(_) => (StatusCode::UNAUTHORIZED, "signature verification failed"),
        DeliveryError::Payload(_) => (StatusCode::BAD_REQUEST, "malformed payload"),
        DeliveryError::Handler { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "handler failed"),
    }
}
