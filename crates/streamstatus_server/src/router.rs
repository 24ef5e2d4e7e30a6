//! HTTP routes.

use crate::dispatch::SyncDispatcher;
use crate::error::ServerError;
use crate::handler::{WebhookHandler, WebhookReply};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Path the provider delivers notifications to.
pub const CALLBACK_PATH: &str = "/webhook/callbacks";

/// Health check path.
pub const HEALTH_PATH: &str = "/healthz";

/// State shared by request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Verifies and decodes deliveries.
    pub handler: Arc<WebhookHandler>,
    /// Schedules sync cycles.
    pub dispatcher: Arc<SyncDispatcher>,
}

impl AppState {
    /// Creates router state.
    pub fn new(handler: WebhookHandler, dispatcher: Arc<SyncDispatcher>) -> Self {
        Self {
            handler: Arc::new(handler),
            dispatcher,
        }
    }
}

/// Creates the webhook router.
pub fn webhook_router(state: AppState) -> Router {
    Router::new()
        .route(CALLBACK_PATH, post(webhook_callback))
        .route(HEALTH_PATH, get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn webhook_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    let response = match state.handler.handle(&headers, &body)? {
        WebhookReply::Challenge(token) => (StatusCode::OK, token).into_response(),
        WebhookReply::Accepted(event) => {
            state.dispatcher.dispatch(event)?;
            (StatusCode::OK, "ok").into_response()
        }
        WebhookReply::Revoked | WebhookReply::Ignored(_) => StatusCode::OK.into_response(),
    };
    Ok(response)
}

async fn health() -> &'static str {
    "ok"
}
