use std::sync::Arc;

use anyhow::Error;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::{
    clients::{health::HealthChecker, provider::NotificationProvider, webhook::WebhookClient},
    config::Config,
    dispatch::DispatchEngine,
    models::{
        health::HealthStatus,
        message::{BroadcastNotification, DirectNotification},
        webhook::{CompletionCallback, NotificationKind},
    },
};

pub struct AppState {
    engine: DispatchEngine,
    webhook_client: WebhookClient,
    health_checker: HealthChecker,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn NotificationProvider>,
        webhook_client: WebhookClient,
        config: &Config,
    ) -> Self {
        Self {
            engine: DispatchEngine::from_config(Arc::clone(&provider), config),
            webhook_client,
            health_checker: HealthChecker::new(provider, config.max_batch_size),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Broadcast dispatch failed: {0:#}")]
    Dispatch(Error),

    #[error("Direct send failed: {0:#}")]
    Send(Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Decode(_) => StatusCode::BAD_REQUEST,
            ApiError::Dispatch(_) | ApiError::Send(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!(status = status.as_u16(), error = %self, "Request failed");
        status.into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/send-to-followers", post(send_to_followers))
        .route("/my-show", post(send_to_me))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: Config, state: Arc<AppState>) -> Result<(), Error> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.listen_port());
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification server started");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Bodies are decoded as JSON whatever `Content-Type` says.
async fn send_to_followers(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let message: BroadcastNotification = serde_json::from_slice(&body)?;
    let context = message.context();

    let span = info_span!(
        "broadcast",
        request_id = %Uuid::new_v4(),
        hall_id = %context.hall_id,
        show_id = %context.show_id,
        category = %message.category,
        recipients = message.recipients.len(),
    );

    async move {
        let outcome = state
            .engine
            .dispatch_broadcast(&message)
            .await
            .map_err(ApiError::Dispatch)?;

        if !outcome.dispatch_errors.is_empty() {
            warn!(
                failed_batches = outcome.dispatch_errors.len(),
                undelivered = outcome.undelivered_tokens(),
                "Broadcast dispatched with failed batches"
            );
        }

        let callback = CompletionCallback::new(NotificationKind::ScheduledShow, context.show_id);
        report_completion(&state.webhook_client, &callback).await;

        Ok(StatusCode::OK)
    }
    .instrument(span)
    .await
}

async fn send_to_me(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let message: DirectNotification = serde_json::from_slice(&body)?;
    let context = message.context();

    let span = info_span!(
        "direct",
        request_id = %Uuid::new_v4(),
        hall_id = %context.hall_id,
        show_id = %context.show_id,
        category = %message.category,
    );

    async move {
        state
            .engine
            .send_direct(&message)
            .await
            .map_err(ApiError::Send)?;

        let callback = CompletionCallback::new(NotificationKind::MyShow, context.show_id);
        report_completion(&state.webhook_client, &callback).await;

        Ok(StatusCode::OK)
    }
    .instrument(span)
    .await
}

/// Webhook failures are logged and never change the response already decided
/// for the send.
async fn report_completion(webhook_client: &WebhookClient, callback: &CompletionCallback) {
    if let Err(e) = webhook_client.notify(callback).await {
        warn!(
            noti_type = callback.notification_category.as_str(),
            show_id = %callback.reference_id,
            error = %format!("{:#}", e),
            "Send timestamp webhook failed"
        );
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}
