//! Contact endpoint handlers.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header::RETRY_AFTER, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::contact::{ContactForm, Mailer};
use crate::i18n::{Locale, MessageKey};
use crate::ratelimit::{client_identifier, RateLimiter};

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The contact form rate limiter
    pub limiter: Arc<RateLimiter>,
    /// Where accepted submissions are delivered
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(limiter: Arc<RateLimiter>, mailer: Arc<dyn Mailer>) -> Self {
        Self { limiter, mailer }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/contact", post(contact_handler))
        .with_state(state)
}

/// Liveness probe.
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Largest contact payload read from the wire, in bytes.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Accept a contact form submission.
///
/// The rate limit is checked before the body is read, so a blocked client
/// cannot make the service buffer its payload.
#[instrument(skip_all, fields(client = tracing::field::Empty, locale = tracing::field::Empty))]
pub async fn contact_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let locale = Locale::from_headers(&headers);
    let identifier = client_identifier(&headers);

    let span = tracing::Span::current();
    span.record("client", identifier.as_str());
    span.record("locale", tracing::field::display(locale));

    let decision = state.limiter.check(&identifier);
    if !decision.success {
        let retry_after = decision.retry_after(state.limiter.now());
        warn!(
            reset_time = decision.reset_time,
            retry_after_secs = retry_after.as_secs(),
            "Contact submission rate limited"
        );
        return too_many_requests(locale, retry_after);
    }

    debug!(remaining = decision.remaining, "Contact submission admitted");

    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, limit = MAX_BODY_BYTES, "Failed to read contact payload");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                locale,
                MessageKey::InternalServerError,
            );
        }
    };

    let form: ContactForm = match serde_json::from_slice(&body) {
        Ok(form) => form,
        Err(e) => {
            debug!(error = %e, "Malformed contact payload");
            return error_response(StatusCode::BAD_REQUEST, locale, MessageKey::InvalidFormData);
        }
    };

    if let Err(e) = form.validate() {
        debug!(error = %e, "Invalid contact form");
        return error_response(StatusCode::BAD_REQUEST, locale, MessageKey::InvalidFormData);
    }

    match state.mailer.send(&form).await {
        Ok(()) => {
            info!("Contact email sent");
            Json(json!({ "success": true })).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to deliver contact email");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                locale,
                MessageKey::FailedToSendEmail,
            )
        }
    }
}

fn error_response(status: StatusCode, locale: Locale, key: MessageKey) -> Response {
    (status, Json(json!({ "error": locale.message(key) }))).into_response()
}

fn too_many_requests(locale: Locale, retry_after: std::time::Duration) -> Response {
    // Round up so clients never retry a moment too early.
    let secs = retry_after.as_millis().div_ceil(1000).max(1);
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "error": locale.too_many_requests(retry_after) })),
    )
        .into_response();

    if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
        response.headers_mut().insert(RETRY_AFTER, value);
    }
    response
}
