//! Request/response logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use classroom_auth::Principal;

/// Logs method, path, status, duration and the acting subject.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let user = response
        .extensions()
        .get::<Principal>()
        .map_or_else(|| "Ø".to_string(), |p| p.user_id.to_string());

    info!(
        method = %method,
        path = %uri.path(),
        status = response.status().as_u16(),
        duration_ms = duration.as_millis() as u64,
        user = %user,
        "HTTP request"
    );

    response
}
