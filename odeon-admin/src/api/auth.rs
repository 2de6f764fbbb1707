//! Admin authorization middleware
//!
//! Admin-only routes require the `X-Admin-Token` header to match the
//! configured token. Denial is a structured 403, not a redirect -- the
//! redirect-on-denial UX belongs to a presentation layer this service does
//! not have. An empty configured token disables the check (test/dev).

use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Require a valid admin token on the request
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Empty token disables admin gating entirely.
    if state.admin_token.is_empty() {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(token) if token == state.admin_token => Ok(next.run(request).await),
        Some(_) => {
            warn!(path = %request.uri().path(), "Admin token mismatch");
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
        None => Err(ApiError::Forbidden("Admin access required".to_string())),
    }
}
