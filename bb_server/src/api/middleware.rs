//! Authentication middleware for protected endpoints.
//!
//! [`auth_middleware`] validates the bearer token and injects the caller's
//! [`CallerIdentity`] into request extensions. [`admin_middleware`] runs
//! after it on admin routes and refuses callers without the admin claim.
//!
//! # Extracting the caller
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use battlebucks::CallerIdentity;
//!
//! async fn protected_handler(Extension(caller): Extension<CallerIdentity>) -> String {
//!     format!("Authenticated as {}", caller)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use battlebucks::CallerIdentity;

use super::AppState;
use crate::logging::log_security_event;

/// Validate `Authorization: Bearer <token>` and inject the caller.
///
/// - **Success**: injects `CallerIdentity` and calls the next handler
/// - **Missing header / bad format / invalid or expired token**: `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    match state.tokens.verify(token) {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!("Rejected bearer token: {}", e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Require the authenticated caller to be an admin.
///
/// Must be layered inside [`auth_middleware`]; a request that reaches it
/// without a caller is treated as unauthenticated.
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, StatusCode> {
    let Some(caller) = request.extensions().get::<CallerIdentity>() else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    if !caller.is_admin {
        log_security_event(
            "admin_required",
            Some(&caller.uid),
            &format!("{} {}", request.method(), request.uri().path()),
        );
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}
