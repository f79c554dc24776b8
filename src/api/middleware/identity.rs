//! Acting-identity middleware.
//!
//! The session layer in front of this service authenticates the user
//! and forwards the resolved identity as `X-User-Id` and `X-User-Role`
//! headers. This middleware parses them once and injects
//! `ActingIdentity` into request extensions for the handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::identity::{ActingIdentity, Role};

pub async fn require_identity(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_identity_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_identity_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = req
        .headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or(ApiError::Unauthorized)?;

    let role = req
        .headers()
        .get("X-User-Role")
        .and_then(|v| v.to_str().ok())
        .and_then(Role::from_str)
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut()
        .insert(ActingIdentity::new(user_id, role));

    Ok(next.run(req).await)
}
