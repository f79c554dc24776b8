//! API router.
//!
//! Everything except `/api/health` sits behind the identity middleware:
//! the session layer in front of this service forwards the resolved
//! user as headers, and handlers receive a typed `ActingIdentity`.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::state::AppState;

/// Build the API router with all routes mounted under `/api`.
pub fn api_router(state: Arc<AppState>) -> Router {
    build_router(ApiContext::new(state))
}

fn build_router(ctx: ApiContext) -> Router {
    let protected = Router::new()
        .route("/departments", get(endpoints::departments::list))
        .route("/departments/:id", get(endpoints::departments::detail))
        .route("/doctors", get(endpoints::doctors::list))
        .route("/doctors/:id", get(endpoints::doctors::detail))
        .route("/doctors/:id/slots", get(endpoints::doctors::day_slots))
        .route("/doctors/:id/calendar", get(endpoints::doctors::calendar))
        .route(
            "/appointments",
            post(endpoints::appointments::create).get(endpoints::appointments::list),
        )
        .route("/appointments/:id", get(endpoints::appointments::detail))
        .route(
            "/appointments/:id/confirm",
            post(endpoints::appointments::confirm),
        )
        .route(
            "/appointments/:id/complete",
            post(endpoints::appointments::complete),
        )
        .route(
            "/appointments/:id/cancel",
            post(endpoints::appointments::cancel),
        )
        .route(
            "/appointments/:id/payment",
            post(endpoints::payments::initiate).get(endpoints::payments::detail),
        )
        .route("/appointments/:id/refund", post(endpoints::payments::refund))
        .route(
            "/appointments/:id/records",
            post(endpoints::records::add).get(endpoints::records::for_appointment),
        )
        .route("/records", get(endpoints::records::history))
        .route("/admin/overview", get(endpoints::admin::overview))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(
            middleware::identity::require_identity,
        ));

    // Health stays reachable without identity headers.
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(CorsLayer::permissive())
}
