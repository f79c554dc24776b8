//! Administrator overview endpoint.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::directory::{self, AdminOverview};
use crate::identity::ActingIdentity;

#[derive(Serialize)]
pub struct OverviewResponse {
    pub overview: AdminOverview,
}

/// `GET /api/admin/overview` — aggregate hospital counts.
pub async fn overview(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
) -> Result<Json<OverviewResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let today = chrono::Local::now().date_naive();
    let overview = directory::admin_overview(&conn, &actor, today)?;
    Ok(Json(OverviewResponse { overview }))
}
