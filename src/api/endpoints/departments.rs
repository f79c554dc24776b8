//! Department directory endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::directory::{self, DepartmentInfo};
use crate::models::Department;

#[derive(Serialize)]
pub struct DepartmentsResponse {
    pub departments: Vec<DepartmentInfo>,
}

/// `GET /api/departments` — all departments with doctor counts.
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<DepartmentsResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let departments = directory::list_departments(&conn)?;
    Ok(Json(DepartmentsResponse { departments }))
}

#[derive(Serialize)]
pub struct DepartmentResponse {
    pub department: Department,
}

/// `GET /api/departments/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DepartmentResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let department = directory::get_department(&conn, &id)?;
    Ok(Json(DepartmentResponse { department }))
}
