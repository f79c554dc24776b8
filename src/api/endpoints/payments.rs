//! Payment-gate endpoints.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::identity::ActingIdentity;
use crate::models::enums::PaymentMethod;
use crate::models::Payment;
use crate::payments;

#[derive(Deserialize)]
pub struct PaymentPayload {
    pub method: PaymentMethod,
    pub card_number: Option<String>,
}

#[derive(Serialize)]
pub struct PaymentResponse {
    pub payment: Payment,
}

/// `POST /api/appointments/:id/payment` — initiate or settle payment.
pub async fn initiate(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentPayload>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let mut conn = ctx.state.open_db()?;
    let payment = payments::initiate(
        &mut conn,
        &actor,
        &id,
        payload.method,
        payload.card_number.as_deref(),
    )?;
    Ok(Json(PaymentResponse { payment }))
}

/// `POST /api/appointments/:id/refund`
pub async fn refund(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let mut conn = ctx.state.open_db()?;
    let payment = payments::refund(&mut conn, &actor, &id)?;
    Ok(Json(PaymentResponse { payment }))
}

#[derive(Serialize)]
pub struct PaymentStatusResponse {
    pub payment: Option<Payment>,
}

/// `GET /api/appointments/:id/payment`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentStatusResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let payment = payments::get_for(&conn, &actor, &id)?;
    Ok(Json(PaymentStatusResponse { payment }))
}
