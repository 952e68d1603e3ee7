//! Lead status transitions

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, routing::patch, Json, Router};
use codetix_crm::application::dto::ChangeStatusCommand;
use codetix_crm::UseCaseError;

use crate::{error::ApiError, middleware::Session, models::*, ApiState};

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route("/status", patch(update_status))
}

/// Change a lead's status
///
/// `changed_by` defaults to the session user.
#[utoipa::path(
    patch,
    path = "/api/leads/status",
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Updated lead", body = StatusResponse),
        (status = 400, description = "Missing fields or invalid status", body = ErrorBody),
        (status = 401, description = "No session", body = ErrorBody),
        (status = 404, description = "Lead not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "leads",
    security(("session" = []))
)]
pub async fn update_status(
    State(state): State<Arc<ApiState>>,
    Session(user): Session,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) = body.map_err(|_| {
        UseCaseError::ValidationError("Los campos lead_id y status son obligatorios.".into())
    })?;

    let lead = state
        .status
        .change_status(ChangeStatusCommand {
            lead_id: request.lead_id,
            status: request.status,
            changed_by: request.changed_by.or_else(|| Some(user.to_string())),
        })
        .await?;

    Ok(Json(StatusResponse { success: true, data: LeadView::from(&lead) }))
}
