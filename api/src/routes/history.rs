//! Recent lead history

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use codetix_crm::application::dto::HistoryQuery;
use codetix_crm::{HistoryAction, UseCaseError};

use crate::{error::ApiError, middleware::Session, models::*, ApiState};

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route("/history", get(list_history))
}

/// Most recent history entries, newest first
#[utoipa::path(
    get,
    path = "/api/leads/history",
    params(HistoryParams),
    responses(
        (status = 200, description = "History entries", body = HistoryResponse),
        (status = 400, description = "Invalid filter", body = ErrorBody),
        (status = 401, description = "No session", body = ErrorBody),
        (status = 403, description = "Caller is not an admin", body = ErrorBody)
    ),
    tag = "leads",
    security(("session" = []))
)]
pub async fn list_history(
    State(state): State<Arc<ApiState>>,
    Session(user): Session,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Query(params) = params.map_err(|e| UseCaseError::ValidationError(e.body_text()))?;

    let action = match params.action.as_deref() {
        None | Some("") => None,
        Some(name) => Some(HistoryAction::from_name(name).ok_or_else(|| {
            UseCaseError::ValidationError("Acción inválida. Valores permitidos: assign, unassign, status_change".into())
        })?),
    };

    let entries = state
        .history
        .recent_history(&user, HistoryQuery { action, limit: params.limit })
        .await?;

    Ok(Json(HistoryResponse {
        success: true,
        data: entries.into_iter().map(HistoryEntryView::from).collect(),
    }))
}
