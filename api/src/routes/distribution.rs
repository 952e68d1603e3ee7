//! Lead distribution trigger

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use crate::{error::ApiError, middleware::Session, models::*, ApiState};

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route("/distribute", post(distribute))
}

/// Distribute the unassigned pool among active agents
///
/// Runs are serialized within the process.
#[utoipa::path(
    post,
    path = "/api/leads/distribute",
    responses(
        (status = 200, description = "Distribution summary", body = DistributeResponse),
        (status = 400, description = "No active agents", body = ErrorBody),
        (status = 401, description = "No session", body = ErrorBody),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "leads",
    security(("session" = []))
)]
pub async fn distribute(
    State(state): State<Arc<ApiState>>,
    Session(user): Session,
) -> Result<Json<DistributeResponse>, ApiError> {
    let _run = state.distribution_lock.lock().await;
    let report = state.distribution.distribute(&user).await?;
    Ok(Json(report.into()))
}
