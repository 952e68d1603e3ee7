//! Integration assignment endpoint

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, routing::patch, Json, Router};
use codetix_crm::application::dto::{AssignToAgentCommand, ManualAssignmentCommand};
use codetix_crm::UseCaseError;

use crate::{error::ApiError, middleware::LeadsApiKey, models::*, ApiState};

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route("/assign", patch(assign))
}

fn invalid(message: &str) -> ApiError {
    ApiError::Assignment(UseCaseError::ValidationError(message.to_string()))
}

/// Assign leads manually
///
/// Accepts `{lead_id, assigned_to}`, `{assignments: [...]}` or
/// `{agent, limit?}`. Capacity and zone rules do not apply.
#[utoipa::path(
    patch,
    path = "/api/leads/assign",
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Assignment result", body = MessageBody),
        (status = 400, description = "Invalid body", body = MessageBody),
        (status = 401, description = "Missing or wrong API key", body = MessageBody),
        (status = 404, description = "Agent not found", body = MessageBody),
        (status = 500, description = "Store failure", body = MessageBody)
    ),
    tag = "leads",
    security(("leads_api_key" = []))
)]
pub async fn assign(
    State(state): State<Arc<ApiState>>,
    _key: LeadsApiKey,
    body: Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(request) = body.map_err(|_| invalid("Body inválido."))?;

    if let Some(pairs) = request.assignments {
        if pairs.is_empty() {
            return Err(invalid("Debes indicar al menos una asignación."));
        }
        let commands = pairs
            .into_iter()
            .map(|p| ManualAssignmentCommand { lead_id: p.lead_id, assigned_to: p.assigned_to })
            .collect();
        let outcomes = state.assignment.assign_many(commands).await;
        let assigned = outcomes.iter().filter(|o| o.success).count();
        return Ok(Json(MessageBody {
            success: assigned == outcomes.len(),
            message: None,
            assigned: Some(assigned),
            results: Some(outcomes.into_iter().map(AssignmentResult::from).collect()),
        }));
    }

    if let (Some(lead_id), Some(assigned_to)) = (&request.lead_id, &request.assigned_to) {
        state
            .assignment
            .assign_lead(ManualAssignmentCommand { lead_id: lead_id.clone(), assigned_to: assigned_to.clone() })
            .await
            .map_err(ApiError::Assignment)?;
        return Ok(Json(MessageBody::message("Lead asignado correctamente.")));
    }

    let result = state
        .assignment
        .assign_oldest_to_agent(AssignToAgentCommand {
            agent: request.agent.unwrap_or_default(),
            limit: request.limit,
        })
        .await
        .map_err(ApiError::Assignment)?;

    let mut body = MessageBody {
        success: true,
        message: None,
        assigned: Some(result.assigned),
        results: None,
    };
    if result.assigned == 0 {
        body.message = Some("No hay leads disponibles.".into());
    }
    Ok(Json(body))
}
