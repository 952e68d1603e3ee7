//! API Models

use chrono::{DateTime, Utc};
use codetix_crm::application::dto::{AgentAssignmentDetail, AssignmentOutcome, DistributionReport};
use codetix_crm::{HistoryEntry, Lead};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Failure body for session-guarded endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// Response body for the integration assignment endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<AssignmentResult>>,
}

impl MessageBody {
    pub fn message(message: impl Into<String>) -> Self {
        Self { success: true, message: Some(message.into()), assigned: None, results: None }
    }
}

// ============ Distribution ============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgentDetail {
    /// Agent display name
    pub agent: String,
    pub assigned_count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DistributeResponse {
    pub success: bool,
    pub total_distributed: usize,
    pub details: Vec<AgentDetail>,
}

impl From<DistributionReport> for DistributeResponse {
    fn from(report: DistributionReport) -> Self {
        Self {
            success: true,
            total_distributed: report.total_distributed,
            details: report
                .details
                .into_iter()
                .map(|AgentAssignmentDetail { agent, assigned_count }| AgentDetail { agent, assigned_count })
                .collect(),
        }
    }
}

// ============ Assignment ============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentPair {
    pub lead_id: String,
    pub assigned_to: String,
}

/// One of three shapes: a single pair, a list of pairs, or an agent name
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AssignRequest {
    pub lead_id: Option<String>,
    pub assigned_to: Option<String>,
    pub assignments: Option<Vec<AssignmentPair>>,
    /// Agent name, matched case-insensitively
    pub agent: Option<String>,
    /// Defaults to 15
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentResult {
    pub lead_id: String,
    pub assigned_to: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<AssignmentOutcome> for AssignmentResult {
    fn from(o: AssignmentOutcome) -> Self {
        Self { lead_id: o.lead_id, assigned_to: o.assigned_to, success: o.success, message: o.message }
    }
}

// ============ Status ============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusRequest {
    pub lead_id: String,
    pub status: String,
    pub changed_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeadView {
    pub id: String,
    pub zone: Option<String>,
    pub status: String,
    pub assigned_to: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Lead> for LeadView {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id().to_string(),
            zone: lead.zone().map(str::to_string),
            status: lead.status().to_string(),
            assigned_to: lead.assigned_to().map(|a| a.to_string()),
            assigned_at: lead.assigned_at(),
            created_at: lead.created_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    pub data: LeadView,
}

// ============ History ============

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// `assign`, `unassign` or `status_change`
    pub action: Option<String>,
    /// Defaults to 50, capped at 500
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryView {
    pub id: String,
    pub lead_id: String,
    pub user_id: Option<String>,
    pub action: String,
    pub description: Option<String>,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<HistoryEntry> for HistoryEntryView {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            lead_id: entry.lead_id.to_string(),
            user_id: entry.user_id.map(|u| u.to_string()),
            action: entry.action.as_str().to_string(),
            description: entry.description,
            old_status: entry.old_status.map(|s| s.to_string()),
            new_status: entry.new_status.map(|s| s.to_string()),
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub success: bool,
    pub data: Vec<HistoryEntryView>,
}
