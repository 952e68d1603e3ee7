//! Data Transfer Objects (DTOs)
//!
//! Objects for transferring data across boundaries.

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::HistoryAction;

/// Leads allocated to one agent in a distribution run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAssignmentDetail {
    pub agent: String,
    pub assigned_count: usize,
}

/// Summary of a distribution run. Agents that received nothing are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub total_distributed: usize,
    pub details: Vec<AgentAssignmentDetail>,
}

// =============================================================================
// Assignment Commands
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ManualAssignmentCommand {
    pub lead_id: String,
    pub assigned_to: String,
}

/// Per-pair result of a bulk manual assignment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub lead_id: String,
    pub assigned_to: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssignToAgentCommand {
    pub agent: String,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAssignmentResult {
    pub agent: String,
    pub assigned: usize,
}

// =============================================================================
// Status Commands
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChangeStatusCommand {
    pub lead_id: String,
    pub status: String,
    #[serde(default)]
    pub changed_by: Option<String>,
}

// =============================================================================
// Queries
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub action: Option<HistoryAction>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub const DEFAULT_LIMIT: usize = 50;
    pub const MAX_LIMIT: usize = 500;

    /// Requested limit clamped to `1..=MAX_LIMIT`
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            None | Some(0) => Self::DEFAULT_LIMIT,
            Some(n) => n.min(Self::MAX_LIMIT),
        }
    }
}
