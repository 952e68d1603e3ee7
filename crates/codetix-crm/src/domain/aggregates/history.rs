//! Lead history
//!
//! Append-only audit trail of assignments and status transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EntityId, LeadStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Assign,
    Unassign,
    StatusChange,
}

impl HistoryAction {
    pub const ALL: [HistoryAction; 3] = [Self::Assign, Self::Unassign, Self::StatusChange];

    /// Parse the stored action name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name.trim())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Unassign => "unassign",
            Self::StatusChange => "status_change",
        }
    }
}

/// A single audit row. Never mutated after insert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: EntityId,
    pub lead_id: EntityId,
    pub user_id: Option<EntityId>,
    pub action: HistoryAction,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_status: Option<LeadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_status: Option<LeadStatus>,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn assign(lead_id: EntityId, user_id: EntityId, description: impl Into<String>) -> Self {
        Self::new(lead_id, Some(user_id), HistoryAction::Assign, Some(description.into()))
    }

    pub fn unassign(lead_id: EntityId, user_id: EntityId, description: impl Into<String>) -> Self {
        Self::new(lead_id, Some(user_id), HistoryAction::Unassign, Some(description.into()))
    }

    pub fn status_change(
        lead_id: EntityId,
        changed_by: Option<EntityId>,
        old_status: LeadStatus,
        new_status: LeadStatus,
    ) -> Self {
        let mut entry = Self::new(
            lead_id,
            changed_by,
            HistoryAction::StatusChange,
            Some(format!("Estado cambiado de {} a {}", old_status, new_status)),
        );
        entry.old_status = Some(old_status);
        entry.new_status = Some(new_status);
        entry
    }

    fn new(
        lead_id: EntityId,
        user_id: Option<EntityId>,
        action: HistoryAction,
        description: Option<String>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            lead_id,
            user_id,
            action,
            description,
            old_status: None,
            new_status: None,
            created_at: Utc::now(),
        }
    }
}
