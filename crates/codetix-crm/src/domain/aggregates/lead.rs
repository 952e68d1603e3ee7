//! Lead Aggregate
//!
//! A prospective customer record in the distribution pool or in an agent's
//! pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::status::lenient_status;
use crate::domain::value_objects::{EntityId, LeadStatus};

/// Lead aggregate root
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    id: EntityId,
    #[serde(default)]
    zone: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    assigned_to: Option<EntityId>,
    #[serde(default, deserialize_with = "lenient_status")]
    status: LeadStatus,
    #[serde(default)]
    assigned_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// Create an unassigned lead in the `new` state
    pub fn new(id: EntityId, zone: Option<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            zone,
            created_at,
            assigned_to: None,
            status: LeadStatus::New,
            assigned_at: None,
        }
    }

    #[cfg(test)]
    pub fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = status;
        self
    }

    #[cfg(test)]
    pub fn with_assignment(mut self, agent_id: EntityId, at: DateTime<Utc>) -> Self {
        self.assigned_to = Some(agent_id);
        self.assigned_at = Some(at);
        self
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn zone(&self) -> Option<&str> { self.zone.as_deref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn assigned_to(&self) -> Option<&EntityId> { self.assigned_to.as_ref() }
    pub fn status(&self) -> LeadStatus { self.status }
    pub fn assigned_at(&self) -> Option<DateTime<Utc>> { self.assigned_at }
    pub fn is_unassigned(&self) -> bool { self.assigned_to.is_none() }

    /// Whether this lead occupies one of `agent_id`'s capacity slots
    pub fn counts_against(&self, agent_id: &EntityId) -> bool {
        self.assigned_to.as_ref() == Some(agent_id) && self.status.is_active()
    }

    // =========================================================================
    // Business Operations
    // =========================================================================

    /// Hand the lead to an agent
    pub fn assign(&mut self, agent_id: EntityId, at: DateTime<Utc>) {
        self.assigned_to = Some(agent_id);
        self.status = LeadStatus::Assigned;
        self.assigned_at = Some(at);
    }

    /// Return the lead to the unassigned pool in the status it held before
    /// the assignment
    pub fn release(&mut self, prior_status: LeadStatus) {
        self.assigned_to = None;
        self.status = prior_status;
        self.assigned_at = None;
    }

    /// Move to a new status, returning the previous one
    pub fn change_status(&mut self, status: LeadStatus) -> LeadStatus {
        std::mem::replace(&mut self.status, status)
    }
}
