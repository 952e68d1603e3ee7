//! Outbound ports (Repository traits)
//!
//! Hexagonal architecture: these are the interfaces that infrastructure must implement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::aggregates::{Agent, HistoryAction, HistoryEntry, Lead, UserProfile};
use crate::domain::value_objects::{EntityId, LeadStatus};

/// Lead pool, user directory and audit trail.
///
/// The backing store has no multi-statement transactions; every method is a
/// single round trip.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Users with the agent role and active status, in store order
    async fn list_active_agents(&self) -> Result<Vec<Agent>, RepositoryError>;

    /// Leads with no agent, oldest first
    async fn list_unassigned_leads(&self) -> Result<Vec<Lead>, RepositoryError>;

    /// Number of leads assigned to `agent_id` in an active status
    async fn count_active_leads(&self, agent_id: &EntityId) -> Result<u32, RepositoryError>;

    /// Mark every lead in `lead_ids` as assigned to `agent_id`
    async fn assign_leads(
        &self,
        lead_ids: &[EntityId],
        agent_id: &EntityId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Return leads to the unassigned pool. `leads` carry the state read
    /// before the assignment; each lead gets its prior status back.
    async fn release_leads(&self, leads: &[Lead]) -> Result<(), RepositoryError>;

    /// Append audit rows in one batch
    async fn insert_history(&self, entries: &[HistoryEntry]) -> Result<(), RepositoryError>;

    async fn find_user(&self, id: &EntityId) -> Result<Option<UserProfile>, RepositoryError>;

    /// Active agent whose name matches case-insensitively
    async fn find_agent_by_name(&self, name: &str) -> Result<Option<Agent>, RepositoryError>;

    /// Unassigned leads still in `new`, oldest first
    async fn list_new_unassigned(&self, limit: usize) -> Result<Vec<Lead>, RepositoryError>;

    async fn find_lead(&self, id: &EntityId) -> Result<Option<Lead>, RepositoryError>;

    async fn update_status(&self, id: &EntityId, status: LeadStatus) -> Result<(), RepositoryError>;

    /// Most recent history rows first
    async fn list_history(
        &self,
        action: Option<HistoryAction>,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, RepositoryError>;
}

/// Repository error type
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}
