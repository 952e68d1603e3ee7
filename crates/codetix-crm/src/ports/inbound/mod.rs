//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: application service interfaces.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::dto::*;
use crate::domain::aggregates::{HistoryEntry, Lead};
use crate::domain::value_objects::EntityId;
use crate::ports::outbound::RepositoryError;

/// Fair-share distribution of the unassigned pool
#[async_trait]
pub trait DistributionUseCases: Send + Sync {
    /// Run one distribution on behalf of `actor`, who must be an admin
    async fn distribute(&self, actor: &EntityId) -> Result<DistributionReport, DistributionError>;
}

/// Manual assignment, bypassing capacity and zone rules
#[async_trait]
pub trait AssignmentUseCases: Send + Sync {
    /// Assign one lead to one agent
    async fn assign_lead(&self, command: ManualAssignmentCommand) -> Result<(), UseCaseError>;

    /// Process each pair independently, in order
    async fn assign_many(&self, commands: Vec<ManualAssignmentCommand>) -> Vec<AssignmentOutcome>;

    /// Hand the oldest `new` leads to an agent looked up by name
    async fn assign_oldest_to_agent(&self, command: AssignToAgentCommand) -> Result<AgentAssignmentResult, UseCaseError>;
}

/// Lead pipeline transitions
#[async_trait]
pub trait LeadStatusUseCases: Send + Sync {
    /// Move a lead to a new status and record the transition
    async fn change_status(&self, command: ChangeStatusCommand) -> Result<Lead, UseCaseError>;
}

/// Audit trail reads
#[async_trait]
pub trait HistoryQueries: Send + Sync {
    /// Most recent entries first; `actor` must be an admin
    async fn recent_history(&self, actor: &EntityId, query: HistoryQuery) -> Result<Vec<HistoryEntry>, UseCaseError>;
}

/// Distribution run failures
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("Solo los administradores pueden repartir leads.")]
    Unauthorized,

    #[error("No hay comerciales activos para repartir los leads.")]
    NoAgentsAvailable,

    #[error("{context}: {source}")]
    StoreReadFailed {
        context: String,
        #[source]
        source: RepositoryError,
    },

    #[error("No se pudo completar el reparto inteligente ({agent}): {source}")]
    DistributionFailed {
        agent: String,
        #[source]
        source: RepositoryError,
    },
}

impl DistributionError {
    pub(crate) fn read(context: impl Into<String>, source: RepositoryError) -> Self {
        Self::StoreReadFailed { context: context.into(), source }
    }
}

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("Lead no encontrado.")]
    LeadNotFound,

    #[error("Comercial no encontrado o inactivo.")]
    AgentNotFound,

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    LeadUpdateFailed(#[source] RepositoryError),

    #[error("Estado actualizado, pero no se pudo registrar el historial: {0}")]
    HistoryNotRecorded(#[source] RepositoryError),

    #[error("{0}")]
    RepositoryError(#[from] RepositoryError),
}
