//! CodeTix CRM core
//!
//! Lead pool management and fair-share distribution of leads to sales
//! agents, following Domain-Driven Design (DDD) and hexagonal architecture.
//!
//! ## Architecture
//!
//! - **Domain Layer**: Lead, agent and history aggregates, status vocabulary, allocator
//! - **Application Layer**: Use case orchestration, DTOs, distribution settings
//! - **Ports Layer**: Hexagonal architecture interfaces
//! - **Infrastructure Layer**: In-memory and PostgREST stores
//!
//! ## Distribution
//!
//! Each active agent is topped up to a cap of active leads (15 by default).
//! A first pass prefers leads in the agent's zone; a second pass hands out
//! whatever is left, oldest first, to agents that still have room.

pub mod domain;
pub mod application;
pub mod ports;
pub mod infrastructure;

// Re-exports for convenience
pub use domain::aggregates::{Agent, HistoryAction, HistoryEntry, Lead, UserProfile, UserRole, UserStatus};
pub use domain::value_objects::{EntityId, LeadStatus, StatusError, Zone};
pub use domain::services::{LeadAllocator, DEFAULT_MAX_ACTIVE_LEADS};
pub use application::{
    AssignmentService, DistributionConfig, DistributionService, HistoryService, LeadStatusService, PersistenceMode,
};
pub use ports::inbound::{
    AssignmentUseCases, DistributionError, DistributionUseCases, HistoryQueries, LeadStatusUseCases, UseCaseError,
};
pub use ports::outbound::{LeadStore, RepositoryError};
pub use infrastructure::{InMemoryLeadStore, PostgrestConfig, PostgrestLeadStore};
