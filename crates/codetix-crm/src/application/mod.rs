//! Application layer
//!
//! Orchestrates use cases and coordinates domain objects.

pub mod commands;
pub mod config;
pub mod dto;
pub mod queries;

pub use commands::{AssignmentService, DistributionService, LeadStatusService};
pub use config::{DistributionConfig, PersistenceMode};
pub use dto::*;
pub use queries::HistoryService;
