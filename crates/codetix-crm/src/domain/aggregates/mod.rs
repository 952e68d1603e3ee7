//! Aggregates module

pub mod agent;
pub mod history;
pub mod lead;

pub use agent::{Agent, UserProfile, UserRole, UserStatus};
pub use history::{HistoryAction, HistoryEntry};
pub use lead::Lead;
