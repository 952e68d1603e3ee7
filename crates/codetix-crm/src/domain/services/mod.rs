//! Domain services module

pub mod allocation;

pub use allocation::{
    pull_leads, AgentBatch, AgentCapacity, AllocationPlan, LeadAllocator, DEFAULT_MAX_ACTIVE_LEADS,
};
