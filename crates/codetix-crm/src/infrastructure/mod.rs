//! Infrastructure layer
//!
//! Concrete adapters for the outbound ports.

pub mod persistence;
pub mod postgrest;

pub use persistence::{InMemoryLeadStore, StoreOp};
pub use postgrest::{PostgrestConfig, PostgrestLeadStore};
