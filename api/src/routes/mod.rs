//! API Routes

pub mod assignment;
pub mod distribution;
pub mod health;
pub mod history;
pub mod status;
