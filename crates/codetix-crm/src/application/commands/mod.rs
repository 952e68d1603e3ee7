//! Command handlers
//!
//! Application services that orchestrate use cases.

pub mod assignment;
pub mod distribution;
pub mod status;

pub use assignment::{AssignmentService, DEFAULT_ASSIGN_LIMIT};
pub use distribution::DistributionService;
pub use status::LeadStatusService;

use crate::domain::aggregates::UserProfile;
use crate::domain::value_objects::EntityId;
use crate::ports::outbound::{LeadStore, RepositoryError};

/// Profile of `actor` when it carries the admin role
pub(crate) async fn admin_profile(
    store: &dyn LeadStore,
    actor: &EntityId,
) -> Result<Option<UserProfile>, RepositoryError> {
    Ok(store.find_user(actor).await?.filter(UserProfile::is_admin))
}
