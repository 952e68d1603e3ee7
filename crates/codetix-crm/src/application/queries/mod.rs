//! Query handlers

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::commands::admin_profile;
use crate::application::dto::HistoryQuery;
use crate::domain::aggregates::HistoryEntry;
use crate::domain::value_objects::EntityId;
use crate::ports::inbound::{HistoryQueries, UseCaseError};
use crate::ports::outbound::LeadStore;

/// Read side of the audit trail
pub struct HistoryService {
    store: Arc<dyn LeadStore>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HistoryQueries for HistoryService {
    async fn recent_history(&self, actor: &EntityId, query: HistoryQuery) -> Result<Vec<HistoryEntry>, UseCaseError> {
        admin_profile(self.store.as_ref(), actor).await?.ok_or_else(|| {
            UseCaseError::Unauthorized("Solo los administradores pueden consultar el historial.".into())
        })?;

        Ok(self.store.list_history(query.action, query.effective_limit()).await?)
    }
}
