//! Lead status transitions

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::application::dto::ChangeStatusCommand;
use crate::domain::aggregates::{HistoryEntry, Lead};
use crate::domain::value_objects::{EntityId, LeadStatus};
use crate::ports::inbound::{LeadStatusUseCases, UseCaseError};
use crate::ports::outbound::LeadStore;

pub struct LeadStatusService {
    store: Arc<dyn LeadStore>,
}

impl LeadStatusService {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LeadStatusUseCases for LeadStatusService {
    async fn change_status(&self, command: ChangeStatusCommand) -> Result<Lead, UseCaseError> {
        if command.lead_id.trim().is_empty() || command.status.trim().is_empty() {
            return Err(UseCaseError::ValidationError(
                "Los campos lead_id y status son obligatorios.".into(),
            ));
        }

        let status: LeadStatus = command.status.parse().map_err(|_| {
            UseCaseError::ValidationError(format!(
                "Estado inválido. Valores permitidos: {}",
                LeadStatus::allowed_values()
            ))
        })?;

        let lead_id = EntityId::from_string(command.lead_id.trim());
        let mut lead = self
            .store
            .find_lead(&lead_id)
            .await?
            .ok_or(UseCaseError::LeadNotFound)?;

        self.store
            .update_status(&lead_id, status)
            .await
            .map_err(UseCaseError::LeadUpdateFailed)?;
        let previous = lead.change_status(status);

        let changed_by = command
            .changed_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(EntityId::from_string);
        self.store
            .insert_history(&[HistoryEntry::status_change(lead_id.clone(), changed_by, previous, status)])
            .await
            .map_err(UseCaseError::HistoryNotRecorded)?;

        info!(lead = %lead_id, from = %previous, to = %status, "Lead status changed");
        Ok(lead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::HistoryAction;
    use crate::infrastructure::persistence::{InMemoryLeadStore, StoreOp};
    use chrono::Utc;

    fn setup() -> (Arc<InMemoryLeadStore>, LeadStatusService) {
        let store = Arc::new(InMemoryLeadStore::new());
        store.add_lead(
            Lead::new(EntityId::from_string("l1"), Some("Madrid".into()), Utc::now())
                .with_status(LeadStatus::Assigned)
                .with_assignment(EntityId::from_string("a1"), Utc::now()),
        );
        let service = LeadStatusService::new(store.clone());
        (store, service)
    }

    fn command(lead: &str, status: &str) -> ChangeStatusCommand {
        ChangeStatusCommand { lead_id: lead.into(), status: status.into(), changed_by: Some("a1".into()) }
    }

    #[tokio::test]
    async fn test_change_status_records_transition() {
        let (store, service) = setup();

        let lead = service.change_status(command("l1", "contactado")).await.unwrap();
        assert_eq!(lead.status(), LeadStatus::Contacted);
        assert_eq!(store.lead(&EntityId::from_string("l1")).unwrap().status(), LeadStatus::Contacted);

        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, HistoryAction::StatusChange);
        assert_eq!(history[0].old_status, Some(LeadStatus::Assigned));
        assert_eq!(history[0].new_status, Some(LeadStatus::Contacted));
        assert_eq!(history[0].user_id, Some(EntityId::from_string("a1")));
    }

    #[tokio::test]
    async fn test_invalid_status_lists_allowed_values() {
        let (store, service) = setup();
        let err = service.change_status(command("l1", "archivado")).await.unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Estado inválido. Valores permitidos: "));
        assert!(message.contains("in_progress"));
        assert_eq!(store.lead(&EntityId::from_string("l1")).unwrap().status(), LeadStatus::Assigned);
    }

    #[tokio::test]
    async fn test_missing_fields_and_unknown_lead() {
        let (_store, service) = setup();
        assert!(matches!(
            service.change_status(command("", "won")).await,
            Err(UseCaseError::ValidationError(_))
        ));
        assert!(matches!(
            service.change_status(command("nope", "won")).await,
            Err(UseCaseError::LeadNotFound)
        ));
    }

    #[tokio::test]
    async fn test_history_failure_is_reported_after_update() {
        let (store, service) = setup();
        store.fail_on(StoreOp::InsertHistory, 1);

        let err = service.change_status(command("l1", "won")).await.unwrap_err();

        assert!(err
            .to_string()
            .starts_with("Estado actualizado, pero no se pudo registrar el historial: "));
        assert_eq!(store.lead(&EntityId::from_string("l1")).unwrap().status(), LeadStatus::Won);
    }
}
