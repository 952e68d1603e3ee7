//! Manual lead assignment

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::application::dto::*;
use crate::domain::aggregates::HistoryEntry;
use crate::domain::value_objects::EntityId;
use crate::ports::inbound::{AssignmentUseCases, UseCaseError};
use crate::ports::outbound::LeadStore;

/// Batch size when the caller names an agent without a limit
pub const DEFAULT_ASSIGN_LIMIT: usize = 15;

/// Assignment application service
pub struct AssignmentService {
    store: Arc<dyn LeadStore>,
}

impl AssignmentService {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self { store }
    }

    async fn record(&self, rows: &[HistoryEntry]) {
        if let Err(e) = self.store.insert_history(rows).await {
            warn!(rows = rows.len(), error = %e, "Assignment history not recorded");
        }
    }
}

#[async_trait]
impl AssignmentUseCases for AssignmentService {
    async fn assign_lead(&self, command: ManualAssignmentCommand) -> Result<(), UseCaseError> {
        let lead_id = command.lead_id.trim();
        let agent_id = command.assigned_to.trim();
        if lead_id.is_empty() || agent_id.is_empty() {
            return Err(UseCaseError::ValidationError("Debes indicar lead_id y assigned_to.".into()));
        }

        let lead_id = EntityId::from_string(lead_id);
        let agent_id = EntityId::from_string(agent_id);

        self.store
            .assign_leads(std::slice::from_ref(&lead_id), &agent_id, Utc::now())
            .await
            .map_err(UseCaseError::LeadUpdateFailed)?;

        self.record(&[HistoryEntry::assign(lead_id.clone(), agent_id.clone(), "Asignación manual desde panel")])
            .await;

        info!(lead = %lead_id, agent = %agent_id, "Lead assigned manually");
        Ok(())
    }

    async fn assign_many(&self, commands: Vec<ManualAssignmentCommand>) -> Vec<AssignmentOutcome> {
        let mut outcomes = Vec::with_capacity(commands.len());
        for command in commands {
            let lead_id = command.lead_id.clone();
            let assigned_to = command.assigned_to.clone();
            let outcome = match self.assign_lead(command).await {
                Ok(()) => AssignmentOutcome { lead_id, assigned_to, success: true, message: None },
                Err(e) => AssignmentOutcome { lead_id, assigned_to, success: false, message: Some(e.to_string()) },
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn assign_oldest_to_agent(&self, command: AssignToAgentCommand) -> Result<AgentAssignmentResult, UseCaseError> {
        let name = command.agent.trim();
        if name.is_empty() {
            return Err(UseCaseError::ValidationError("Debes indicar el comercial (agent).".into()));
        }
        let limit = match command.limit {
            Some(n) if n > 0 => n as usize,
            _ => DEFAULT_ASSIGN_LIMIT,
        };

        let agent = self
            .store
            .find_agent_by_name(name)
            .await?
            .ok_or(UseCaseError::AgentNotFound)?;

        let leads = self.store.list_new_unassigned(limit).await?;
        if leads.is_empty() {
            return Ok(AgentAssignmentResult { agent: agent.name().to_string(), assigned: 0 });
        }

        let ids: Vec<EntityId> = leads.iter().map(|l| l.id().clone()).collect();
        self.store
            .assign_leads(&ids, agent.id(), Utc::now())
            .await
            .map_err(UseCaseError::LeadUpdateFailed)?;

        let description = format!("Asignado automáticamente a {}", agent.name());
        let rows: Vec<HistoryEntry> = ids
            .iter()
            .map(|id| HistoryEntry::assign(id.clone(), agent.id().clone(), description.clone()))
            .collect();
        self.record(&rows).await;

        info!(agent = %agent.id(), assigned = ids.len(), "Oldest leads assigned to agent");
        Ok(AgentAssignmentResult { agent: agent.name().to_string(), assigned: ids.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Lead, UserProfile, UserRole, UserStatus};
    use crate::domain::value_objects::LeadStatus;
    use crate::infrastructure::persistence::{InMemoryLeadStore, StoreOp};
    use chrono::{Duration, TimeZone};

    fn setup() -> (Arc<InMemoryLeadStore>, AssignmentService) {
        let store = Arc::new(InMemoryLeadStore::new());
        store.add_user(UserProfile {
            id: EntityId::from_string("a1"),
            name: "Ana Pérez".into(),
            role: UserRole::Agent,
            zone: None,
            status: UserStatus::Active,
        });
        let base = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        for i in 0..20 {
            store.add_lead(Lead::new(EntityId::from_string(format!("l{:02}", i)), None, base + Duration::hours(i)));
        }
        let service = AssignmentService::new(store.clone());
        (store, service)
    }

    fn manual(lead: &str, agent: &str) -> ManualAssignmentCommand {
        ManualAssignmentCommand { lead_id: lead.into(), assigned_to: agent.into() }
    }

    #[tokio::test]
    async fn test_manual_assignment_writes_history() {
        let (store, service) = setup();
        service.assign_lead(manual("l03", "a1")).await.unwrap();

        let lead = store.lead(&EntityId::from_string("l03")).unwrap();
        assert_eq!(lead.assigned_to(), Some(&EntityId::from_string("a1")));
        assert_eq!(lead.status(), LeadStatus::Assigned);
        assert!(lead.assigned_at().is_some());

        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_id, Some(EntityId::from_string("a1")));
        assert_eq!(history[0].description.as_deref(), Some("Asignación manual desde panel"));
    }

    #[tokio::test]
    async fn test_manual_assignment_survives_history_failure() {
        let (store, service) = setup();
        store.fail_on(StoreOp::InsertHistory, 1);

        service.assign_lead(manual("l00", "a1")).await.unwrap();

        assert!(!store.lead(&EntityId::from_string("l00")).unwrap().is_unassigned());
        assert!(store.history().is_empty());
    }

    #[tokio::test]
    async fn test_manual_assignment_update_failure() {
        let (store, service) = setup();
        store.fail_on(StoreOp::AssignLeads, 1);

        let err = service.assign_lead(manual("l00", "a1")).await.unwrap_err();
        assert!(matches!(err, UseCaseError::LeadUpdateFailed(_)));
    }

    #[tokio::test]
    async fn test_bulk_assignment_reports_each_pair() {
        let (store, service) = setup();
        store.fail_on(StoreOp::AssignLeads, 2);

        let outcomes = service
            .assign_many(vec![manual("l00", "a1"), manual("l01", "a1"), manual("", "a1"), manual("l02", "a1")])
            .await;

        let flags: Vec<bool> = outcomes.iter().map(|o| o.success).collect();
        assert_eq!(flags, vec![true, false, false, true]);
        assert!(outcomes[2].message.as_deref().unwrap().contains("lead_id"));
        assert!(store.lead(&EntityId::from_string("l01")).unwrap().is_unassigned());
    }

    #[tokio::test]
    async fn test_assign_oldest_by_agent_name() {
        let (store, service) = setup();
        let result = service
            .assign_oldest_to_agent(AssignToAgentCommand { agent: "ana pérez".into(), limit: Some(4) })
            .await
            .unwrap();

        assert_eq!(result, AgentAssignmentResult { agent: "Ana Pérez".into(), assigned: 4 });
        let assigned: Vec<String> = store
            .leads()
            .iter()
            .filter(|l| !l.is_unassigned())
            .map(|l| l.id().to_string())
            .collect();
        assert_eq!(assigned, vec!["l00", "l01", "l02", "l03"]);
        assert!(store
            .history()
            .iter()
            .all(|h| h.description.as_deref() == Some("Asignado automáticamente a Ana Pérez")));
    }

    #[tokio::test]
    async fn test_assign_oldest_defaults_limit() {
        let (_store, service) = setup();
        let result = service
            .assign_oldest_to_agent(AssignToAgentCommand { agent: "Ana Pérez".into(), limit: Some(-3) })
            .await
            .unwrap();
        assert_eq!(result.assigned, DEFAULT_ASSIGN_LIMIT);

        let rest = service
            .assign_oldest_to_agent(AssignToAgentCommand { agent: "Ana Pérez".into(), limit: None })
            .await
            .unwrap();
        assert_eq!(rest.assigned, 5);

        let none_left = service
            .assign_oldest_to_agent(AssignToAgentCommand { agent: "Ana Pérez".into(), limit: None })
            .await
            .unwrap();
        assert_eq!(none_left.assigned, 0);
    }

    #[tokio::test]
    async fn test_assign_oldest_unknown_agent() {
        let (_store, service) = setup();
        let err = service
            .assign_oldest_to_agent(AssignToAgentCommand { agent: "Nadie".into(), limit: None })
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::AgentNotFound));
        assert_eq!(err.to_string(), "Comercial no encontrado o inactivo.");
    }
}
