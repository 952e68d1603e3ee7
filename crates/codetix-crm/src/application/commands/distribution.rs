//! Distribution run orchestration

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::application::config::{DistributionConfig, PersistenceMode};
use crate::application::dto::{AgentAssignmentDetail, DistributionReport};
use crate::domain::aggregates::{Agent, HistoryEntry};
use crate::domain::services::{AgentBatch, AgentCapacity, LeadAllocator};
use crate::domain::value_objects::EntityId;
use crate::ports::inbound::{DistributionError, DistributionUseCases};
use crate::ports::outbound::{LeadStore, RepositoryError};

use super::admin_profile;

/// Distribution application service
pub struct DistributionService {
    store: Arc<dyn LeadStore>,
    allocator: LeadAllocator,
    mode: PersistenceMode,
}

impl DistributionService {
    pub fn new(store: Arc<dyn LeadStore>, config: &DistributionConfig) -> Self {
        Self {
            store,
            allocator: LeadAllocator::new(config.max_active_leads),
            mode: config.persistence_mode,
        }
    }

    async fn active_counts(&self, agents: &[Agent]) -> Result<Vec<u32>, DistributionError> {
        let mut counts = Vec::with_capacity(agents.len());
        for agent in agents {
            let count = self
                .store
                .count_active_leads(agent.id())
                .await
                .map_err(|e| DistributionError::read(format!("Error al contar leads de {}", agent.id()), e))?;
            counts.push(count);
        }
        Ok(counts)
    }

    /// Write one agent's batch. A failed history insert releases the batch.
    async fn persist_batch(&self, actor: &EntityId, batch: &AgentBatch) -> Result<(), RepositoryError> {
        let ids: Vec<EntityId> = batch.leads.iter().map(|l| l.id().clone()).collect();

        self.store.assign_leads(&ids, batch.agent.id(), Utc::now()).await?;

        let description = format!("Lead asignado a {}", batch.agent.name());
        let rows: Vec<HistoryEntry> = ids
            .iter()
            .map(|id| HistoryEntry::assign(id.clone(), actor.clone(), description.clone()))
            .collect();

        if let Err(e) = self.store.insert_history(&rows).await {
            if let Err(release_err) = self.store.release_leads(&batch.leads).await {
                error!(agent = %batch.agent.id(), error = %release_err, "Failed to release batch after history error");
            }
            return Err(e);
        }

        Ok(())
    }

    /// Undo batches that were fully written earlier in the run
    async fn roll_back(&self, actor: &EntityId, committed: &[&AgentBatch]) {
        for batch in committed {
            if let Err(e) = self.store.release_leads(&batch.leads).await {
                error!(agent = %batch.agent.id(), error = %e, "Failed to release committed batch");
                continue;
            }

            let description = format!("Reparto revertido para {}", batch.agent.name());
            let rows: Vec<HistoryEntry> = batch
                .leads
                .iter()
                .map(|l| HistoryEntry::unassign(l.id().clone(), actor.clone(), description.clone()))
                .collect();
            if let Err(e) = self.store.insert_history(&rows).await {
                warn!(agent = %batch.agent.id(), error = %e, "Released batch without unassign history");
            }
        }
    }
}

#[async_trait]
impl DistributionUseCases for DistributionService {
    #[tracing::instrument(skip_all, fields(actor = %actor))]
    async fn distribute(&self, actor: &EntityId) -> Result<DistributionReport, DistributionError> {
        admin_profile(self.store.as_ref(), actor)
            .await
            .map_err(|e| DistributionError::read("Error al obtener el perfil", e))?
            .ok_or(DistributionError::Unauthorized)?;

        let agents = self
            .store
            .list_active_agents()
            .await
            .map_err(|e| DistributionError::read("Error al obtener comerciales", e))?;
        if agents.is_empty() {
            return Err(DistributionError::NoAgentsAvailable);
        }

        let pending: VecDeque<_> = self
            .store
            .list_unassigned_leads()
            .await
            .map_err(|e| DistributionError::read("Error al obtener leads pendientes", e))?
            .into();
        if pending.is_empty() {
            info!("No pending leads to distribute");
            return Ok(DistributionReport::default());
        }

        let counts = self.active_counts(&agents).await?;
        let capacities = agents
            .iter()
            .cloned()
            .zip(counts)
            .map(|(agent, active)| AgentCapacity::new(agent, active))
            .collect();

        let mut plan = self.allocator.zone_pass(capacities, pending);
        if !plan.unallocated.is_empty() {
            let refreshed = self.active_counts(&agents).await?;
            plan = self.allocator.backfill_pass(plan, &refreshed);
        }

        for batch in plan.non_empty() {
            debug!(
                agent = %batch.agent.id(),
                active_before = batch.active_before,
                planned = batch.leads.len(),
                zone_matches = batch.zone_matches,
                "Planned batch"
            );
        }

        let mut committed: Vec<&AgentBatch> = Vec::new();
        for batch in plan.non_empty() {
            if let Err(source) = self.persist_batch(actor, batch).await {
                error!(agent = %batch.agent.id(), error = %source, "Distribution aborted");
                if self.mode == PersistenceMode::AllOrNothing {
                    self.roll_back(actor, &committed).await;
                }
                return Err(DistributionError::DistributionFailed {
                    agent: batch.agent.name().to_string(),
                    source,
                });
            }
            committed.push(batch);
        }

        let details: Vec<AgentAssignmentDetail> = committed
            .iter()
            .map(|b| AgentAssignmentDetail {
                agent: b.agent.name().to_string(),
                assigned_count: b.leads.len(),
            })
            .collect();
        let total_distributed = details.iter().map(|d| d.assigned_count).sum();

        info!(
            total_distributed,
            agents = details.len(),
            left_pending = plan.unallocated.len(),
            "Distribution completed"
        );

        Ok(DistributionReport { total_distributed, details })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{HistoryAction, Lead, UserProfile, UserRole, UserStatus};
    use crate::domain::value_objects::LeadStatus;
    use crate::infrastructure::persistence::{InMemoryLeadStore, StoreOp};
    use chrono::{Duration, TimeZone};

    fn user(id: &str, name: &str, role: UserRole, zone: &str) -> UserProfile {
        UserProfile {
            id: EntityId::from_string(id),
            name: name.into(),
            role,
            zone: if zone.is_empty() { None } else { Some(zone.into()) },
            status: UserStatus::Active,
        }
    }

    fn seed_leads(store: &InMemoryLeadStore, zones: &[&str]) {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        for (i, z) in zones.iter().enumerate() {
            let zone = if z.is_empty() { None } else { Some(z.to_string()) };
            store.add_lead(Lead::new(
                EntityId::from_string(format!("lead-{:02}", i)),
                zone,
                base + Duration::minutes(i as i64),
            ));
        }
    }

    fn admin() -> EntityId {
        EntityId::from_string("admin")
    }

    fn service(store: &Arc<InMemoryLeadStore>, mode: PersistenceMode) -> DistributionService {
        let config = DistributionConfig { persistence_mode: mode, ..Default::default() };
        DistributionService::new(store.clone(), &config)
    }

    fn store_with_agents(agents: &[(&str, &str, &str)]) -> Arc<InMemoryLeadStore> {
        let store = InMemoryLeadStore::new();
        store.add_user(user("admin", "Admin", UserRole::Admin, ""));
        for (id, name, zone) in agents {
            store.add_user(user(id, name, UserRole::Agent, zone));
        }
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_three_agents_twenty_leads() {
        let store = store_with_agents(&[("a1", "Ana", "Madrid"), ("a2", "Bea", "Barcelona"), ("a3", "Carlos", "")]);
        let mut zones = vec!["Madrid"; 10];
        zones.extend(vec![""; 5]);
        zones.extend(vec!["Barcelona"; 5]);
        seed_leads(&store, &zones);

        let report = service(&store, PersistenceMode::BestEffort).distribute(&admin()).await.unwrap();

        assert_eq!(report.total_distributed, 20);
        assert_eq!(
            report.details,
            vec![
                AgentAssignmentDetail { agent: "Ana".into(), assigned_count: 15 },
                AgentAssignmentDetail { agent: "Bea".into(), assigned_count: 5 },
            ]
        );
        assert!(store.leads().iter().all(|l| !l.is_unassigned() && l.status() == LeadStatus::Assigned));

        let history = store.history();
        assert_eq!(history.len(), 20);
        assert!(history.iter().all(|h| h.action == HistoryAction::Assign && h.user_id == Some(admin())));
        assert!(history.iter().any(|h| h.description.as_deref() == Some("Lead asignado a Bea")));
    }

    #[tokio::test]
    async fn test_second_run_distributes_nothing() {
        let store = store_with_agents(&[("a1", "Ana", "Madrid")]);
        seed_leads(&store, &["Madrid", "Vigo"]);
        let service = service(&store, PersistenceMode::BestEffort);

        assert_eq!(service.distribute(&admin()).await.unwrap().total_distributed, 2);
        let again = service.distribute(&admin()).await.unwrap();
        assert_eq!(again, DistributionReport::default());
    }

    #[tokio::test]
    async fn test_agent_at_capacity_gets_nothing() {
        let store = store_with_agents(&[("a1", "Ana", "Madrid")]);
        let now = Utc::now();
        for i in 0..15 {
            store.add_lead(
                Lead::new(EntityId::from_string(format!("busy-{}", i)), None, now)
                    .with_status(LeadStatus::Contacted)
                    .with_assignment(EntityId::from_string("a1"), now),
            );
        }
        seed_leads(&store, &["Madrid", "Madrid"]);

        let report = service(&store, PersistenceMode::BestEffort).distribute(&admin()).await.unwrap();

        assert_eq!(report.total_distributed, 0);
        assert!(report.details.is_empty());
        assert_eq!(store.leads().iter().filter(|l| l.is_unassigned()).count(), 2);
    }

    #[tokio::test]
    async fn test_closed_leads_free_capacity() {
        let store = store_with_agents(&[("a1", "Ana", "")]);
        let now = Utc::now();
        for i in 0..15 {
            let status = if i < 3 { LeadStatus::Won } else { LeadStatus::Interested };
            store.add_lead(
                Lead::new(EntityId::from_string(format!("old-{}", i)), None, now)
                    .with_status(status)
                    .with_assignment(EntityId::from_string("a1"), now),
            );
        }
        seed_leads(&store, &["", "", "", "", ""]);

        let report = service(&store, PersistenceMode::BestEffort).distribute(&admin()).await.unwrap();
        assert_eq!(report.total_distributed, 3);
    }

    #[tokio::test]
    async fn test_no_agents_fails_without_mutation() {
        let store = store_with_agents(&[]);
        seed_leads(&store, &["Madrid"]);

        let err = service(&store, PersistenceMode::BestEffort).distribute(&admin()).await.unwrap_err();

        assert!(matches!(err, DistributionError::NoAgentsAvailable));
        assert_eq!(err.to_string(), "No hay comerciales activos para repartir los leads.");
        assert!(store.leads()[0].is_unassigned());
        assert!(store.history().is_empty());
    }

    #[tokio::test]
    async fn test_non_admin_is_rejected() {
        let store = store_with_agents(&[("a1", "Ana", "")]);
        seed_leads(&store, &[""]);

        let err = service(&store, PersistenceMode::BestEffort)
            .distribute(&EntityId::from_string("a1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DistributionError::Unauthorized));

        let err = service(&store, PersistenceMode::BestEffort)
            .distribute(&EntityId::from_string("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, DistributionError::Unauthorized));
    }

    #[tokio::test]
    async fn test_read_failure_aborts_before_mutation() {
        let store = store_with_agents(&[("a1", "Ana", "")]);
        seed_leads(&store, &[""]);
        store.fail_on(StoreOp::CountActiveLeads, 1);

        let err = service(&store, PersistenceMode::BestEffort).distribute(&admin()).await.unwrap_err();

        assert!(matches!(err, DistributionError::StoreReadFailed { .. }));
        assert!(err.to_string().starts_with("Error al contar leads de a1"));
        assert!(store.leads()[0].is_unassigned());
    }

    #[tokio::test]
    async fn test_history_failure_keeps_earlier_batches() {
        let store = store_with_agents(&[("a1", "Ana", "Madrid"), ("a2", "Bea", "Vigo")]);
        let mut zones = vec!["Madrid"; 15];
        zones.extend(vec!["Vigo"; 3]);
        seed_leads(&store, &zones);
        store.fail_on(StoreOp::InsertHistory, 2);

        let err = service(&store, PersistenceMode::BestEffort).distribute(&admin()).await.unwrap_err();

        match err {
            DistributionError::DistributionFailed { agent, .. } => assert_eq!(agent, "Bea"),
            other => panic!("unexpected error: {other:?}"),
        }
        let leads = store.leads();
        let first = EntityId::from_string("a1");
        assert_eq!(leads.iter().filter(|l| l.assigned_to() == Some(&first)).count(), 15);
        assert!(leads.iter().filter(|l| l.zone() == Some("Vigo")).all(|l| l.is_unassigned()));
        assert!(leads
            .iter()
            .filter(|l| l.is_unassigned())
            .all(|l| l.status() == LeadStatus::New && l.assigned_at().is_none()));
        assert_eq!(store.history().len(), 15);
    }

    #[tokio::test]
    async fn test_all_or_nothing_releases_every_batch() {
        let store = store_with_agents(&[("a1", "Ana", "Madrid"), ("a2", "Bea", "Vigo")]);
        let mut zones = vec!["Madrid"; 15];
        zones.extend(vec!["Vigo"; 3]);
        seed_leads(&store, &zones);
        store.fail_on(StoreOp::InsertHistory, 2);

        let err = service(&store, PersistenceMode::AllOrNothing).distribute(&admin()).await.unwrap_err();
        assert!(matches!(err, DistributionError::DistributionFailed { .. }));

        assert!(store.leads().iter().all(|l| l.is_unassigned()));
        let history = store.history();
        let assigns = history.iter().filter(|h| h.action == HistoryAction::Assign).count();
        let unassigns = history.iter().filter(|h| h.action == HistoryAction::Unassign).count();
        assert_eq!(assigns, 15);
        assert_eq!(unassigns, 15);
    }

    #[tokio::test]
    async fn test_released_leads_keep_their_pool_status() {
        let store = store_with_agents(&[("a1", "Ana", ""), ("a2", "Bea", "Vigo")]);
        let now = Utc::now();
        store.add_lead(Lead::new(EntityId::from_string("warm"), None, now).with_status(LeadStatus::Interested));
        store.add_lead(
            Lead::new(EntityId::from_string("vigo"), Some("Vigo".into()), now + Duration::minutes(1))
                .with_status(LeadStatus::Contacted),
        );
        store.fail_on(StoreOp::InsertHistory, 2);

        let err = service(&store, PersistenceMode::AllOrNothing).distribute(&admin()).await.unwrap_err();
        assert!(matches!(err, DistributionError::DistributionFailed { .. }));

        let warm = store.lead(&EntityId::from_string("warm")).unwrap();
        assert!(warm.is_unassigned());
        assert_eq!(warm.status(), LeadStatus::Interested);
        let vigo = store.lead(&EntityId::from_string("vigo")).unwrap();
        assert!(vigo.is_unassigned());
        assert_eq!(vigo.status(), LeadStatus::Contacted);
    }

    #[tokio::test]
    async fn test_failed_lead_update_reports_agent() {
        let store = store_with_agents(&[("a1", "Ana", "")]);
        seed_leads(&store, &["", ""]);
        store.fail_on(StoreOp::AssignLeads, 1);

        let err = service(&store, PersistenceMode::BestEffort).distribute(&admin()).await.unwrap_err();

        assert!(err.to_string().contains("(Ana)"));
        assert!(store.leads().iter().all(|l| l.is_unassigned()));
        assert!(store.history().is_empty());
    }
}
