//! In-memory store implementation for testing and local runs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use crate::domain::aggregates::{Agent, HistoryAction, HistoryEntry, Lead, UserProfile, UserRole};
use crate::domain::value_objects::{EntityId, LeadStatus};
use crate::ports::outbound::{LeadStore, RepositoryError};

/// Store operations that can be made to fail
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListActiveAgents,
    ListUnassignedLeads,
    CountActiveLeads,
    AssignLeads,
    ReleaseLeads,
    InsertHistory,
    FindUser,
    FindAgentByName,
    ListNewUnassigned,
    FindLead,
    UpdateStatus,
    ListHistory,
}

#[derive(Default)]
struct Faults {
    calls: HashMap<StoreOp, usize>,
    fail_on: HashMap<StoreOp, usize>,
}

#[derive(Default)]
struct Tables {
    users: Vec<UserProfile>,
    leads: Vec<Lead>,
    history: Vec<HistoryEntry>,
}

/// In-memory `leads` / `users` / `lead_history` tables
#[derive(Default)]
pub struct InMemoryLeadStore {
    tables: RwLock<Tables>,
    faults: Mutex<Faults>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the directory with one admin, for local runs without a backing store
    pub fn with_admin(id: impl Into<String>, name: impl Into<String>) -> Self {
        let store = Self::new();
        store.add_user(UserProfile {
            id: EntityId::from_string(id),
            name: name.into(),
            role: UserRole::Admin,
            zone: None,
            status: Default::default(),
        });
        store
    }

    pub fn add_user(&self, user: UserProfile) {
        self.tables.write().users.push(user);
    }

    pub fn add_lead(&self, lead: Lead) {
        self.tables.write().leads.push(lead);
    }

    /// All leads in insertion order
    pub fn leads(&self) -> Vec<Lead> {
        self.tables.read().leads.clone()
    }

    pub fn lead(&self, id: &EntityId) -> Option<Lead> {
        self.tables.read().leads.iter().find(|l| l.id() == id).cloned()
    }

    /// History rows in insertion order
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.tables.read().history.clone()
    }

    /// Make the `call`-th invocation (1-based) of `op` fail
    pub fn fail_on(&self, op: StoreOp, call: usize) {
        self.faults.lock().fail_on.insert(op, call);
    }

    fn check(&self, op: StoreOp) -> Result<(), RepositoryError> {
        let mut faults = self.faults.lock();
        let calls = faults.calls.entry(op).or_insert(0);
        *calls += 1;
        let current = *calls;
        if faults.fail_on.get(&op) == Some(&current) {
            return Err(RepositoryError::QueryError(format!("injected failure on {:?} call {}", op, current)));
        }
        Ok(())
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn list_active_agents(&self) -> Result<Vec<Agent>, RepositoryError> {
        self.check(StoreOp::ListActiveAgents)?;
        let tables = self.tables.read();
        Ok(tables
            .users
            .iter()
            .filter(|u| u.is_active_agent())
            .cloned()
            .map(Agent::from)
            .collect())
    }

    async fn list_unassigned_leads(&self) -> Result<Vec<Lead>, RepositoryError> {
        self.check(StoreOp::ListUnassignedLeads)?;
        let tables = self.tables.read();
        let mut leads: Vec<Lead> = tables.leads.iter().filter(|l| l.is_unassigned()).cloned().collect();
        leads.sort_by_key(|l| l.created_at());
        Ok(leads)
    }

    async fn count_active_leads(&self, agent_id: &EntityId) -> Result<u32, RepositoryError> {
        self.check(StoreOp::CountActiveLeads)?;
        let tables = self.tables.read();
        Ok(tables.leads.iter().filter(|l| l.counts_against(agent_id)).count() as u32)
    }

    async fn assign_leads(
        &self,
        lead_ids: &[EntityId],
        agent_id: &EntityId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.check(StoreOp::AssignLeads)?;
        let mut tables = self.tables.write();
        for lead in tables.leads.iter_mut().filter(|l| lead_ids.contains(l.id())) {
            lead.assign(agent_id.clone(), at);
        }
        Ok(())
    }

    async fn release_leads(&self, leads: &[Lead]) -> Result<(), RepositoryError> {
        self.check(StoreOp::ReleaseLeads)?;
        let mut tables = self.tables.write();
        for prior in leads {
            if let Some(lead) = tables.leads.iter_mut().find(|l| l.id() == prior.id()) {
                lead.release(prior.status());
            }
        }
        Ok(())
    }

    async fn insert_history(&self, entries: &[HistoryEntry]) -> Result<(), RepositoryError> {
        self.check(StoreOp::InsertHistory)?;
        self.tables.write().history.extend_from_slice(entries);
        Ok(())
    }

    async fn find_user(&self, id: &EntityId) -> Result<Option<UserProfile>, RepositoryError> {
        self.check(StoreOp::FindUser)?;
        Ok(self.tables.read().users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_agent_by_name(&self, name: &str) -> Result<Option<Agent>, RepositoryError> {
        self.check(StoreOp::FindAgentByName)?;
        let wanted = name.trim().to_lowercase();
        let tables = self.tables.read();
        Ok(tables
            .users
            .iter()
            .filter(|u| u.is_active_agent())
            .find(|u| u.name.to_lowercase() == wanted)
            .cloned()
            .map(Agent::from))
    }

    async fn list_new_unassigned(&self, limit: usize) -> Result<Vec<Lead>, RepositoryError> {
        self.check(StoreOp::ListNewUnassigned)?;
        let tables = self.tables.read();
        let mut leads: Vec<Lead> = tables
            .leads
            .iter()
            .filter(|l| l.is_unassigned() && l.status() == LeadStatus::New)
            .cloned()
            .collect();
        leads.sort_by_key(|l| l.created_at());
        leads.truncate(limit);
        Ok(leads)
    }

    async fn find_lead(&self, id: &EntityId) -> Result<Option<Lead>, RepositoryError> {
        self.check(StoreOp::FindLead)?;
        Ok(self.lead(id))
    }

    async fn update_status(&self, id: &EntityId, status: LeadStatus) -> Result<(), RepositoryError> {
        self.check(StoreOp::UpdateStatus)?;
        let mut tables = self.tables.write();
        let lead = tables
            .leads
            .iter_mut()
            .find(|l| l.id() == id)
            .ok_or(RepositoryError::NotFound)?;
        lead.change_status(status);
        Ok(())
    }

    async fn list_history(
        &self,
        action: Option<HistoryAction>,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, RepositoryError> {
        self.check(StoreOp::ListHistory)?;
        let tables = self.tables.read();
        Ok(tables
            .history
            .iter()
            .rev()
            .filter(|h| action.map_or(true, |a| h.action == a))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::UserStatus;
    use chrono::Duration;

    fn agent(id: &str, name: &str, status: UserStatus) -> UserProfile {
        UserProfile { id: EntityId::from_string(id), name: name.into(), role: UserRole::Agent, zone: None, status }
    }

    #[tokio::test]
    async fn test_unassigned_leads_oldest_first() {
        let store = InMemoryLeadStore::new();
        let now = Utc::now();
        store.add_lead(Lead::new(EntityId::from_string("late"), None, now));
        store.add_lead(Lead::new(EntityId::from_string("early"), None, now - Duration::hours(1)));
        store.add_lead(Lead::new(EntityId::from_string("taken"), None, now).with_assignment(EntityId::from_string("a"), now));

        let leads = store.list_unassigned_leads().await.unwrap();
        let ids: Vec<&str> = leads.iter().map(|l| l.id().as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_inactive_agents_are_hidden() {
        let store = InMemoryLeadStore::with_admin("admin", "Admin");
        store.add_user(agent("a1", "Ana", UserStatus::Active));
        store.add_user(agent("a2", "Bea", UserStatus::Inactive));

        let agents = store.list_active_agents().await.unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name(), "Ana");
        assert!(store.find_agent_by_name("BEA").await.unwrap().is_none());
        assert!(store.find_agent_by_name("ana").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fault_triggers_on_requested_call_only() {
        let store = InMemoryLeadStore::new();
        store.fail_on(StoreOp::FindLead, 2);
        let id = EntityId::from_string("x");

        assert!(store.find_lead(&id).await.is_ok());
        assert!(store.find_lead(&id).await.is_err());
        assert!(store.find_lead(&id).await.is_ok());
    }
}
