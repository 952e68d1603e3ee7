//! Users and agents
//!
//! Agents are the `users` rows with the agent role. Administrators live in
//! the same table and trigger distributions.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EntityId, Zone};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Agent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl Default for UserStatus {
    fn default() -> Self { Self::Active }
}

/// Stored user profile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: EntityId,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_active_agent(&self) -> bool {
        self.role == UserRole::Agent && self.status == UserStatus::Active
    }
}

/// Sales agent eligible for lead distribution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    id: EntityId,
    name: String,
    zone: Option<Zone>,
}

impl Agent {
    pub fn new(id: EntityId, name: impl Into<String>, zone: Option<&str>) -> Self {
        Self {
            id,
            name: name.into(),
            zone: Zone::parse(zone),
        }
    }

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn zone(&self) -> Option<&Zone> { self.zone.as_ref() }
}

impl From<UserProfile> for Agent {
    fn from(profile: UserProfile) -> Self {
        Agent::new(profile.id, profile.name, profile.zone.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_store_row() {
        let json = r#"{"id":"u1","name":"Ana","role":"agent","zone":"Madrid","status":"active"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert!(profile.is_active_agent());
        assert!(!profile.is_admin());
    }

    #[test]
    fn test_agent_from_profile_normalizes_zone() {
        let profile = UserProfile {
            id: EntityId::from_string("u2"),
            name: "Luis".into(),
            role: UserRole::Agent,
            zone: Some("  ".into()),
            status: UserStatus::Active,
        };
        let agent = Agent::from(profile);
        assert_eq!(agent.name(), "Luis");
        assert!(agent.zone().is_none());
    }
}
