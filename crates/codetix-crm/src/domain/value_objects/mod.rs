//! Value Objects module
//!
//! Immutable, validated domain primitives.

pub mod status;
pub mod zone;

pub use status::{LeadStatus, StatusError};
pub use zone::Zone;

/// Identifier value object for entities
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_serializes_as_plain_string() {
        let id = EntityId::from_string("lead-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"lead-1\"");

        let parsed: EntityId = serde_json::from_str("\"agent-7\"").unwrap();
        assert_eq!(parsed.as_str(), "agent-7");
    }

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(EntityId::new(), EntityId::new());
    }
}
