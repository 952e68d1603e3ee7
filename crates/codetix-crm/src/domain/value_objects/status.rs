//! Lead Status Value Object
//!
//! Canonical lead lifecycle vocabulary. Earlier revisions of the CRM stored
//! Spanish free-text statuses; those spellings are accepted as aliases and
//! always written back in canonical form.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lead lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Interested,
    Quoted,
    InProgress,
    Assigned,
    Won,
    Lost,
}

impl LeadStatus {
    /// Every canonical status, in lifecycle order
    pub const ALL: [LeadStatus; 8] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Interested,
        LeadStatus::Quoted,
        LeadStatus::InProgress,
        LeadStatus::Assigned,
        LeadStatus::Won,
        LeadStatus::Lost,
    ];

    /// Statuses that count against an agent's capacity
    pub const ACTIVE: [LeadStatus; 6] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Interested,
        LeadStatus::Quoted,
        LeadStatus::InProgress,
        LeadStatus::Assigned,
    ];

    pub fn as_str(&self) -> &'static str {
        self.spellings()[0]
    }

    /// Canonical name followed by every accepted stored spelling, lower-cased
    pub fn spellings(&self) -> &'static [&'static str] {
        match self {
            Self::New => &["new", "nuevo", "nueva"],
            Self::Contacted => &["contacted", "contactado", "contactada"],
            Self::Interested => &["interested", "interesado", "interesada"],
            Self::Quoted => &["quoted", "presupuesto"],
            Self::InProgress => &["in_progress", "en_progreso", "progreso"],
            Self::Assigned => &["assigned", "asignado", "asignada"],
            Self::Won => &["won", "ganado", "ganada", "closed", "cerrado", "cerrada"],
            Self::Lost => &["lost", "perdido", "perdida", "rechazado", "rechazada"],
        }
    }

    /// Parse a stored column value. Missing or unrecognised values fall back
    /// to `new`, the status ingestion writes by default.
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    /// Comma-separated canonical names, for validation messages
    pub fn allowed_values() -> String {
        Self::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl Default for LeadStatus {
    fn default() -> Self { Self::New }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = StatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(StatusError::Empty);
        }
        Self::ALL
            .into_iter()
            .find(|s| s.spellings().contains(&normalized.as_str()))
            .ok_or_else(|| StatusError::Unknown(value.to_string()))
    }
}

impl<'de> Deserialize<'de> for LeadStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// `deserialize_with` helper for store rows, see [`LeadStatus::from_stored`]
pub fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LeadStatus, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(LeadStatus::from_stored(value.as_deref()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("status cannot be empty")]
    Empty,
    #[error("unknown status '{0}'")]
    Unknown(String),
}
