//! Zone Value Object
//!
//! Free-text locality used as a soft preference when distributing leads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Agent zone affinity, normalized for matching
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zone(String);

impl Zone {
    /// Build a zone from raw text. Blank input yields `None`.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let normalized = raw?.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match against a lead's zone
    pub fn matches(&self, lead_zone: Option<&str>) -> bool {
        lead_zone
            .map(|z| z.to_lowercase().contains(&self.0))
            .unwrap_or(false)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
