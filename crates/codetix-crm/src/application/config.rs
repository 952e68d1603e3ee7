//! Distribution settings

use serde::{Deserialize, Serialize};

use crate::domain::services::DEFAULT_MAX_ACTIVE_LEADS;

/// What a failed write does to batches already committed in the same run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceMode {
    /// Each agent's batch stands or falls on its own
    #[default]
    BestEffort,
    /// Any failure releases every batch of the run
    AllOrNothing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    pub max_active_leads: u32,
    pub persistence_mode: PersistenceMode,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            max_active_leads: DEFAULT_MAX_ACTIVE_LEADS,
            persistence_mode: PersistenceMode::BestEffort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: DistributionConfig = serde_json::from_str(r#"{"persistence_mode":"all_or_nothing"}"#).unwrap();
        assert_eq!(config.max_active_leads, 15);
        assert_eq!(config.persistence_mode, PersistenceMode::AllOrNothing);
    }
}
