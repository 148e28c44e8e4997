//! Consensus configuration from TOML (`[consensus]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [consensus]
//! approaches = ["conservative", "aggressive", "minimal"]
//! stage_timeout_secs = 300
//! ```

use hydra_application::use_cases::run_consensus::ConsensusConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Consensus engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    /// Generation approaches; one candidate per approach
    pub approaches: Vec<String>,
    /// Shared deadline per pipeline stage, in seconds
    pub stage_timeout_secs: u64,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        let defaults = ConsensusConfig::default();
        Self {
            approaches: defaults.approaches,
            stage_timeout_secs: defaults.stage_timeout.as_secs(),
        }
    }
}

impl FileConsensusConfig {
    pub fn to_consensus_config(&self) -> ConsensusConfig {
        ConsensusConfig {
            approaches: self.approaches.clone(),
            stage_timeout: Duration::from_secs(self.stage_timeout_secs),
            ..ConsensusConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_defaults() {
        let config = FileConsensusConfig::default();
        assert_eq!(config.approaches.len(), 3);
        assert_eq!(config.stage_timeout_secs, 300);
    }

    #[test]
    fn test_conversion_preserves_values() {
        let config = FileConsensusConfig {
            approaches: vec!["defensive".to_string()],
            stage_timeout_secs: 60,
        };
        let converted = config.to_consensus_config();
        assert_eq!(converted.approaches, vec!["defensive"]);
        assert_eq!(converted.stage_timeout, Duration::from_secs(60));
    }
}
