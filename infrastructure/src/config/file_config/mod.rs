//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Each section is deserialized with full defaults, so a missing section
//! or field never fails the load.

mod agents;
mod consensus;
mod refiner;
mod storage;

pub use agents::{FileAgentProfile, FileAgentsConfig};
pub use consensus::FileConsensusConfig;
pub use refiner::{FileFitnessWeights, FileRefinerConfig};
pub use storage::{FileBusConfig, FileCheckpointConfig, FileKnowledgeConfig};

use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Consensus engine settings
    pub consensus: FileConsensusConfig,
    /// Evolutionary refiner settings
    pub refiner: FileRefinerConfig,
    /// Checkpoint persistence settings
    pub checkpoint: FileCheckpointConfig,
    /// State bus settings
    pub bus: FileBusConfig,
    /// Knowledge store settings
    pub knowledge: FileKnowledgeConfig,
    /// Per-role model server overrides
    pub agents: FileAgentsConfig,
}

impl FileConfig {
    /// Check the loaded configuration, returning human-readable warnings.
    ///
    /// Warnings never block startup; the corresponding sections fall back
    /// to their defaults.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.consensus.approaches.is_empty() {
            warnings.push(
                "consensus.approaches is empty; no candidates will be generated".to_string(),
            );
        }
        if self.consensus.stage_timeout_secs == 0 {
            warnings.push("consensus.stage_timeout_secs is 0; every stage will expire".to_string());
        }
        if !self.refiner.weights_sum_to_one() {
            warnings.push("refiner.weights do not sum to 1.0; fitness leaves [0, 1]".to_string());
        }
        if self.checkpoint.retention == 0 {
            warnings.push("checkpoint.retention is 0; snapshots are pruned immediately".to_string());
        }

        let (_, unknown_roles) = self.agents.to_profile_registry();
        for key in unknown_roles {
            warnings.push(format!("agents.{key}: unknown role, section ignored"));
        }

        warnings
    }
}
