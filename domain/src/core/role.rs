//! Agent roles in the swarm.
//!
//! Each role maps to a dedicated model server with its own sampling profile.
//! Roles are stable wire identifiers: they appear in persisted messages,
//! checkpoints, and knowledge records.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role of an agent in the swarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Plans, designs, and handles the most complex tasks
    Architect,
    /// Implements backend services and APIs
    #[serde(rename = "worker_backend")]
    BackendWorker,
    /// Implements user interfaces and components
    #[serde(rename = "worker_frontend")]
    FrontendWorker,
    /// Verifies candidates against requirements
    QaSentinel,
    /// Casts the final judgment over a candidate batch
    ConsensusJudge,
}

impl AgentRole {
    /// All roles, in a fixed order
    pub fn all() -> [AgentRole; 5] {
        [
            AgentRole::Architect,
            AgentRole::BackendWorker,
            AgentRole::FrontendWorker,
            AgentRole::QaSentinel,
            AgentRole::ConsensusJudge,
        ]
    }

    /// Wire name used in persisted records
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Architect => "architect",
            AgentRole::BackendWorker => "worker_backend",
            AgentRole::FrontendWorker => "worker_frontend",
            AgentRole::QaSentinel => "qa_sentinel",
            AgentRole::ConsensusJudge => "consensus_judge",
        }
    }

    /// Whether this role is a code-producing worker
    pub fn is_worker(&self) -> bool {
        matches!(self, AgentRole::BackendWorker | AgentRole::FrontendWorker)
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "architect" => Ok(AgentRole::Architect),
            "worker_backend" | "backend" => Ok(AgentRole::BackendWorker),
            "worker_frontend" | "frontend" => Ok(AgentRole::FrontendWorker),
            "qa_sentinel" | "qa" => Ok(AgentRole::QaSentinel),
            "consensus_judge" | "judge" => Ok(AgentRole::ConsensusJudge),
            other => Err(format!("unknown agent role: {other}")),
        }
    }
}
