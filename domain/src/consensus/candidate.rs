//! Candidate solutions produced during parallel generation.

use crate::core::AgentRole;
use crate::task::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One generated solution attempt for a task, tagged with an approach.
///
/// Immutable once created; scoped to a single dispatch cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate identifier (uuid v4)
    pub id: String,
    /// Task this candidate was generated for
    pub task_id: TaskId,
    /// Role that produced this candidate
    pub agent_role: AgentRole,
    /// Generated content
    pub content: String,
    /// Named generation strategy (e.g. "conservative", "aggressive", "minimal")
    pub approach: String,
    pub generated_at: DateTime<Utc>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Candidate {
    pub fn new(
        task_id: TaskId,
        agent_role: AgentRole,
        content: impl Into<String>,
        approach: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id,
            agent_role,
            content: content.into(),
            approach: approach.into(),
            generated_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Rough token count of the content (whitespace-split words)
    pub fn approx_tokens(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_get_unique_ids() {
        let a = Candidate::new(
            TaskId::from("t1"),
            AgentRole::BackendWorker,
            "fn a() {}",
            "conservative",
        );
        let b = Candidate::new(
            TaskId::from("t1"),
            AgentRole::BackendWorker,
            "fn b() {}",
            "aggressive",
        );
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_approx_tokens() {
        let c = Candidate::new(TaskId::from("t1"), AgentRole::Architect, "one two  three", "minimal");
        assert_eq!(c.approx_tokens(), 3);
    }
}
