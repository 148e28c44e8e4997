//! Judge votes over a candidate batch.

use crate::core::AgentRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single vote cast by the judge role over one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub candidate_id: String,
    pub voter_role: AgentRole,
    /// Overall score, clamped to [0, 1]
    pub score: f64,
    /// Reasoning text from the judge
    pub reasoning: String,
    /// Per-criterion scores (correctness, performance, readability, maintainability)
    pub criteria: HashMap<String, f64>,
    pub voted_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(
        candidate_id: impl Into<String>,
        voter_role: AgentRole,
        score: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            voter_role,
            score: score.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
            criteria: HashMap::new(),
            voted_at: Utc::now(),
        }
    }

    pub fn with_criterion(mut self, name: impl Into<String>, score: f64) -> Self {
        self.criteria.insert(name.into(), score.clamp(0.0, 1.0));
        self
    }
}
