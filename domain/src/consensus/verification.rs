//! Verification results from cross-verification.

use crate::core::AgentRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Assessment of one candidate by one verifier role.
///
/// Many-to-one with [`super::Candidate`]: a candidate may collect zero or
/// more verifications depending on how many verifier calls survived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub candidate_id: String,
    pub verifier_role: AgentRole,
    pub passed: bool,
    /// Quality score, clamped to [0, 1]
    pub score: f64,
    /// Raw feedback from the verifier
    pub feedback: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub verified_at: DateTime<Utc>,
}

impl VerificationResult {
    pub fn new(
        candidate_id: impl Into<String>,
        verifier_role: AgentRole,
        passed: bool,
        score: f64,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            verifier_role,
            passed,
            score: score.clamp(0.0, 1.0),
            feedback: feedback.into(),
            errors: Vec::new(),
            warnings: Vec::new(),
            verified_at: Utc::now(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_clamped() {
        let high = VerificationResult::new("c1", AgentRole::QaSentinel, true, 1.7, "ok");
        assert_eq!(high.score, 1.0);

        let low = VerificationResult::new("c1", AgentRole::QaSentinel, false, -0.2, "bad");
        assert_eq!(low.score, 0.0);
    }
}
