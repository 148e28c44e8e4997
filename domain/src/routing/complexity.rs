//! Complexity scoring policy.

use crate::task::Task;

/// Scoring policy that rates how complex a task is, in [0, 1].
///
/// Kept behind a trait so the placeholder keyword heuristic can be swapped
/// for a real estimator without touching routing control flow.
pub trait ComplexityPolicy: Send + Sync {
    fn complexity(&self, task: &Task) -> f64;
}

/// Capped weighted-sum heuristic over description length, declared
/// requirements, complexity keywords, and dependency count.
#[derive(Debug, Clone, Default)]
pub struct KeywordComplexity;

const COMPLEXITY_KEYWORDS: &[&str] = &[
    "architecture",
    "design",
    "scalable",
    "distributed",
    "optimization",
    "algorithm",
    "performance",
    "security",
    "integration",
    "microservice",
    "async",
    "concurrent",
];

impl ComplexityPolicy for KeywordComplexity {
    fn complexity(&self, task: &Task) -> f64 {
        let mut score = 0.0;

        // Description length, capped at 0.3
        let words = task.description.split_whitespace().count();
        score += (words as f64 / 200.0).min(0.3);

        // Declared requirements, capped at 0.2
        let requirements = task.requirements().len();
        score += (requirements as f64 / 10.0).min(0.2);

        // Complexity keywords, capped at 0.3
        let description = task.description.to_lowercase();
        let keyword_matches = COMPLEXITY_KEYWORDS
            .iter()
            .filter(|k| description.contains(*k))
            .count();
        score += (keyword_matches as f64 / 5.0).min(0.3);

        // Dependencies, capped at 0.2
        score += (task.dependencies.len() as f64 / 5.0).min(0.2);

        score.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivial_task_scores_low() {
        let task = Task::new("t1", "Fix typo", "Fix a typo in the readme");
        let score = KeywordComplexity.complexity(&task);
        assert!(score < 0.2, "score was {score}");
    }

    #[test]
    fn test_extreme_input_is_clamped() {
        let description = "distributed scalable async concurrent architecture ".repeat(2_000);
        let task = Task::new("t1", "Huge", description)
            .with_metadata("requirements", serde_json::json!(vec!["r"; 100]))
            .with_dependency("a")
            .with_dependency("b")
            .with_dependency("c")
            .with_dependency("d")
            .with_dependency("e")
            .with_dependency("f");

        let score = KeywordComplexity.complexity(&task);
        assert!(score <= 1.0);
        // All four factors saturate their caps
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let task = Task::new("t1", "T", "Design a distributed microservice architecture");
        let first = KeywordComplexity.complexity(&task);
        for _ in 0..10 {
            assert_eq!(KeywordComplexity.complexity(&task), first);
        }
    }
}
