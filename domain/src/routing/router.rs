//! Keyword-baseline router with complexity escalation.

use super::ComplexityPolicy;
use crate::core::AgentRole;
use crate::task::Task;

/// Threshold above which worker-routed tasks are escalated to the Architect
const ESCALATION_THRESHOLD: f64 = 0.8;

const ARCHITECT_KEYWORDS: &[&str] = &["plan", "architect", "design", "schema", "structure"];
const FRONTEND_KEYWORDS: &[&str] = &["frontend", "ui", "react", "vue", "component", "css", "html"];
const BACKEND_KEYWORDS: &[&str] = &["backend", "api", "database", "server", "python", "go"];
const QA_KEYWORDS: &[&str] = &["test", "verify", "qa", "validate", "check"];

/// Maps a task to the agent role responsible for it.
pub struct Router {
    complexity: Box<dyn ComplexityPolicy>,
}

impl Router {
    pub fn new(complexity: Box<dyn ComplexityPolicy>) -> Self {
        Self { complexity }
    }

    /// Route a task to its responsible role.
    ///
    /// Explicit assignment always wins. Otherwise a keyword baseline is
    /// computed from the description; baselines that land on a worker role
    /// are escalated to the Architect when the complexity score exceeds the
    /// threshold. Deterministic for identical input.
    pub fn route(&self, task: &Task) -> AgentRole {
        if let Some(assigned) = task.assigned_agent {
            return assigned;
        }

        let baseline = Self::keyword_baseline(&task.description);
        let complexity = self.complexity.complexity(task);

        if complexity > ESCALATION_THRESHOLD && baseline.is_worker() {
            return AgentRole::Architect;
        }

        baseline
    }

    fn keyword_baseline(description: &str) -> AgentRole {
        let description = description.to_lowercase();
        let matches = |keywords: &[&str]| keywords.iter().any(|k| description.contains(k));

        if matches(ARCHITECT_KEYWORDS) {
            AgentRole::Architect
        } else if matches(FRONTEND_KEYWORDS) {
            AgentRole::FrontendWorker
        } else if matches(BACKEND_KEYWORDS) {
            AgentRole::BackendWorker
        } else if matches(QA_KEYWORDS) {
            AgentRole::QaSentinel
        } else {
            // Ambiguous tasks go to the Architect
            AgentRole::Architect
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Box::new(super::KeywordComplexity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_assignment_wins() {
        let task = Task::new("t1", "T", "build a backend api server")
            .with_assigned_agent(AgentRole::QaSentinel);
        assert_eq!(Router::default().route(&task), AgentRole::QaSentinel);
    }

    #[test]
    fn test_keyword_baselines() {
        let router = Router::default();

        let ui = Task::new("t1", "T", "add a react component for the dashboard");
        assert_eq!(router.route(&ui), AgentRole::FrontendWorker);

        let backend = Task::new("t2", "T", "expose the orders endpoint on the server");
        assert_eq!(router.route(&backend), AgentRole::BackendWorker);

        let qa = Task::new("t3", "T", "verify the login flow edge cases");
        assert_eq!(router.route(&qa), AgentRole::QaSentinel);

        let ambiguous = Task::new("t4", "T", "do the thing");
        assert_eq!(router.route(&ambiguous), AgentRole::Architect);
    }

    #[test]
    fn test_complex_worker_task_escalates_to_architect() {
        let description = format!(
            "backend server work: {}",
            "distributed scalable async concurrent security optimization ".repeat(100)
        );
        let task = Task::new("t1", "T", description)
            .with_metadata("requirements", serde_json::json!(vec!["r"; 20]))
            .with_dependency("a")
            .with_dependency("b")
            .with_dependency("c")
            .with_dependency("d")
            .with_dependency("e");

        assert_eq!(Router::default().route(&task), AgentRole::Architect);
    }

    #[test]
    fn test_route_is_deterministic() {
        let task = Task::new("t1", "T", "design the database schema for the api");
        let router = Router::default();
        let first = router.route(&task);
        for _ in 0..10 {
            assert_eq!(router.route(&task), first);
        }
    }
}
