//! Evolutionary refinement of a winning candidate
//!
//! Single-lineage hill climbing: each generation mutates the current
//! incumbent, scores every mutant, and promotes the best mutant only when
//! it strictly improves on the incumbent's fitness. The first generation
//! with no strict improvement ends the run, so the returned candidate is
//! never worse than the seed.

use crate::ports::agent_gateway::{AgentGateway, GenerationRequest};
use crate::ports::sandbox::Sandbox;
use hydra_domain::{
    AgentRole, Candidate, CodeQualityPolicy, HeuristicQuality, PromptTemplate, Task,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Mutation strategies cycled through when breeding a generation
pub const MUTATION_STRATEGIES: [&str; 5] = [
    "Refactor for better performance",
    "Refactor for better readability",
    "Add comprehensive error handling",
    "Optimize algorithms and data structures",
    "Add type hints and documentation",
];

/// Relative weight of each fitness component. Must sum to 1.0 for the
/// total to stay in [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct FitnessWeights {
    pub correctness: f64,
    pub performance: f64,
    pub readability: f64,
    pub maintainability: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            correctness: 0.4,
            performance: 0.2,
            readability: 0.2,
            maintainability: 0.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefinerConfig {
    /// Upper bound on generations; the run usually stops earlier on the
    /// first non-improving generation
    pub max_generations: usize,
    /// Mutants bred per generation
    pub population_size: usize,
    /// Language passed to the sandbox when executing candidates
    pub language: String,
    /// Sandbox runs at or beyond this duration score zero on performance
    pub execution_budget: Duration,
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            max_generations: 10,
            population_size: 5,
            language: "python".to_string(),
            execution_budget: Duration::from_secs(10),
        }
    }
}

/// Per-component fitness breakdown for one candidate
#[derive(Debug, Clone, Copy)]
pub struct FitnessReport {
    pub total: f64,
    pub correctness: f64,
    pub performance: f64,
    pub readability: f64,
    pub maintainability: f64,
}

/// Result of one refinement run
#[derive(Debug)]
pub struct RefinementOutcome {
    pub best: Candidate,
    pub fitness: f64,
    pub seed_fitness: f64,
    /// Generations actually bred before the run stopped
    pub generations: usize,
    /// Best fitness observed after each generation, seed first
    pub history: Vec<f64>,
}

impl RefinementOutcome {
    pub fn improved(&self) -> bool {
        self.fitness > self.seed_fitness
    }
}

/// Hill-climbing refiner over a single candidate lineage.
pub struct EvolutionaryRefiner<G: AgentGateway + 'static, S: Sandbox> {
    gateway: Arc<G>,
    sandbox: Arc<S>,
    quality: Arc<dyn CodeQualityPolicy>,
    weights: FitnessWeights,
    config: RefinerConfig,
}

impl<G: AgentGateway + 'static, S: Sandbox> EvolutionaryRefiner<G, S> {
    pub fn new(gateway: Arc<G>, sandbox: Arc<S>, config: RefinerConfig) -> Self {
        Self {
            gateway,
            sandbox,
            quality: Arc::new(HeuristicQuality),
            weights: FitnessWeights::default(),
            config,
        }
    }

    pub fn with_quality_policy(mut self, policy: Arc<dyn CodeQualityPolicy>) -> Self {
        self.quality = policy;
        self
    }

    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Refine `seed` until fitness stops improving or the generation cap
    /// is reached. Mutations are requested from `mutator_role`.
    pub async fn refine(
        &self,
        task: &Task,
        seed: &Candidate,
        mutator_role: AgentRole,
    ) -> RefinementOutcome {
        let seed_fitness = self.fitness(seed).await.total;
        info!(
            "Refining candidate {} (seed fitness {:.3})",
            seed.id, seed_fitness
        );

        let mut incumbent = seed.clone();
        let mut best_fitness = seed_fitness;
        let mut history = vec![seed_fitness];
        let mut generations = 0;

        for generation in 1..=self.config.max_generations {
            let mutants = self.breed(task, &incumbent, mutator_role).await;
            if mutants.is_empty() {
                warn!("Generation {} produced no mutants, stopping", generation);
                break;
            }
            generations = generation;

            // Strictly-greater comparison keeps the incumbent on ties and,
            // among equal mutants, the one bred first.
            let mut challenger: Option<(Candidate, f64)> = None;
            for mutant in mutants {
                let fitness = self.fitness(&mutant).await.total;
                debug!(
                    "Generation {} mutant {} scored {:.3}",
                    generation, mutant.approach, fitness
                );
                let current_best = challenger.as_ref().map_or(best_fitness, |(_, f)| *f);
                if fitness > current_best {
                    challenger = Some((mutant, fitness));
                }
            }

            match challenger {
                Some((mutant, fitness)) => {
                    info!(
                        "Generation {}: fitness improved {:.3} -> {:.3}",
                        generation, best_fitness, fitness
                    );
                    incumbent = mutant;
                    best_fitness = fitness;
                    history.push(fitness);
                }
                None => {
                    info!("Generation {}: no improvement, stopping", generation);
                    break;
                }
            }
        }

        RefinementOutcome {
            best: incumbent,
            fitness: best_fitness,
            seed_fitness,
            generations,
            history,
        }
    }

    /// Breed one generation of mutants from the incumbent. Gateway
    /// failures drop the mutant; the survivors keep breeding order.
    async fn breed(
        &self,
        task: &Task,
        incumbent: &Candidate,
        mutator_role: AgentRole,
    ) -> Vec<Candidate> {
        let mut join_set = JoinSet::new();

        for index in 0..self.config.population_size {
            let strategy = MUTATION_STRATEGIES[index % MUTATION_STRATEGIES.len()];
            let prompt = PromptTemplate::mutation(task, incumbent, strategy);
            let gateway = Arc::clone(&self.gateway);

            join_set.spawn(async move {
                let request = GenerationRequest::new(prompt).with_temperature(0.8);
                (index, strategy, gateway.generate(mutator_role, request).await)
            });
        }

        let mut slots: Vec<Option<Candidate>> = Vec::new();
        slots.resize_with(self.config.population_size, || None);

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, strategy, Ok(completion))) => {
                    slots[index] = Some(
                        Candidate::new(
                            incumbent.task_id.clone(),
                            mutator_role,
                            completion.content,
                            strategy,
                        )
                        .with_metadata("parent_id", incumbent.id.clone()),
                    );
                }
                Ok((index, strategy, Err(e))) => {
                    warn!("Mutation {} ({}) failed: {}", index, strategy, e);
                }
                Err(e) => {
                    warn!("Mutation task panicked: {}", e);
                }
            }
        }

        slots.into_iter().flatten().collect()
    }

    /// Score one candidate. Sandbox failures score zero on correctness
    /// and performance rather than aborting the run.
    pub async fn fitness(&self, candidate: &Candidate) -> FitnessReport {
        let started = Instant::now();
        let (correctness, performance) = match self
            .sandbox
            .execute_code(&candidate.content, &self.config.language, None)
            .await
        {
            Ok(report) if report.success => {
                let elapsed = started.elapsed();
                (1.0, self.performance_score(elapsed))
            }
            Ok(_) => (0.0, 0.0),
            Err(e) => {
                warn!("Sandbox execution failed for {}: {}", candidate.id, e);
                (0.0, 0.0)
            }
        };

        let readability = self.quality.readability(&candidate.content);
        let maintainability = self.quality.maintainability(&candidate.content);

        let total = self.weights.correctness * correctness
            + self.weights.performance * performance
            + self.weights.readability * readability
            + self.weights.maintainability * maintainability;

        FitnessReport {
            total,
            correctness,
            performance,
            readability,
            maintainability,
        }
    }

    /// Linear decay of wall-clock execution time over the budget
    fn performance_score(&self, elapsed: Duration) -> f64 {
        let budget = self.config.execution_budget.as_secs_f64();
        if budget <= 0.0 {
            return 0.0;
        }
        (1.0 - elapsed.as_secs_f64() / budget).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_gateway::{Completion, GatewayError, TokenUsage};
    use crate::ports::sandbox::{ExecutionReport, SandboxError};
    use async_trait::async_trait;
    use hydra_domain::TaskId;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Gateway replying with a queue of canned mutations; `None` entries
    /// fail the call. Cycles from the start once exhausted.
    struct MutationGateway {
        replies: Vec<Option<&'static str>>,
        calls: AtomicUsize,
    }

    impl MutationGateway {
        fn new(replies: Vec<Option<&'static str>>) -> Self {
            Self {
                replies,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AgentGateway for MutationGateway {
        async fn generate(
            &self,
            _role: AgentRole,
            _request: GenerationRequest,
        ) -> Result<Completion, GatewayError> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst) % self.replies.len();
            match self.replies[index] {
                Some(content) => Ok(Completion {
                    content: content.to_string(),
                    model: "scripted".to_string(),
                    usage: TokenUsage::default(),
                }),
                None => Err(GatewayError::RequestFailed("scripted failure".into())),
            }
        }
    }

    /// Sandbox passing or failing code by a content marker
    struct MarkerSandbox {
        executions: Mutex<Vec<String>>,
    }

    impl MarkerSandbox {
        fn new() -> Self {
            Self {
                executions: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Sandbox for MarkerSandbox {
        async fn execute_code(
            &self,
            code: &str,
            _language: &str,
            _test_command: Option<&str>,
        ) -> Result<ExecutionReport, SandboxError> {
            self.executions.lock().unwrap().push(code.to_string());
            let success = !code.contains("broken");
            Ok(ExecutionReport {
                success,
                output: String::new(),
                exit_code: if success { 0 } else { 1 },
            })
        }

        async fn run_tests(
            &self,
            _files: &[(String, String)],
            _language: &str,
        ) -> Result<ExecutionReport, SandboxError> {
            Err(SandboxError::Unavailable("not wired in tests".into()))
        }
    }

    fn seed() -> Candidate {
        // Passes execution but has no quality markers
        Candidate::new(
            TaskId::from("t1"),
            AgentRole::BackendWorker,
            "print('ok')",
            "conservative",
        )
    }

    fn task() -> Task {
        Task::new("t1", "Refine", "Refine the solution")
    }

    fn refiner(
        gateway: MutationGateway,
        config: RefinerConfig,
    ) -> EvolutionaryRefiner<MutationGateway, MarkerSandbox> {
        EvolutionaryRefiner::new(Arc::new(gateway), Arc::new(MarkerSandbox::new()), config)
    }

    /// A documented, typed mutant that scores above the bare seed
    const STRONG_MUTANT: &str = "\"\"\"Docs\"\"\"\ndef run() -> int:\n    return 1\n";

    #[tokio::test]
    async fn test_stops_when_no_mutant_improves() {
        // Every mutant is identical to the seed's quality tier, failing
        // execution, so generation one cannot improve.
        let gateway = MutationGateway::new(vec![Some("broken")]);
        let refiner = refiner(gateway, RefinerConfig::default());

        let outcome = refiner.refine(&task(), &seed(), AgentRole::BackendWorker).await;

        assert_eq!(outcome.generations, 1);
        assert!(!outcome.improved());
        assert_eq!(outcome.best.content, "print('ok')");
    }

    #[tokio::test]
    async fn test_promotes_strictly_better_mutant() {
        let gateway = MutationGateway::new(vec![Some(STRONG_MUTANT), Some("broken")]);
        let config = RefinerConfig {
            max_generations: 3,
            population_size: 2,
            ..RefinerConfig::default()
        };
        let refiner = refiner(gateway, config);

        let outcome = refiner.refine(&task(), &seed(), AgentRole::BackendWorker).await;

        assert!(outcome.improved());
        assert_eq!(outcome.best.content, STRONG_MUTANT);
        assert!(outcome.fitness > outcome.seed_fitness);
    }

    #[tokio::test]
    async fn test_never_returns_below_seed_fitness() {
        // All mutants fail execution, dragging their fitness below the seed
        let gateway = MutationGateway::new(vec![Some("broken")]);
        let refiner = refiner(gateway, RefinerConfig::default());

        let s = seed();
        let outcome = refiner.refine(&task(), &s, AgentRole::BackendWorker).await;

        assert!(outcome.fitness >= outcome.seed_fitness);
        assert_eq!(outcome.best.id, s.id);
    }

    #[tokio::test]
    async fn test_all_mutations_failing_stops_the_run() {
        let gateway = MutationGateway::new(vec![None]);
        let refiner = refiner(gateway, RefinerConfig::default());

        let outcome = refiner.refine(&task(), &seed(), AgentRole::BackendWorker).await;

        assert_eq!(outcome.generations, 0);
        assert!(!outcome.improved());
    }

    #[tokio::test]
    async fn test_generation_cap_bounds_the_run() {
        // Gateway always returns the strong mutant; after the first
        // promotion every later mutant ties and the run stops, well under
        // the cap.
        let gateway = MutationGateway::new(vec![Some(STRONG_MUTANT)]);
        let config = RefinerConfig {
            max_generations: 10,
            population_size: 1,
            ..RefinerConfig::default()
        };
        let refiner = refiner(gateway, config);

        let outcome = refiner.refine(&task(), &seed(), AgentRole::BackendWorker).await;

        assert!(outcome.generations <= 10);
        assert!(outcome.improved());
        assert_eq!(outcome.history.len(), 2);
    }

    #[tokio::test]
    async fn test_fitness_weights_sum_components() {
        let gateway = MutationGateway::new(vec![Some("unused")]);
        let refiner = refiner(gateway, RefinerConfig::default());

        let report = refiner.fitness(&seed()).await;

        // Passing execution with a short, markerless body:
        // 0.4*1.0 + ~0.2*1.0 + 0.2*0.6 + 0.2*0.0
        assert_eq!(report.correctness, 1.0);
        assert_eq!(report.readability, 0.6);
        assert_eq!(report.maintainability, 0.0);
        assert!(report.total > 0.5 && report.total <= 0.72);
    }
}
