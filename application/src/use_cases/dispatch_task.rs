//! Task dispatch use case
//!
//! Top-level pipeline for one task: open an episode, gather context,
//! route, run the consensus stages, persist learnings, update the task,
//! and close the episode. Every failure anywhere in the cycle is caught at
//! this boundary: the task ends Failed with the error captured and the
//! episode is closed as a failure - a dispatch never leaves an episode
//! open or a task stuck in progress.

use crate::ports::agent_gateway::AgentGateway;
use crate::ports::knowledge_store::{KnowledgeEntry, KnowledgeStore};
use crate::use_cases::episodes::EpisodeRecorder;
use crate::use_cases::run_consensus::{ConsensusEngine, ConsensusError};
use hydra_domain::{AgentRole, Candidate, ConsensusResult, DomainError, Router, Task};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Collection winning solutions are persisted into
pub const SOLUTIONS_COLLECTION: &str = "solutions";
/// Collection recalled for prior patterns
pub const PATTERNS_COLLECTION: &str = "code_patterns";

/// Errors raised to the dispatcher's caller.
///
/// Pipeline failures are not raised: they are folded into a failed
/// [`DispatchReport`]. Only pre-flight validation gets an `Err`.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    InvalidState(#[from] DomainError),
}

/// Outcome of one dispatch cycle
#[derive(Debug)]
pub struct DispatchReport {
    pub success: bool,
    pub episode_id: String,
    pub winner: Option<Candidate>,
    pub consensus: Option<ConsensusResult>,
    /// Rough token count of the winning content
    pub tokens: usize,
    /// Number of candidates that entered the vote
    pub iterations: usize,
    pub consensus_rounds: usize,
    pub error: Option<String>,
}

impl DispatchReport {
    fn failed(episode_id: String, error: impl Into<String>) -> Self {
        Self {
            success: false,
            episode_id,
            winner: None,
            consensus: None,
            tokens: 0,
            iterations: 0,
            consensus_rounds: 0,
            error: Some(error.into()),
        }
    }
}

/// Routes and executes tasks through the consensus pipeline.
pub struct TaskDispatcher<G: AgentGateway + 'static, K: KnowledgeStore> {
    engine: ConsensusEngine<G>,
    knowledge: Arc<K>,
    episodes: Arc<EpisodeRecorder<K>>,
    router: Router,
}

impl<G: AgentGateway + 'static, K: KnowledgeStore> TaskDispatcher<G, K> {
    pub fn new(
        engine: ConsensusEngine<G>,
        knowledge: Arc<K>,
        episodes: Arc<EpisodeRecorder<K>>,
        router: Router,
    ) -> Self {
        Self {
            engine,
            knowledge,
            episodes,
            router,
        }
    }

    /// Route a task without dispatching it
    pub fn route(&self, task: &Task) -> AgentRole {
        self.router.route(task)
    }

    /// Execute one full dispatch cycle.
    ///
    /// Returns `Err` only when the task is not in a dispatchable state;
    /// every pipeline failure is reported through the `DispatchReport` with
    /// the task marked failed.
    pub async fn execute(&self, task: &mut Task) -> Result<DispatchReport, DispatchError> {
        info!("Executing task {}: {}", task.id, task.title);
        task.start()?;

        let episode_id = self.episodes.start(task);

        let report = match self.run_pipeline(task, &episode_id).await {
            Ok(report) => {
                // A terminal-state error here would be a logic bug; surface it
                // as a failed dispatch rather than panicking.
                if let Err(e) = task.complete() {
                    warn!("Could not complete task {}: {}", task.id, e);
                }
                self.episodes.end(&episode_id, true).await;
                report
            }
            Err(e) => {
                warn!("Task {} failed: {}", task.id, e);
                if let Err(transition) = task.fail(e.to_string()) {
                    warn!("Could not mark task {} failed: {}", task.id, transition);
                }
                self.episodes.end(&episode_id, false).await;
                DispatchReport::failed(episode_id, e.to_string())
            }
        };

        Ok(report)
    }

    async fn run_pipeline(
        &self,
        task: &Task,
        episode_id: &str,
    ) -> Result<DispatchReport, ConsensusError> {
        // Step 1: best-effort context recall
        let context = self.gather_context(task).await;
        self.episodes.record(
            episode_id,
            "context_gathered",
            AgentRole::Architect,
            serde_json::json!({ "patterns_found": context.len() }),
        );

        // Step 2: routing
        let generator_role = self.router.route(task);

        // Step 3: parallel candidate generation
        let candidates = self.engine.generate_candidates(task, generator_role).await;
        self.episodes.record(
            episode_id,
            "candidates_generated",
            generator_role,
            serde_json::json!({ "count": candidates.len() }),
        );

        if candidates.is_empty() {
            return Err(ConsensusError::NoCandidates);
        }

        // Step 4: cross-verification (never fatal)
        let verifications = self.engine.cross_verify(&candidates, task).await;
        self.episodes.record(
            episode_id,
            "verification_complete",
            AgentRole::QaSentinel,
            serde_json::json!({ "passed": verifications.iter().filter(|v| v.passed).count() }),
        );

        // Step 5: single judged vote
        let consensus = self
            .engine
            .consensus_vote(&candidates, &verifications, task)
            .await?;
        self.episodes.record(
            episode_id,
            "consensus_reached",
            AgentRole::ConsensusJudge,
            serde_json::json!({
                "winner_id": consensus.winner_candidate_id,
                "score": consensus.winning_score,
            }),
        );

        // The winner is validated against the batch by ConsensusResult
        let winner = candidates
            .iter()
            .find(|c| c.id == consensus.winner_candidate_id)
            .cloned()
            .ok_or_else(|| {
                ConsensusError::Domain(DomainError::WinnerNotInBatch(
                    consensus.winner_candidate_id.clone(),
                ))
            })?;

        // Step 6: persist learnings, best-effort
        self.persist_winner(task, &winner, &consensus).await;

        Ok(DispatchReport {
            success: true,
            episode_id: episode_id.to_string(),
            tokens: winner.approx_tokens(),
            iterations: candidates.len(),
            consensus_rounds: 1,
            winner: Some(winner),
            consensus: Some(consensus),
            error: None,
        })
    }

    /// Recall similar patterns and solutions. Errors are swallowed: context
    /// is an optimization, never a dispatch requirement.
    async fn gather_context(&self, task: &Task) -> Vec<KnowledgeEntry> {
        let mut context = Vec::new();

        match self
            .knowledge
            .recall(&task.description, PATTERNS_COLLECTION, 3, None)
            .await
        {
            Ok(patterns) => context.extend(patterns),
            Err(e) => warn!("Pattern recall failed: {}", e),
        }

        match self
            .knowledge
            .recall(&task.description, SOLUTIONS_COLLECTION, 2, None)
            .await
        {
            Ok(solutions) => context.extend(solutions),
            Err(e) => warn!("Solution recall failed: {}", e),
        }

        context
    }

    async fn persist_winner(&self, task: &Task, winner: &Candidate, consensus: &ConsensusResult) {
        let mut metadata: HashMap<String, serde_json::Value> = HashMap::new();
        metadata.insert("type".to_string(), "solution".into());
        metadata.insert("task_id".to_string(), task.id.to_string().into());
        metadata.insert("approach".to_string(), winner.approach.clone().into());
        metadata.insert("score".to_string(), consensus.winning_score.into());

        if let Err(e) = self
            .knowledge
            .store(&winner.content, SOLUTIONS_COLLECTION, metadata)
            .await
        {
            warn!("Failed to persist winning solution: {}", e);
        }
    }
}
