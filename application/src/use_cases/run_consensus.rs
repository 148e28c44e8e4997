//! Consensus engine use case
//!
//! Drives one candidate batch through its three stages: parallel
//! generation, parallel cross-verification, and a single judged vote.
//!
//! Each fan-out stage runs under one shared deadline. When the deadline
//! elapses the entire in-flight batch is discarded - there is no
//! partial-result salvage. That all-or-nothing policy is deliberate (and a
//! known data-loss tradeoff); revisit it only as an explicit design change.

use crate::ports::agent_gateway::{AgentGateway, GatewayError, GenerationRequest};
use hydra_domain::{
    AgentRole, Candidate, ConsensusResult, DomainError, PromptTemplate, ReviewScorePolicy,
    SentimentScore, Task, VerificationResult, Vote, select_winner,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Errors that can occur during consensus execution
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// The candidate batch is empty; the pipeline reports "no_candidates"
    #[error("No candidates to vote on")]
    NoCandidates,

    #[error("Judge call failed: {0}")]
    Judge(#[from] GatewayError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Tuning for the consensus engine
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    /// Named generation strategies; one candidate is produced per approach
    pub approaches: Vec<String>,
    /// Shared deadline for one whole fan-out stage
    pub stage_timeout: Duration,
    /// The two distinct roles that cross-verify every candidate
    pub verifier_roles: [AgentRole; 2],
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            approaches: vec![
                "conservative".to_string(),
                "aggressive".to_string(),
                "minimal".to_string(),
            ],
            stage_timeout: Duration::from_secs(300),
            verifier_roles: [AgentRole::QaSentinel, AgentRole::Architect],
        }
    }
}

/// Generates N candidates in parallel, cross-verifies them, and runs a
/// single judged vote to pick a winner.
pub struct ConsensusEngine<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    review_policy: Arc<dyn ReviewScorePolicy>,
    config: ConsensusConfig,
}

impl<G: AgentGateway + 'static> ConsensusEngine<G> {
    pub fn new(gateway: Arc<G>, config: ConsensusConfig) -> Self {
        Self {
            gateway,
            review_policy: Arc::new(SentimentScore),
            config,
        }
    }

    pub fn with_review_policy(mut self, policy: Arc<dyn ReviewScorePolicy>) -> Self {
        self.review_policy = policy;
        self
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Generate one candidate per configured approach, concurrently.
    ///
    /// Individual call failures are logged and dropped; the batch
    /// continues. If the shared deadline elapses first, the whole batch is
    /// discarded and an empty list is returned. Within a completed batch,
    /// candidates are ordered by submission (approach) order.
    pub async fn generate_candidates(&self, task: &Task, generator_role: AgentRole) -> Vec<Candidate> {
        info!(
            "Generating {} candidates for task {} with {}",
            self.config.approaches.len(),
            task.id,
            generator_role
        );

        let mut join_set = JoinSet::new();

        for (index, approach) in self.config.approaches.iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let request = GenerationRequest::new(PromptTemplate::generation(task, approach));
            let role = generator_role;

            join_set.spawn(async move {
                let result = gateway.generate(role, request).await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<Candidate>> = vec![None; self.config.approaches.len()];

        let collected = timeout(self.config.stage_timeout, async {
            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok((index, Ok(completion))) => {
                        let approach = &self.config.approaches[index];
                        debug!("Candidate for approach {} ready", approach);
                        slots[index] = Some(
                            Candidate::new(
                                task.id.clone(),
                                generator_role,
                                completion.content,
                                approach.clone(),
                            )
                            .with_metadata("model", completion.model.clone()),
                        );
                    }
                    Ok((index, Err(e))) => {
                        warn!(
                            "Generation for approach {} failed: {}",
                            self.config.approaches[index], e
                        );
                    }
                    Err(e) => {
                        warn!("Task join error: {}", e);
                    }
                }
            }
        })
        .await;

        if collected.is_err() {
            // Deadline elapsed: drop the whole batch, no partial salvage
            warn!(
                "Candidate generation timed out after {:?}; discarding batch",
                self.config.stage_timeout
            );
            return Vec::new();
        }

        let candidates: Vec<Candidate> = slots.into_iter().flatten().collect();
        info!(
            "Generated {}/{} valid candidates",
            candidates.len(),
            self.config.approaches.len()
        );
        candidates
    }

    /// Cross-verify every candidate with both configured verifier roles,
    /// concurrently, under the same all-or-nothing deadline policy as
    /// generation. Failed verifications are dropped, never fatal.
    pub async fn cross_verify(&self, candidates: &[Candidate], task: &Task) -> Vec<VerificationResult> {
        info!("Cross-verifying {} candidates", candidates.len());

        let mut join_set = JoinSet::new();
        let mut submissions = Vec::new();

        for candidate in candidates {
            for verifier in self.config.verifier_roles {
                let index = submissions.len();
                submissions.push((candidate.id.clone(), verifier));

                let gateway = Arc::clone(&self.gateway);
                let request = GenerationRequest::new(PromptTemplate::verification(task, candidate));

                join_set.spawn(async move {
                    let result = gateway.generate(verifier, request).await;
                    (index, result)
                });
            }
        }

        let mut slots: Vec<Option<VerificationResult>> = vec![None; submissions.len()];

        let collected = timeout(self.config.stage_timeout, async {
            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok((index, Ok(completion))) => {
                        let (candidate_id, verifier) = &submissions[index];
                        slots[index] = Some(VerificationResult::new(
                            candidate_id.clone(),
                            *verifier,
                            self.review_policy.passed(&completion.content),
                            self.review_policy.score(&completion.content),
                            completion.content,
                        ));
                    }
                    Ok((index, Err(e))) => {
                        let (candidate_id, verifier) = &submissions[index];
                        warn!(
                            "Verification of {} by {} failed: {}",
                            candidate_id, verifier, e
                        );
                    }
                    Err(e) => {
                        warn!("Task join error: {}", e);
                    }
                }
            }
        })
        .await;

        if collected.is_err() {
            warn!(
                "Verification timed out after {:?}; discarding batch",
                self.config.stage_timeout
            );
            return Vec::new();
        }

        let verifications: Vec<VerificationResult> = slots.into_iter().flatten().collect();
        info!("Completed {} verifications", verifications.len());
        verifications
    }

    /// Run the single judged vote and select a winner.
    ///
    /// Candidates with at least one passing verification survive to the
    /// vote; if none pass, the full original candidate set is voted on
    /// instead - the vote never fails solely because verification went
    /// badly. Exactly one judge call is issued; one vote per surviving
    /// candidate is synthesized from its response.
    pub async fn consensus_vote(
        &self,
        candidates: &[Candidate],
        verifications: &[VerificationResult],
        task: &Task,
    ) -> Result<ConsensusResult, ConsensusError> {
        if candidates.is_empty() {
            return Err(ConsensusError::NoCandidates);
        }

        info!("Running consensus vote over {} candidates", candidates.len());

        let surviving = self.passing_candidates(candidates, verifications);
        let surviving: &[Candidate] = if surviving.is_empty() {
            warn!("No candidates passed verification; voting over the full set");
            candidates
        } else {
            &surviving
        };

        let prompt = PromptTemplate::judgment(task, surviving, verifications);
        let completion = self
            .gateway
            .generate(AgentRole::ConsensusJudge, GenerationRequest::new(prompt))
            .await?;

        let votes: Vec<Vote> = surviving
            .iter()
            .map(|candidate| {
                let score = self.review_policy.score(&completion.content);
                Vote::new(
                    candidate.id.clone(),
                    AgentRole::ConsensusJudge,
                    score,
                    completion.content.clone(),
                )
                .with_criterion("correctness", score)
                .with_criterion("performance", score * 0.9)
                .with_criterion("readability", score * 0.95)
                .with_criterion("maintainability", score * 0.85)
            })
            .collect();

        // Surviving is non-empty, so at least one vote exists
        let winner = select_winner(surviving, &votes).ok_or(ConsensusError::NoCandidates)?;
        let winner_id = winner.id.clone();

        let result = ConsensusResult::decide(task.id.clone(), candidates, winner_id, votes)?;
        info!(
            "Consensus reached: winner {} with score {:.2}",
            result.winner_candidate_id, result.winning_score
        );
        Ok(result)
    }

    fn passing_candidates(
        &self,
        candidates: &[Candidate],
        verifications: &[VerificationResult],
    ) -> Vec<Candidate> {
        candidates
            .iter()
            .filter(|c| {
                verifications
                    .iter()
                    .any(|v| v.passed && v.candidate_id == c.id)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_gateway::{Completion, TokenUsage};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One scripted gateway behavior, consumed per call in pop order
    enum Script {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct ScriptedGateway {
        scripts: Mutex<VecDeque<Script>>,
    }

    impl ScriptedGateway {
        fn new(scripts: Vec<Script>) -> Arc<Self> {
            Arc::new(Self {
                scripts: Mutex::new(scripts.into()),
            })
        }
    }

    #[async_trait]
    impl AgentGateway for ScriptedGateway {
        async fn generate(
            &self,
            _role: AgentRole,
            _request: GenerationRequest,
        ) -> Result<Completion, GatewayError> {
            let script = self.scripts.lock().unwrap().pop_front();
            match script {
                Some(Script::Reply(content)) => Ok(Completion {
                    content: content.to_string(),
                    model: "scripted".to_string(),
                    usage: TokenUsage::default(),
                }),
                Some(Script::Fail) => Err(GatewayError::RequestFailed("scripted failure".into())),
                Some(Script::Hang) | None => {
                    tokio::time::sleep(Duration::from_secs(86_400)).await;
                    Err(GatewayError::Timeout)
                }
            }
        }
    }

    fn task() -> Task {
        Task::new("t1", "Auth", "Implement JWT authentication")
    }

    fn engine_with(scripts: Vec<Script>) -> ConsensusEngine<ScriptedGateway> {
        let config = ConsensusConfig {
            approaches: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            stage_timeout: Duration::from_secs(5),
            ..ConsensusConfig::default()
        };
        ConsensusEngine::new(ScriptedGateway::new(scripts), config)
    }

    #[tokio::test]
    async fn test_generate_all_succeed() {
        let engine = engine_with(vec![
            Script::Reply("fn a() {}"),
            Script::Reply("fn b() {}"),
            Script::Reply("fn c() {}"),
        ]);

        let candidates = engine
            .generate_candidates(&task(), AgentRole::BackendWorker)
            .await;

        assert_eq!(candidates.len(), 3);
        // Submission order is preserved in the completed batch
        let approaches: Vec<&str> = candidates.iter().map(|c| c.approach.as_str()).collect();
        assert_eq!(approaches, vec!["a", "b", "c"]);
        // Ids are unique
        assert_ne!(candidates[0].id, candidates[1].id);
        assert_ne!(candidates[1].id, candidates[2].id);
    }

    #[tokio::test]
    async fn test_generate_drops_individual_failures() {
        let engine = engine_with(vec![
            Script::Reply("fn a() {}"),
            Script::Fail,
            Script::Reply("fn c() {}"),
        ]);

        let candidates = engine
            .generate_candidates(&task(), AgentRole::BackendWorker)
            .await;

        // One dropped, batch continues, no error escapes
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_deadline_discards_whole_batch() {
        let engine = engine_with(vec![Script::Hang, Script::Hang, Script::Hang]);

        let candidates = engine
            .generate_candidates(&task(), AgentRole::BackendWorker)
            .await;

        assert!(candidates.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_deadline_never_salvages_partials() {
        // Two calls complete, the third outlives the deadline: the whole
        // batch is still discarded.
        let engine = engine_with(vec![
            Script::Reply("fn a() {}"),
            Script::Reply("fn b() {}"),
            Script::Hang,
        ]);

        let candidates = engine
            .generate_candidates(&task(), AgentRole::BackendWorker)
            .await;

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_cross_verify_two_verifiers_per_candidate() {
        let engine = engine_with(vec![
            Script::Reply("PASS good work"),
            Script::Reply("PASS excellent"),
            Script::Reply("FAIL poor structure"),
            Script::Reply("PASS acceptable"),
        ]);

        let candidates = vec![
            Candidate::new("t1".into(), AgentRole::BackendWorker, "a", "conservative"),
            Candidate::new("t1".into(), AgentRole::BackendWorker, "b", "aggressive"),
        ];

        let verifications = engine.cross_verify(&candidates, &task()).await;
        assert_eq!(verifications.len(), 4);

        let for_first: Vec<_> = verifications
            .iter()
            .filter(|v| v.candidate_id == candidates[0].id)
            .collect();
        assert_eq!(for_first.len(), 2);
        assert_eq!(for_first[0].verifier_role, AgentRole::QaSentinel);
        assert_eq!(for_first[1].verifier_role, AgentRole::Architect);
    }

    #[tokio::test]
    async fn test_vote_falls_back_to_full_set_when_none_pass() {
        // Judge reply only; no verification passed
        let engine = engine_with(vec![Script::Reply("All candidates are acceptable")]);

        let candidates = vec![
            Candidate::new("t1".into(), AgentRole::BackendWorker, "a", "conservative"),
            Candidate::new("t1".into(), AgentRole::BackendWorker, "b", "aggressive"),
        ];
        let failing = vec![
            VerificationResult::new(&candidates[0].id, AgentRole::QaSentinel, false, 0.2, "FAIL"),
            VerificationResult::new(&candidates[1].id, AgentRole::QaSentinel, false, 0.1, "FAIL"),
        ];

        let result = engine
            .consensus_vote(&candidates, &failing, &task())
            .await
            .unwrap();

        // Every original candidate got a vote despite failing verification
        assert_eq!(result.total_votes, 2);
        assert_eq!(result.total_candidates, 2);
        // Identical scores: first candidate wins the tie
        assert_eq!(result.winner_candidate_id, candidates[0].id);
    }

    #[tokio::test]
    async fn test_vote_restricts_to_passing_candidates() {
        let engine = engine_with(vec![Script::Reply("good solutions overall")]);

        let candidates = vec![
            Candidate::new("t1".into(), AgentRole::BackendWorker, "a", "conservative"),
            Candidate::new("t1".into(), AgentRole::BackendWorker, "b", "aggressive"),
        ];
        let verifications = vec![
            VerificationResult::new(&candidates[0].id, AgentRole::QaSentinel, false, 0.2, "FAIL"),
            VerificationResult::new(&candidates[1].id, AgentRole::QaSentinel, true, 0.9, "PASS"),
        ];

        let result = engine
            .consensus_vote(&candidates, &verifications, &task())
            .await
            .unwrap();

        assert_eq!(result.winner_candidate_id, candidates[1].id);
        // Only the surviving candidate is voted on; batch size still reports 2
        assert_eq!(result.total_votes, 1);
        assert_eq!(result.total_candidates, 2);
    }

    #[tokio::test]
    async fn test_vote_on_empty_batch_is_no_candidates() {
        let engine = engine_with(vec![]);
        let err = engine.consensus_vote(&[], &[], &task()).await.unwrap_err();
        assert!(matches!(err, ConsensusError::NoCandidates));
    }

    #[tokio::test]
    async fn test_vote_synthesizes_criteria_scores() {
        let engine = engine_with(vec![Script::Reply("excellent work")]);

        let candidates = vec![Candidate::new(
            "t1".into(),
            AgentRole::BackendWorker,
            "a",
            "conservative",
        )];
        let verifications = vec![VerificationResult::new(
            &candidates[0].id,
            AgentRole::QaSentinel,
            true,
            0.9,
            "PASS",
        )];

        let result = engine
            .consensus_vote(&candidates, &verifications, &task())
            .await
            .unwrap();

        let vote = &result.all_votes[0];
        assert_eq!(vote.score, 0.9);
        assert!((vote.criteria["performance"] - 0.81).abs() < 1e-9);
        assert!((vote.criteria["readability"] - 0.855).abs() < 1e-9);
    }
}
