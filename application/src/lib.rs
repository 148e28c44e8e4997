//! Application layer for hydra-consensus.
//!
//! Holds the use cases that orchestrate the domain (dispatch, consensus,
//! refinement, episode capture) and the ports the infrastructure layer
//! implements (agent gateway, knowledge store, sandbox).

pub mod ports;
pub mod use_cases;

pub use ports::{
    AgentGateway, Completion, ExecutionReport, GatewayError, GenerationRequest, KnowledgeEntry,
    KnowledgeError, KnowledgeStore, Sandbox, SandboxError, TokenUsage,
};
pub use use_cases::{
    ConsensusConfig, ConsensusEngine, ConsensusError, DispatchError, DispatchReport,
    EpisodeRecorder, EvolutionaryRefiner, FitnessWeights, RefinementOutcome, RefinerConfig,
    TaskDispatcher,
};
