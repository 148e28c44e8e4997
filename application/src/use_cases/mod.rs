//! Application use cases over the domain and the ports.

pub mod dispatch_task;
pub mod episodes;
pub mod refine_candidate;
pub mod run_consensus;

pub use dispatch_task::{DispatchError, DispatchReport, TaskDispatcher};
pub use episodes::EpisodeRecorder;
pub use refine_candidate::{
    EvolutionaryRefiner, FitnessReport, FitnessWeights, RefinementOutcome, RefinerConfig,
};
pub use run_consensus::{ConsensusConfig, ConsensusEngine, ConsensusError};
