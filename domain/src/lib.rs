//! Domain layer for hydra-consensus
//!
//! This crate contains the core entities, value objects, and pure policies.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Consensus
//!
//! One dispatch cycle generates a batch of [`Candidate`]s in parallel,
//! cross-verifies them ([`VerificationResult`]), and runs a single judged
//! vote ([`Vote`]) that selects a winner ([`ConsensusResult`]). The
//! protocol is cooperative best-of-N selection - participants are assumed
//! non-adversarial.
//!
//! ## Routing
//!
//! A [`Router`] maps tasks to [`AgentRole`]s using a keyword baseline plus
//! a complexity score, with escalation to the Architect for the hardest
//! worker tasks.

pub mod checkpoint;
pub mod consensus;
pub mod core;
pub mod episode;
pub mod message;
pub mod prompt;
pub mod routing;
pub mod scoring;
pub mod task;
pub mod util;

// Re-export commonly used types
pub use checkpoint::{CHECKPOINT_SCHEMA_VERSION, CheckpointSnapshot};
pub use consensus::{Candidate, ConsensusResult, VerificationResult, Vote, select_winner};
pub use core::{AgentRole, DomainError};
pub use episode::{Episode, EpisodeEvent, EpisodeStatus};
pub use message::Message;
pub use prompt::PromptTemplate;
pub use routing::{ComplexityPolicy, KeywordComplexity, Router};
pub use scoring::{CodeQualityPolicy, HeuristicQuality, ReviewScorePolicy, SentimentScore};
pub use task::{Task, TaskId, TaskPriority, TaskStatus};
pub use util::truncate_str;
