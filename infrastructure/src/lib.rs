//! Infrastructure layer for hydra-consensus
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer, plus checkpoint and bus persistence and
//! configuration file loading.

pub mod bus;
pub mod checkpoint;
pub mod config;
pub mod gateway;
pub mod knowledge;
pub mod sandbox;

// Re-export commonly used types
pub use bus::{BusError, StateBus};
pub use checkpoint::{CheckpointError, CheckpointInfo, CheckpointManager, RestoredState};
pub use config::{ConfigLoader, FileConfig};
pub use gateway::{AgentProfile, LlamaGateway, ProfileRegistry};
pub use knowledge::JsonlKnowledgeStore;
pub use sandbox::ProcessSandbox;
