//! Configuration loading and raw TOML data types.

mod file_config;
mod loader;

pub use file_config::{
    FileAgentProfile, FileAgentsConfig, FileBusConfig, FileCheckpointConfig, FileConfig,
    FileConsensusConfig, FileFitnessWeights, FileKnowledgeConfig, FileRefinerConfig,
};
pub use loader::ConfigLoader;
