//! Storage directory configuration from TOML
//!
//! Covers the `[checkpoint]`, `[bus]` and `[knowledge]` sections. All
//! paths default under a single `.hydra/` state directory.

use serde::{Deserialize, Serialize};

/// Checkpoint persistence settings (`[checkpoint]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCheckpointConfig {
    pub dir: String,
    /// Snapshots kept on disk before pruning
    pub retention: usize,
}

impl Default for FileCheckpointConfig {
    fn default() -> Self {
        Self {
            dir: ".hydra/checkpoints".to_string(),
            retention: crate::checkpoint::DEFAULT_RETENTION,
        }
    }
}

/// State bus settings (`[bus]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBusConfig {
    pub dir: String,
    /// Size of the in-memory recent-message window
    pub recent_window: usize,
}

impl Default for FileBusConfig {
    fn default() -> Self {
        Self {
            dir: ".hydra/bus".to_string(),
            recent_window: crate::bus::DEFAULT_RECENT_WINDOW,
        }
    }
}

/// Knowledge store settings (`[knowledge]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileKnowledgeConfig {
    pub dir: String,
}

impl Default for FileKnowledgeConfig {
    fn default() -> Self {
        Self {
            dir: ".hydra/knowledge".to_string(),
        }
    }
}
