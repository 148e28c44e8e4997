//! Knowledge store port
//!
//! Interface to the vector-similarity store used for recalling patterns
//! and persisting learnings. Treated as best-effort by the dispatcher:
//! failures are logged and the pipeline proceeds with empty context.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from knowledge store operations
#[derive(Error, Debug)]
pub enum KnowledgeError {
    /// Raised synchronously for a collection name outside the known set
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Store failed: {0}")]
    StoreFailed(String),

    #[error("Recall failed: {0}")]
    RecallFailed(String),
}

/// One recalled record, ordered by relevance
#[derive(Debug, Clone)]
pub struct KnowledgeEntry {
    pub id: String,
    pub content: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Port to the knowledge store.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Recall up to `limit` entries relevant to `query`, optionally
    /// filtered on metadata equality.
    async fn recall(
        &self,
        query: &str,
        collection: &str,
        limit: usize,
        filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<KnowledgeEntry>, KnowledgeError>;

    /// Durably store `content`, returning the new entry id.
    async fn store(
        &self,
        content: &str,
        collection: &str,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<String, KnowledgeError>;
}
