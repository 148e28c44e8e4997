//! Append-only JSONL knowledge store.
//!
//! A stand-in adapter at the knowledge-store port: one JSONL file per
//! collection, recall by naive token-overlap scoring over the log. A real
//! vector store (Chroma, Qdrant) would implement the same port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hydra_application::ports::knowledge_store::{KnowledgeEntry, KnowledgeError, KnowledgeStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// The fixed collection set; any other name is rejected
pub const COLLECTIONS: [&str; 4] = ["code_patterns", "solutions", "errors", "experiences"];

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    id: String,
    content: String,
    metadata: HashMap<String, serde_json::Value>,
    stored_at: DateTime<Utc>,
}

/// JSONL-file knowledge store scoped to one directory.
pub struct JsonlKnowledgeStore {
    dir: PathBuf,
}

impl JsonlKnowledgeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.jsonl"))
    }

    fn validate_collection(collection: &str) -> Result<(), KnowledgeError> {
        if COLLECTIONS.contains(&collection) {
            Ok(())
        } else {
            Err(KnowledgeError::UnknownCollection(collection.to_string()))
        }
    }

    /// Token-overlap relevance: how many distinct query words appear in
    /// the record content. Zero-overlap records never match.
    fn relevance(query: &str, content: &str) -> usize {
        let haystack = content.to_lowercase();
        let mut words: Vec<&str> = query.split_whitespace().collect();
        words.sort_unstable();
        words.dedup();
        words
            .iter()
            .filter(|w| haystack.contains(&w.to_lowercase()))
            .count()
    }

    fn matches_filter(
        record: &StoredRecord,
        filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> bool {
        let Some(filter) = filter else {
            return true;
        };
        filter
            .iter()
            .all(|(key, expected)| record.metadata.get(key) == Some(expected))
    }
}

#[async_trait]
impl KnowledgeStore for JsonlKnowledgeStore {
    async fn recall(
        &self,
        query: &str,
        collection: &str,
        limit: usize,
        filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        Self::validate_collection(collection)?;

        let path = self.collection_path(collection);
        let body = match fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(KnowledgeError::RecallFailed(e.to_string())),
        };

        let mut scored: Vec<(usize, KnowledgeEntry)> = Vec::new();
        for line in body.lines().filter(|l| !l.trim().is_empty()) {
            let record: StoredRecord = match serde_json::from_str(line) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping corrupt record in {}: {}", collection, e);
                    continue;
                }
            };
            if !Self::matches_filter(&record, filter) {
                continue;
            }
            let score = Self::relevance(query, &record.content);
            if score > 0 {
                scored.push((
                    score,
                    KnowledgeEntry {
                        id: record.id,
                        content: record.content,
                        metadata: record.metadata,
                    },
                ));
            }
        }

        // Highest overlap first; stable sort keeps older records ahead on ties
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        debug!(
            "Recalled {} of {} matching records from {}",
            limit.min(scored.len()),
            scored.len(),
            collection
        );
        Ok(scored.into_iter().take(limit).map(|(_, e)| e).collect())
    }

    async fn store(
        &self,
        content: &str,
        collection: &str,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<String, KnowledgeError> {
        Self::validate_collection(collection)?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| KnowledgeError::StoreFailed(e.to_string()))?;

        let record = StoredRecord {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            metadata,
            stored_at: Utc::now(),
        };
        let mut line =
            serde_json::to_string(&record).map_err(|e| KnowledgeError::StoreFailed(e.to_string()))?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.collection_path(collection))
            .await
            .map_err(|e| KnowledgeError::StoreFailed(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| KnowledgeError::StoreFailed(e.to_string()))?;

        debug!("Stored record {} in {}", record.id, collection);
        Ok(record.id)
    }
}
