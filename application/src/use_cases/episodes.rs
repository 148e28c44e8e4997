//! Episode recorder
//!
//! Tracks the active episode per dispatch cycle and persists frozen
//! episodes into the knowledge store's `experiences` collection for later
//! recall and failure analysis. Persistence is best-effort.

use crate::ports::knowledge_store::KnowledgeStore;
use hydra_domain::{AgentRole, Episode, EpisodeStatus, Task};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Collection episodes are persisted into
pub const EXPERIENCES_COLLECTION: &str = "experiences";

/// Records episodes across concurrently dispatched tasks.
pub struct EpisodeRecorder<K: KnowledgeStore> {
    store: Arc<K>,
    active: Mutex<HashMap<String, Episode>>,
}

impl<K: KnowledgeStore> EpisodeRecorder<K> {
    pub fn new(store: Arc<K>) -> Self {
        Self {
            store,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Open a new episode for a task, returning its id.
    pub fn start(&self, task: &Task) -> String {
        let episode = Episode::start(task.id.clone(), task.title.clone());
        let id = episode.id.clone();
        self.active.lock().unwrap().insert(id.clone(), episode);
        info!("Started episode {} for task {}", id, task.id);
        id
    }

    /// Append an event to an active episode. Unknown ids are logged and
    /// ignored.
    pub fn record(
        &self,
        episode_id: &str,
        event_type: &str,
        agent: AgentRole,
        data: serde_json::Value,
    ) {
        let mut active = self.active.lock().unwrap();
        match active.get_mut(episode_id) {
            Some(episode) => {
                episode.record(event_type, agent, data);
                debug!("Recorded {} event in episode {}", event_type, episode_id);
            }
            None => warn!("Episode {} not found", episode_id),
        }
    }

    /// Freeze an episode and persist its summary, best-effort.
    ///
    /// Returns the frozen episode, or `None` for an unknown id.
    pub async fn end(&self, episode_id: &str, success: bool) -> Option<Episode> {
        let episode = {
            let mut active = self.active.lock().unwrap();
            active.remove(episode_id)
        };

        let Some(mut episode) = episode else {
            warn!("Episode {} not found", episode_id);
            return None;
        };

        episode.end(success);

        let mut metadata: HashMap<String, serde_json::Value> = HashMap::new();
        metadata.insert("type".to_string(), "episode".into());
        metadata.insert("task_id".to_string(), episode.task_id.to_string().into());
        metadata.insert(
            "status".to_string(),
            match episode.status {
                EpisodeStatus::Success => "success",
                _ => "failure",
            }
            .into(),
        );
        metadata.insert("duration".to_string(), episode.duration_secs().into());
        metadata.insert("event_count".to_string(), episode.events.len().into());

        if let Err(e) = self
            .store
            .store(&episode.summary(), EXPERIENCES_COLLECTION, metadata)
            .await
        {
            warn!("Failed to persist episode {}: {}", episode_id, e);
        }

        info!(
            "Ended episode {} - {}",
            episode_id,
            if success { "success" } else { "failure" }
        );
        Some(episode)
    }

    /// Number of episodes currently open
    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap().len()
    }
}
