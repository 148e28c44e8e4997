//! Episodes - recorded event traces of one dispatch cycle.
//!
//! An episode is created when a task enters the pipeline, appended to at
//! each stage, and frozen at dispatch end. Frozen episodes are persisted to
//! the knowledge store for later recall and failure analysis.

use crate::core::AgentRole;
use crate::task::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeStatus {
    Active,
    Success,
    Failure,
}

/// One recorded event inside an episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeEvent {
    pub timestamp: DateTime<Utc>,
    /// Event type (context_gathered, candidates_generated, ...)
    pub event_type: String,
    /// Role that performed the action
    pub agent: AgentRole,
    pub data: serde_json::Value,
}

/// Ordered event trace of one task's full dispatch cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub task_id: TaskId,
    pub task_title: String,
    pub status: EpisodeStatus,
    pub events: Vec<EpisodeEvent>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Episode {
    pub fn start(task_id: TaskId, task_title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id,
            task_title: task_title.into(),
            status: EpisodeStatus::Active,
            events: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Append an event. Events on a frozen episode are ignored.
    pub fn record(&mut self, event_type: impl Into<String>, agent: AgentRole, data: serde_json::Value) {
        if self.status != EpisodeStatus::Active {
            return;
        }
        self.events.push(EpisodeEvent {
            timestamp: Utc::now(),
            event_type: event_type.into(),
            agent,
            data,
        });
    }

    /// Freeze the episode with its final status.
    pub fn end(&mut self, success: bool) {
        if self.status != EpisodeStatus::Active {
            return;
        }
        self.status = if success {
            EpisodeStatus::Success
        } else {
            EpisodeStatus::Failure
        };
        self.ended_at = Some(Utc::now());
    }

    pub fn duration_secs(&self) -> f64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Summary text suitable for embedding in the knowledge store
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Task: {}\nDuration: {:.2}s\nStatus: {}\nEvents: {}\n",
            self.task_title,
            self.duration_secs(),
            match self.status {
                EpisodeStatus::Active => "active",
                EpisodeStatus::Success => "success",
                EpisodeStatus::Failure => "failure",
            },
            self.events.len()
        );

        let mut breakdown: Vec<(String, usize)> = Vec::new();
        for event in &self.events {
            match breakdown.iter_mut().find(|(t, _)| *t == event.event_type) {
                Some((_, count)) => *count += 1,
                None => breakdown.push((event.event_type.clone(), 1)),
            }
        }

        summary.push_str("\nEvent breakdown:\n");
        for (event_type, count) in breakdown {
            summary.push_str(&format!("- {event_type}: {count}\n"));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_records_in_order() {
        let mut episode = Episode::start(TaskId::from("t1"), "Auth");
        episode.record("context_gathered", AgentRole::Architect, serde_json::json!({"patterns": 2}));
        episode.record("candidates_generated", AgentRole::BackendWorker, serde_json::json!({"count": 3}));

        assert_eq!(episode.events.len(), 2);
        assert_eq!(episode.events[0].event_type, "context_gathered");
        assert_eq!(episode.events[1].event_type, "candidates_generated");
    }

    #[test]
    fn test_frozen_episode_ignores_events() {
        let mut episode = Episode::start(TaskId::from("t1"), "Auth");
        episode.end(true);
        assert_eq!(episode.status, EpisodeStatus::Success);
        assert!(episode.ended_at.is_some());

        episode.record("late", AgentRole::Architect, serde_json::Value::Null);
        assert!(episode.events.is_empty());

        // A second end does not flip the status
        episode.end(false);
        assert_eq!(episode.status, EpisodeStatus::Success);
    }

    #[test]
    fn test_summary_breaks_down_events() {
        let mut episode = Episode::start(TaskId::from("t1"), "Auth");
        episode.record("generation", AgentRole::BackendWorker, serde_json::Value::Null);
        episode.record("generation", AgentRole::BackendWorker, serde_json::Value::Null);
        episode.record("verification", AgentRole::QaSentinel, serde_json::Value::Null);
        episode.end(false);

        let summary = episode.summary();
        assert!(summary.contains("Status: failure"));
        assert!(summary.contains("- generation: 2"));
        assert!(summary.contains("- verification: 1"));
    }
}
