//! Checkpoint snapshot record.

use crate::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Schema version written into every snapshot; bumped on layout changes
pub const CHECKPOINT_SCHEMA_VERSION: u32 = 1;

/// A durable snapshot of task and orchestrator-global state.
///
/// The id is derived from a second-resolution UTC timestamp. Two snapshots
/// created within the same second share an id and the later write wins;
/// that collision is a documented property of time-derived identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointSnapshot {
    pub id: String,
    pub schema_version: u32,
    pub tasks: Vec<Task>,
    /// Opaque orchestrator-global state
    pub global_state: serde_json::Value,
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl CheckpointSnapshot {
    pub fn new(
        tasks: Vec<Task>,
        global_state: serde_json::Value,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            id: Self::id_for(created_at),
            schema_version: CHECKPOINT_SCHEMA_VERSION,
            tasks,
            global_state,
            metadata,
            created_at,
        }
    }

    /// Timestamp-derived checkpoint id, `YYYYMMDD_HHMMSS`
    pub fn id_for(at: DateTime<Utc>) -> String {
        at.format("%Y%m%d_%H%M%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_id_is_second_resolution() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        assert_eq!(CheckpointSnapshot::id_for(at), "20260314_150926");
    }

    #[test]
    fn test_snapshot_carries_schema_version() {
        let snapshot = CheckpointSnapshot::new(vec![], serde_json::json!({}), HashMap::new());
        assert_eq!(snapshot.schema_version, CHECKPOINT_SCHEMA_VERSION);
        assert_eq!(snapshot.id, CheckpointSnapshot::id_for(snapshot.created_at));
    }
}
