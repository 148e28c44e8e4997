//! Filesystem checkpoint persistence for crash recovery.
//!
//! One JSON file per snapshot plus a `latest` pointer file. The snapshot is
//! written in full before the pointer moves, so a crash mid-write leaves the
//! pointer on the previous complete checkpoint.

use hydra_domain::{CheckpointSnapshot, Task};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

/// Checkpoints kept on disk before pruning
pub const DEFAULT_RETENTION: usize = 10;

const LATEST_FILE: &str = "latest";

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("checkpoint io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Summary row returned by [`CheckpointManager::list`]
#[derive(Debug, Clone)]
pub struct CheckpointInfo {
    pub id: String,
    pub created_at: String,
    pub task_count: usize,
    pub file_size: u64,
}

/// State restored from a snapshot
#[derive(Debug)]
pub struct RestoredState {
    pub tasks: Vec<Task>,
    pub global_state: serde_json::Value,
    pub checkpoint_id: String,
}

/// Manages checkpoint files under a single directory.
pub struct CheckpointManager {
    dir: PathBuf,
    retention: usize,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            retention: DEFAULT_RETENTION,
        }
    }

    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn snapshot_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("checkpoint_{id}.json"))
    }

    fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FILE)
    }

    /// Persist a snapshot and return its id.
    ///
    /// Two snapshots created within the same second share an id; the later
    /// write replaces the earlier file.
    pub async fn create(&self, snapshot: &CheckpointSnapshot) -> Result<String, CheckpointError> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.snapshot_path(&snapshot.id);
        let body = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&path, body).await?;

        // Pointer moves only after the snapshot is fully on disk
        fs::write(self.latest_path(), &snapshot.id).await?;
        info!("Created checkpoint {}", snapshot.id);

        self.prune().await;
        Ok(snapshot.id.clone())
    }

    /// Load a snapshot by id, or the latest one when `id` is `None`.
    ///
    /// A missing pointer or snapshot file is `Ok(None)`, not an error.
    pub async fn load(&self, id: Option<&str>) -> Result<Option<CheckpointSnapshot>, CheckpointError> {
        let id = match id {
            Some(id) => id.to_string(),
            None => match fs::read_to_string(self.latest_path()).await {
                Ok(contents) => contents.trim().to_string(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("No checkpoints found in {}", self.dir.display());
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            },
        };

        let path = self.snapshot_path(&id);
        let body = match fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Checkpoint {} not found", id);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot = serde_json::from_slice(&body)?;
        info!("Loaded checkpoint {}", id);
        Ok(Some(snapshot))
    }

    /// List snapshots on disk, oldest first. Corrupt files are skipped
    /// with a warning so one bad snapshot cannot hide the rest.
    pub async fn list(&self) -> Result<Vec<CheckpointInfo>, CheckpointError> {
        let mut paths = match self.snapshot_paths().await {
            Ok(paths) => paths,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        paths.sort();

        let mut infos = Vec::with_capacity(paths.len());
        for path in paths {
            let body = match fs::read(&path).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to read checkpoint {}: {}", path.display(), e);
                    continue;
                }
            };
            let snapshot: CheckpointSnapshot = match serde_json::from_slice(&body) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("Skipping corrupt checkpoint {}: {}", path.display(), e);
                    continue;
                }
            };
            infos.push(CheckpointInfo {
                id: snapshot.id,
                created_at: snapshot.created_at.to_rfc3339(),
                task_count: snapshot.tasks.len(),
                file_size: body.len() as u64,
            });
        }
        Ok(infos)
    }

    /// Load a snapshot and unpack it for re-hydration.
    pub async fn restore(&self, id: Option<&str>) -> Result<Option<RestoredState>, CheckpointError> {
        let Some(snapshot) = self.load(id).await? else {
            return Ok(None);
        };

        info!(
            "Restored {} tasks from checkpoint {}",
            snapshot.tasks.len(),
            snapshot.id
        );
        Ok(Some(RestoredState {
            tasks: snapshot.tasks,
            global_state: snapshot.global_state,
            checkpoint_id: snapshot.id,
        }))
    }

    /// Delete snapshots beyond the retention count, oldest (by file
    /// modification time) first. Prune failures are logged, never raised.
    async fn prune(&self) {
        let paths = match self.snapshot_paths().await {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Checkpoint prune scan failed: {}", e);
                return;
            }
        };

        let mut with_mtime: Vec<(PathBuf, SystemTime)> = Vec::with_capacity(paths.len());
        for path in paths {
            match fs::metadata(&path).await.and_then(|m| m.modified()) {
                Ok(mtime) => with_mtime.push((path, mtime)),
                Err(e) => warn!("Could not stat checkpoint {}: {}", path.display(), e),
            }
        }

        // Newest first; everything past the retention count goes
        with_mtime.sort_by(|a, b| b.1.cmp(&a.1));
        for (path, _) in with_mtime.into_iter().skip(self.retention) {
            match fs::remove_file(&path).await {
                Ok(()) => debug!("Removed old checkpoint {}", path.display()),
                Err(e) => warn!("Failed to remove old checkpoint {}: {}", path.display(), e),
            }
        }
    }

    async fn snapshot_paths(&self) -> Result<Vec<PathBuf>, std::io::Error> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("checkpoint_") && name.ends_with(".json") {
                paths.push(entry.path());
            }
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydra_domain::Task;
    use std::collections::HashMap;

    fn snapshot_with_id(id: &str, tasks: Vec<Task>) -> CheckpointSnapshot {
        let mut snapshot =
            CheckpointSnapshot::new(tasks, serde_json::json!({"phase": "build"}), HashMap::new());
        snapshot.id = id.to_string();
        snapshot
    }

    #[tokio::test]
    async fn test_create_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path());

        let task = Task::new("t1", "Auth", "Implement login");
        let snapshot = snapshot_with_id("20260101_000000", vec![task]);
        manager.create(&snapshot).await.unwrap();

        let loaded = manager.load(None).await.unwrap().unwrap();
        assert_eq!(loaded.id, "20260101_000000");
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.tasks[0].title, "Auth");
        assert_eq!(loaded.global_state["phase"], "build");
    }

    #[tokio::test]
    async fn test_load_missing_is_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path());

        assert!(manager.load(None).await.unwrap().is_none());
        assert!(manager.load(Some("20990101_000000")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_pointer_tracks_newest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path());

        manager
            .create(&snapshot_with_id("20260101_000000", vec![]))
            .await
            .unwrap();
        manager
            .create(&snapshot_with_id("20260101_000001", vec![]))
            .await
            .unwrap();

        let latest = manager.load(None).await.unwrap().unwrap();
        assert_eq!(latest.id, "20260101_000001");

        // The older snapshot stays addressable by id
        let older = manager.load(Some("20260101_000000")).await.unwrap();
        assert!(older.is_some());
    }

    #[tokio::test]
    async fn test_retention_prunes_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path()).with_retention(2);

        for i in 0..4 {
            manager
                .create(&snapshot_with_id(&format!("20260101_00000{i}"), vec![]))
                .await
                .unwrap();
            // Distinct mtimes for deterministic prune ordering
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        let infos = manager.list().await.unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].id, "20260101_000002");
        assert_eq!(infos[1].id, "20260101_000003");
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path());

        manager
            .create(&snapshot_with_id("20260101_000000", vec![]))
            .await
            .unwrap();
        std::fs::write(dir.path().join("checkpoint_garbage.json"), "{not json").unwrap();

        let infos = manager.list().await.unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, "20260101_000000");
    }

    #[tokio::test]
    async fn test_restore_unpacks_tasks_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path());

        let snapshot = snapshot_with_id(
            "20260101_000000",
            vec![Task::new("t1", "Auth", "desc"), Task::new("t2", "Search", "desc")],
        );
        manager.create(&snapshot).await.unwrap();

        let restored = manager.restore(None).await.unwrap().unwrap();
        assert_eq!(restored.tasks.len(), 2);
        assert_eq!(restored.checkpoint_id, "20260101_000000");
        assert_eq!(restored.global_state["phase"], "build");
    }
}
