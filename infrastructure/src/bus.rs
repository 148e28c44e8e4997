//! Filesystem-backed message bus for agent communication.
//!
//! Every published message is durably logged as one JSON file under the bus
//! directory and then delivered in-process over tokio channels. The durable
//! log survives restarts; the in-memory recent window and subscriber map do
//! not.

use hydra_domain::{AgentRole, Message};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Messages kept in the in-memory recent window
pub const DEFAULT_RECENT_WINDOW: usize = 100;

#[derive(Error, Debug)]
pub enum BusError {
    #[error("bus io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bus serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Filesystem message bus with in-process delivery.
///
/// Subscriber map and recent window sit behind a `Mutex` since publishers
/// and subscribers run on a multi-threaded runtime.
pub struct StateBus {
    dir: PathBuf,
    subscribers: Mutex<HashMap<AgentRole, mpsc::UnboundedSender<Message>>>,
    recent: Mutex<VecDeque<Message>>,
    recent_window: usize,
}

impl StateBus {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            subscribers: Mutex::new(HashMap::new()),
            recent: Mutex::new(VecDeque::new()),
            recent_window: DEFAULT_RECENT_WINDOW,
        }
    }

    pub fn with_recent_window(mut self, recent_window: usize) -> Self {
        self.recent_window = recent_window;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Durably log a message, then deliver it.
    ///
    /// Directed messages go to the recipient's channel if one is
    /// registered; broadcasts go to every subscriber. Closed channels are
    /// dropped from the map on delivery failure.
    pub async fn publish(&self, message: Message) -> Result<(), BusError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.json", message.id));
        let body = serde_json::to_vec_pretty(&message)?;
        fs::write(&path, body).await?;

        {
            let mut recent = self.recent.lock().map_err(poisoned)?;
            recent.push_back(message.clone());
            while recent.len() > self.recent_window {
                recent.pop_front();
            }
        }

        let mut subscribers = self.subscribers.lock().map_err(poisoned)?;
        match message.recipient {
            Some(recipient) => {
                if let Some(sender) = subscribers.get(&recipient)
                    && sender.send(message.clone()).is_err()
                {
                    subscribers.remove(&recipient);
                }
            }
            None => {
                subscribers.retain(|_, sender| sender.send(message.clone()).is_ok());
            }
        }

        debug!("Published message {} from {}", message.id, message.sender);
        Ok(())
    }

    /// Register a subscriber for a role and return its receiving end.
    ///
    /// One channel per role: a second subscribe for the same role replaces
    /// the first, which stops receiving. Last subscriber wins.
    pub fn subscribe(&self, role: AgentRole) -> mpsc::UnboundedReceiver<Message> {
        let (sender, receiver) = mpsc::unbounded_channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            if subscribers.insert(role, sender).is_some() {
                warn!("Replacing existing {} subscriber", role);
            }
        }
        info!("Agent {} subscribed to state bus", role);
        receiver
    }

    /// Query the in-memory recent window, newest-last. Filters apply after
    /// the window cut, matching a tail-then-filter read.
    pub fn get_messages(
        &self,
        recipient: Option<AgentRole>,
        sender: Option<AgentRole>,
        limit: usize,
    ) -> Vec<Message> {
        let recent = match self.recent.lock() {
            Ok(recent) => recent,
            Err(_) => return Vec::new(),
        };

        let start = recent.len().saturating_sub(limit);
        recent
            .iter()
            .skip(start)
            .filter(|m| recipient.is_none_or(|r| m.recipient == Some(r)))
            .filter(|m| sender.is_none_or(|s| m.sender == s))
            .cloned()
            .collect()
    }

    /// Delete logged message files older than `max_age`, returning how
    /// many were removed.
    pub async fn clear_old(&self, max_age: Duration) -> Result<usize, BusError> {
        let cutoff = SystemTime::now() - max_age;
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut cleared = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let mtime = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(mtime) => mtime,
                Err(e) => {
                    warn!("Could not stat message {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            if mtime < cutoff {
                match fs::remove_file(entry.path()).await {
                    Ok(()) => cleared += 1,
                    Err(e) => warn!("Failed to remove message {}: {}", entry.path().display(), e),
                }
            }
        }

        if cleared > 0 {
            info!("Cleared {} old messages", cleared);
        }
        Ok(cleared)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> BusError {
    BusError::Io(std::io::Error::other("bus lock poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directed_message_reaches_only_recipient() {
        let dir = tempfile::tempdir().unwrap();
        let bus = StateBus::new(dir.path());

        let mut qa = bus.subscribe(AgentRole::QaSentinel);
        let mut backend = bus.subscribe(AgentRole::BackendWorker);

        bus.publish(Message::direct(
            AgentRole::Architect,
            AgentRole::QaSentinel,
            "verify this",
        ))
        .await
        .unwrap();

        let received = qa.recv().await.unwrap();
        assert_eq!(received.content, "verify this");
        assert!(backend.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let bus = StateBus::new(dir.path());

        let mut qa = bus.subscribe(AgentRole::QaSentinel);
        let mut backend = bus.subscribe(AgentRole::BackendWorker);

        bus.publish(Message::broadcast(AgentRole::Architect, "plan ready"))
            .await
            .unwrap();

        assert_eq!(qa.recv().await.unwrap().content, "plan ready");
        assert_eq!(backend.recv().await.unwrap().content, "plan ready");
    }

    #[tokio::test]
    async fn test_last_subscriber_wins() {
        let dir = tempfile::tempdir().unwrap();
        let bus = StateBus::new(dir.path());

        let mut first = bus.subscribe(AgentRole::QaSentinel);
        let mut second = bus.subscribe(AgentRole::QaSentinel);

        bus.publish(Message::direct(
            AgentRole::Architect,
            AgentRole::QaSentinel,
            "hello",
        ))
        .await
        .unwrap();

        assert_eq!(second.recv().await.unwrap().content, "hello");
        assert!(first.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_still_logs() {
        let dir = tempfile::tempdir().unwrap();
        let bus = StateBus::new(dir.path());

        let message = Message::broadcast(AgentRole::Architect, "unheard");
        let id = message.id.clone();
        bus.publish(message).await.unwrap();

        assert!(dir.path().join(format!("{id}.json")).exists());
        assert_eq!(bus.get_messages(None, None, 10).len(), 1);
    }

    #[tokio::test]
    async fn test_recent_window_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let bus = StateBus::new(dir.path()).with_recent_window(3);

        for i in 0..5 {
            bus.publish(Message::broadcast(AgentRole::Architect, format!("m{i}")))
                .await
                .unwrap();
        }

        let messages = bus.get_messages(None, None, 10);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "m2");
        assert_eq!(messages[2].content, "m4");
    }

    #[tokio::test]
    async fn test_get_messages_filters_by_sender() {
        let dir = tempfile::tempdir().unwrap();
        let bus = StateBus::new(dir.path());

        bus.publish(Message::broadcast(AgentRole::Architect, "a"))
            .await
            .unwrap();
        bus.publish(Message::broadcast(AgentRole::QaSentinel, "b"))
            .await
            .unwrap();

        let from_qa = bus.get_messages(None, Some(AgentRole::QaSentinel), 10);
        assert_eq!(from_qa.len(), 1);
        assert_eq!(from_qa[0].content, "b");
    }

    #[tokio::test]
    async fn test_clear_old_removes_only_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let bus = StateBus::new(dir.path());

        bus.publish(Message::broadcast(AgentRole::Architect, "fresh"))
            .await
            .unwrap();

        // Nothing is older than an hour yet
        assert_eq!(bus.clear_old(Duration::from_secs(3600)).await.unwrap(), 0);
        // Everything is older than zero seconds
        assert_eq!(bus.clear_old(Duration::ZERO).await.unwrap(), 1);
    }
}
