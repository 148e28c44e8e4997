//! Messages exchanged between agent roles over the state bus.

use crate::core::AgentRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A message on the state bus.
///
/// A missing recipient means broadcast. Messages are immutable and durably
/// logged one file per message by the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: AgentRole,
    /// Target role; `None` broadcasts to every subscriber
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<AgentRole>,
    pub content: String,
    /// Message type (chat, command, response)
    pub message_type: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a directed message to a single role
    pub fn direct(sender: AgentRole, recipient: AgentRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            recipient: Some(recipient),
            content: content.into(),
            message_type: "chat".to_string(),
            metadata: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create a broadcast message delivered to every subscriber
    pub fn broadcast(sender: AgentRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            recipient: None,
            content: content.into(),
            message_type: "chat".to_string(),
            metadata: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = message_type.into();
        self
    }

    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_broadcast(&self) -> bool {
        self.recipient.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_vs_broadcast() {
        let direct = Message::direct(AgentRole::Architect, AgentRole::QaSentinel, "verify this");
        assert!(!direct.is_broadcast());
        assert_eq!(direct.recipient, Some(AgentRole::QaSentinel));

        let broadcast = Message::broadcast(AgentRole::Architect, "plan ready");
        assert!(broadcast.is_broadcast());
    }

    #[test]
    fn test_broadcast_serializes_without_recipient() {
        let broadcast = Message::broadcast(AgentRole::Architect, "hi");
        let json = serde_json::to_value(&broadcast).unwrap();
        assert!(json.get("recipient").is_none());
    }
}
