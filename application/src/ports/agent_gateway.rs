//! Agent gateway port
//!
//! Defines how the application layer reaches the per-role model servers.
//! Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use hydra_domain::AgentRole;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during gateway operations.
///
/// These are transport-level failures: the consensus engine treats them as
/// a dropped candidate or verification, never as a fatal batch error.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("No model configured for role: {0}")]
    ModelNotAvailable(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Parameters for one generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub stop: Vec<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
            stop: Vec::new(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Token accounting reported by the model server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// Response from one generation call
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    /// Model identifier that produced the content
    pub model: String,
    pub usage: TokenUsage,
}

/// Gateway to the role-specialized model servers.
///
/// One port covers generation, verification, and judging: the role selects
/// the server and its system context.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    async fn generate(
        &self,
        role: AgentRole,
        request: GenerationRequest,
    ) -> Result<Completion, GatewayError>;
}
