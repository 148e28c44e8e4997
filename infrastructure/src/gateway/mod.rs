//! HTTP gateway to the per-role llama.cpp model servers.
//!
//! Speaks the OpenAI-compatible `/v1/chat/completions` endpoint that
//! llama.cpp exposes. Each role maps to its own server through a
//! [`ProfileRegistry`].

mod profile;

pub use profile::{AgentProfile, ProfileRegistry};

use async_trait::async_trait;
use hydra_application::ports::agent_gateway::{
    AgentGateway, Completion, GatewayError, GenerationRequest, TokenUsage,
};
use hydra_domain::AgentRole;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const DEFAULT_MAX_TOKENS: u32 = 2048;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Gateway adapter for llama.cpp model servers.
pub struct LlamaGateway {
    client: reqwest::Client,
    profiles: ProfileRegistry,
}

impl LlamaGateway {
    pub fn new(profiles: ProfileRegistry) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        info!("LlamaGateway initialized");
        Ok(Self { client, profiles })
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    fn map_error(e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout
        } else if e.is_connect() {
            GatewayError::ConnectionError(e.to_string())
        } else {
            GatewayError::RequestFailed(e.to_string())
        }
    }
}

#[async_trait]
impl AgentGateway for LlamaGateway {
    async fn generate(
        &self,
        role: AgentRole,
        request: GenerationRequest,
    ) -> Result<Completion, GatewayError> {
        let profile = self.profiles.get(role);
        let url = format!("{}/v1/chat/completions", profile.url);

        let body = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &profile.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature.unwrap_or(profile.temperature),
            top_p: profile.top_p,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            stream: false,
            stop: request.stop,
        };

        debug!("Calling {} at {}", role, url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_error)?;

        if !response.status().is_success() {
            let status = response.status();
            error!("HTTP {} from {} server", status, role);
            return Err(GatewayError::RequestFailed(format!(
                "{} returned HTTP {}",
                role, status
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(Self::map_error)?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::RequestFailed(format!("{} returned no choices", role)))?;

        info!(
            "{} generated {} words",
            role,
            choice.message.content.split_whitespace().count()
        );

        Ok(Completion {
            content: choice.message.content,
            model: profile.model.clone(),
            usage: parsed.usage,
        })
    }
}
