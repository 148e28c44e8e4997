//! Port definitions - interfaces the application layer consumes.

pub mod agent_gateway;
pub mod knowledge_store;
pub mod sandbox;

pub use agent_gateway::{AgentGateway, Completion, GatewayError, GenerationRequest, TokenUsage};
pub use knowledge_store::{KnowledgeEntry, KnowledgeError, KnowledgeStore};
pub use sandbox::{ExecutionReport, Sandbox, SandboxError};
