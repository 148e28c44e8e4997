//! Core domain primitives: roles and errors.

pub mod error;
pub mod role;

pub use error::DomainError;
pub use role::AgentRole;
