//! Sandbox port
//!
//! Interface to the isolated code-execution service. Consumed only by the
//! refiner's fitness evaluation.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from sandbox operations
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Sandbox unavailable: {0}")]
    Unavailable(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Outcome of one sandboxed run
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub success: bool,
    pub output: String,
    pub exit_code: i32,
}

/// Port to the sandboxed execution service.
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Execute a piece of code, optionally running a test command instead
    /// of the default run command for the language.
    async fn execute_code(
        &self,
        code: &str,
        language: &str,
        test_command: Option<&str>,
    ) -> Result<ExecutionReport, SandboxError>;

    /// Run a test suite over a set of (filename, content) pairs.
    async fn run_tests(
        &self,
        files: &[(String, String)],
        language: &str,
    ) -> Result<ExecutionReport, SandboxError>;
}
