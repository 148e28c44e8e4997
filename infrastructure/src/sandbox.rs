//! Local-process execution sandbox.
//!
//! A stand-in adapter at the sandbox port: runs candidate code with the
//! host interpreter under a wall-clock limit. A containerized runner would
//! implement the same port with real isolation.

use async_trait::async_trait;
use hydra_application::ports::sandbox::{ExecutionReport, Sandbox, SandboxError};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Wall-clock limit on one execution
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs code in a scratch directory with the host toolchain.
pub struct ProcessSandbox {
    timeout: Duration,
}

impl Default for ProcessSandbox {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_EXECUTION_TIMEOUT,
        }
    }
}

impl ProcessSandbox {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn source_name(language: &str) -> Result<&'static str, SandboxError> {
        match language {
            "python" => Ok("main.py"),
            "javascript" => Ok("main.js"),
            "bash" => Ok("main.sh"),
            other => Err(SandboxError::Unavailable(format!(
                "unsupported language: {other}"
            ))),
        }
    }

    fn run_command(language: &str, file: &str) -> Vec<String> {
        match language {
            "javascript" => vec!["node".to_string(), file.to_string()],
            "bash" => vec!["bash".to_string(), file.to_string()],
            // source_name has already rejected anything else
            _ => vec!["python3".to_string(), file.to_string()],
        }
    }

    async fn scratch_dir(&self) -> Result<PathBuf, SandboxError> {
        let id = Uuid::new_v4().to_string();
        let dir = std::env::temp_dir().join(format!("hydra_sandbox_{}", &id[..8]));
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| SandboxError::ExecutionFailed(e.to_string()))?;
        Ok(dir)
    }

    async fn run(
        &self,
        dir: &PathBuf,
        command: &[String],
    ) -> Result<ExecutionReport, SandboxError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| SandboxError::ExecutionFailed("empty command".to_string()))?;

        debug!("Sandbox running {:?} in {}", command, dir.display());
        let child = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SandboxError::ExecutionFailed(e.to_string()))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(SandboxError::ExecutionFailed(e.to_string())),
            Err(_) => {
                warn!("Sandbox execution exceeded {:?}", self.timeout);
                return Ok(ExecutionReport {
                    success: false,
                    output: "execution timed out".to_string(),
                    exit_code: -1,
                });
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ExecutionReport {
            success: output.status.success(),
            output: text,
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    async fn cleanup(dir: PathBuf) {
        if let Err(e) = fs::remove_dir_all(&dir).await {
            warn!("Failed to clean sandbox dir {}: {}", dir.display(), e);
        }
    }
}

#[async_trait]
impl Sandbox for ProcessSandbox {
    async fn execute_code(
        &self,
        code: &str,
        language: &str,
        test_command: Option<&str>,
    ) -> Result<ExecutionReport, SandboxError> {
        let file = Self::source_name(language)?;
        let dir = self.scratch_dir().await?;

        fs::write(dir.join(file), code)
            .await
            .map_err(|e| SandboxError::ExecutionFailed(e.to_string()))?;

        let command = match test_command {
            Some(cmd) => cmd.split_whitespace().map(str::to_string).collect(),
            None => Self::run_command(language, file),
        };

        let report = self.run(&dir, &command).await;
        Self::cleanup(dir).await;

        if let Ok(report) = &report {
            info!(
                "Sandbox execution finished (success={}, exit={})",
                report.success, report.exit_code
            );
        }
        report
    }

    async fn run_tests(
        &self,
        files: &[(String, String)],
        language: &str,
    ) -> Result<ExecutionReport, SandboxError> {
        if language != "python" {
            return Err(SandboxError::Unavailable(format!(
                "no test runner wired for language: {language}"
            )));
        }

        let dir = self.scratch_dir().await?;
        for (name, content) in files {
            fs::write(dir.join(name), content)
                .await
                .map_err(|e| SandboxError::ExecutionFailed(e.to_string()))?;
        }

        let command = vec![
            "python3".to_string(),
            "-m".to_string(),
            "pytest".to_string(),
            "-q".to_string(),
        ];
        let report = self.run(&dir, &command).await;
        Self::cleanup(dir).await;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_language_is_rejected() {
        let sandbox = ProcessSandbox::default();
        let err = sandbox.execute_code("puts 1", "ruby", None).await.unwrap_err();
        assert!(matches!(err, SandboxError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_run_tests_requires_python() {
        let sandbox = ProcessSandbox::default();
        let err = sandbox.run_tests(&[], "javascript").await.unwrap_err();
        assert!(matches!(err, SandboxError::Unavailable(_)));
    }
}
