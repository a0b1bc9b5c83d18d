//! Command-line backend - runs a local agent CLI once per stage

use crate::agent::{AgentError, AgentExecutor, AgentResponse, CommandConfig, StageRequest};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Client that executes a command with the prompt as its last argument
#[derive(Debug, Clone)]
pub struct CommandClient {
    /// Resolved executable path
    program: PathBuf,

    /// Arguments placed before the prompt
    args: Vec<String>,

    /// Timeout for command execution in seconds
    timeout_secs: u64,
}

impl CommandClient {
    /// Create a client, resolving the program on PATH
    ///
    /// # Errors
    /// Returns `AgentError::NotConfigured` if the program cannot be found.
    pub fn new(config: &CommandConfig) -> Result<Self, AgentError> {
        let program = which::which(&config.program).map_err(|e| {
            AgentError::NotConfigured(format!("command '{}' not found: {}", config.program, e))
        })?;

        Ok(Self {
            program,
            args: config.args.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl AgentExecutor for CommandClient {
    /// Spawn `program args... <prompt>` and capture stdout
    ///
    /// # Errors
    /// Returns `AgentError` if:
    /// - The program cannot be spawned
    /// - It exits with a non-zero status
    /// - The output is not valid UTF-8
    /// - The command times out
    async fn execute(&self, request: &StageRequest) -> Result<AgentResponse, AgentError> {
        let prompt = request.to_prompt();
        debug!(
            "Spawning {} for stage {} with prompt length: {}",
            self.program.display(),
            request.stage_id,
            prompt.len()
        );

        let result = timeout(
            Duration::from_secs(self.timeout_secs),
            Command::new(&self.program)
                .args(&self.args)
                .arg(&prompt)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| AgentError::Timeout(self.timeout_secs))?;

        let output = result.map_err(|e| {
            AgentError::Internal(format!("Failed to execute {}: {}", self.program.display(), e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            debug!("{} exited with code {}: {}", self.program.display(), exit_code, stderr.trim());
            return Err(AgentError::Api(format!(
                "{} exited with code {}: {}",
                self.program.display(),
                exit_code,
                stderr.trim()
            )));
        }

        let content = String::from_utf8(output.stdout)
            .map_err(|e| AgentError::Internal(format!("Failed to decode output: {}", e)))?;

        debug!("{} returned {} bytes of output", self.program.display(), content.len());

        Ok(AgentResponse::new(content.trim_end()))
    }
}
