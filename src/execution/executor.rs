//! Stage executor - runs individual stages with the backend

use crate::{
    agent::AgentExecutor,
    core::{ExecutionContext, Stage, StageFailure},
};
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

/// Timeout applied when neither the task nor the crew sets one
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 600;

/// Executes a single stage
pub struct StageExecutor<A> {
    agent: A,
    default_timeout_secs: u64,
}

impl<A: AgentExecutor> StageExecutor<A> {
    pub fn new(agent: A) -> Self {
        Self {
            agent,
            default_timeout_secs: DEFAULT_STAGE_TIMEOUT_SECS,
        }
    }

    /// Override the timeout used for stages without their own
    pub fn with_default_timeout(mut self, secs: u64) -> Self {
        self.default_timeout_secs = secs;
        self
    }

    /// Effective timeout for `stage`
    pub fn timeout_for(&self, stage: &Stage) -> u64 {
        stage.task.timeout_secs.unwrap_or(self.default_timeout_secs)
    }

    /// Execute a stage and return its output
    pub async fn execute(
        &self,
        stage: &Stage,
        context: &ExecutionContext,
    ) -> Result<String, StageFailure> {
        debug!("Executing stage: {} (agent: {})", stage.id, stage.agent_id());

        let request = stage.request(context);
        debug!("Prompt for stage {}: {}", stage.id, request.to_prompt());

        let timeout_secs = self.timeout_for(stage);
        let response = match timeout(
            Duration::from_secs(timeout_secs),
            self.agent.execute(&request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                debug!("Agent error for stage {}: {}", stage.id, e);
                return Err(StageFailure::Agent(e));
            }
            Err(_) => {
                debug!("Timeout for stage {} after {}s", stage.id, timeout_secs);
                return Err(StageFailure::Timeout(timeout_secs));
            }
        };

        if stage.agent.verbose {
            info!("Output of stage {}:\n{}", stage.id, response.content);
        } else {
            debug!("Agent response for stage {}: {}", stage.id, response.content);
        }
        Ok(response.content)
    }
}
