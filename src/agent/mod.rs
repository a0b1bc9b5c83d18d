//! LLM backends that execute stages
//!
//! A backend receives a [`StageRequest`] (the agent persona, the rendered
//! task, and the outputs of earlier stages) and returns text or fails.

pub mod backend;
pub mod command;
pub mod openai;
pub mod preflight;
pub mod response;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use backend::{BackendConfig, CommandConfig, OpenAiConfig};
pub use command::CommandClient;
pub use openai::OpenAiClient;
pub use preflight::PreflightValidator;
pub use response::{AgentError, AgentResponse, TokenUsage};

/// Trait for agent execution - allows for different implementations
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Execute one stage request
    async fn execute(&self, request: &StageRequest) -> Result<AgentResponse, AgentError>;
}

#[async_trait]
impl<T: AgentExecutor + ?Sized> AgentExecutor for Arc<T> {
    async fn execute(&self, request: &StageRequest) -> Result<AgentResponse, AgentError> {
        (**self).execute(request).await
    }
}

/// Something that can construct a backend on demand
///
/// Construction is the preflight probe: it must fail when the backend is
/// not usable (missing API key, missing executable).
pub trait BackendProvider: Send + Sync {
    /// Short provider name for diagnostics
    fn name(&self) -> &str;

    /// Construct a ready-to-use backend
    fn connect(&self) -> Result<Arc<dyn AgentExecutor>, AgentError>;

    /// What the user should do when `connect` fails
    fn remediation(&self) -> String;
}

/// Output of an earlier stage, passed along as context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorOutput {
    pub stage_id: String,
    pub output: String,
}

/// Everything a backend needs to run one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRequest {
    pub stage_id: String,
    pub role: String,
    pub goal: String,
    pub backstory: Option<String>,

    /// Model override from the agent definition
    pub model: Option<String>,

    pub description: String,
    pub expected_output: String,

    /// Outputs of earlier stages, oldest first
    pub context: Vec<PriorOutput>,
}

impl StageRequest {
    /// Persona instructions for the agent
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!("You are {}.", self.role);
        if let Some(backstory) = &self.backstory {
            prompt.push(' ');
            prompt.push_str(backstory);
        }
        prompt.push_str(&format!("\nYour personal goal is: {}", self.goal));
        prompt
    }

    /// The task itself, with expected output and prior stage outputs
    pub fn task_prompt(&self) -> String {
        let mut prompt = format!(
            "Current Task: {}\n\nThis is the expected criteria for your final answer: {}",
            self.description, self.expected_output
        );

        if !self.context.is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            for prior in &self.context {
                prompt.push_str(&format!("\n--- {} ---\n{}\n", prior.stage_id, prior.output));
            }
        }

        prompt
    }

    /// Single-string prompt for text-only backends
    pub fn to_prompt(&self) -> String {
        format!("{}\n\n{}", self.system_prompt(), self.task_prompt())
    }
}
