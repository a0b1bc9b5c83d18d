//! Backend configuration and selection

use crate::agent::{AgentError, AgentExecutor, BackendProvider, CommandClient, OpenAiClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Environment variable consulted when no backend is declared
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Backend declared in the `llm` section of `crew.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum BackendConfig {
    /// OpenAI-compatible chat completions API
    #[serde(rename = "openai")]
    OpenAi(OpenAiConfig),
    /// A local command that reads the prompt as its last argument
    Command(CommandConfig),
}

/// Settings for the OpenAI-compatible backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            temperature: None,
            timeout_secs: default_request_timeout(),
        }
    }
}

/// Settings for the command-line backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Executable name or path
    pub program: String,

    /// Arguments placed before the prompt
    #[serde(default)]
    pub args: Vec<String>,

    /// Timeout for one invocation in seconds
    #[serde(default = "default_command_timeout")]
    pub timeout_secs: u64,
}

impl CommandConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout_secs: default_command_timeout(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_request_timeout() -> u64 {
    120
}

fn default_command_timeout() -> u64 {
    600
}

impl BackendConfig {
    /// Pick a backend from the environment when none is declared
    ///
    /// Only a non-empty `OPENAI_API_KEY` selects a backend.
    pub fn detect() -> Option<Self> {
        std::env::var(DEFAULT_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|_| BackendConfig::OpenAi(OpenAiConfig::default()))
    }
}

impl BackendProvider for BackendConfig {
    fn name(&self) -> &str {
        match self {
            BackendConfig::OpenAi(_) => "openai",
            BackendConfig::Command(_) => "command",
        }
    }

    fn connect(&self) -> Result<Arc<dyn AgentExecutor>, AgentError> {
        match self {
            BackendConfig::OpenAi(config) => Ok(Arc::new(OpenAiClient::new(config.clone())?)),
            BackendConfig::Command(config) => Ok(Arc::new(CommandClient::new(config)?)),
        }
    }

    fn remediation(&self) -> String {
        match self {
            BackendConfig::OpenAi(config) => format!(
                "Set {} to a valid API key, or point `llm.api_key_env` at the variable that holds it",
                config.api_key_env
            ),
            BackendConfig::Command(config) => format!(
                "Install '{}' and make sure it is on PATH, or set `llm.program` to its full path",
                config.program
            ),
        }
    }
}
