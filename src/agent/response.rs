//! Agent response types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for agent operations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Response from the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// The response content
    pub content: String,

    /// Token usage information (if available)
    pub usage: Option<TokenUsage>,
}

impl AgentResponse {
    /// Create a new agent response
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
