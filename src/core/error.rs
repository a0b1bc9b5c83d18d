//! Error types for crew configuration, pipeline building and execution

use crate::agent::AgentError;
use crate::core::config::Namespace;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for crew operations
pub type CrewResult<T> = Result<T, CrewError>;

/// Errors surfaced by the crew library
///
/// Everything except `StageExecution` is raised before any stage runs.
#[derive(Debug, Error)]
pub enum CrewError {
    #[error("{namespace} '{id}' not found")]
    NotFound { namespace: Namespace, id: String },

    #[error("Invalid configuration for '{id}': {reason}")]
    InvalidConfig { id: String, reason: String },

    #[error("Pipeline has no stages")]
    EmptyPipeline,

    #[error("Task '{0}' is registered in more than one stage")]
    DuplicateStage(String),

    #[error("Pipeline builder has already built a pipeline")]
    AlreadyBuilt,

    #[error("No LLM backend available: {reason}. {hint}")]
    BackendUnavailable { reason: String, hint: String },

    #[error("Stage '{stage}' failed")]
    StageExecution {
        stage: String,
        #[source]
        source: StageFailure,
    },

    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {origin}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl CrewError {
    pub(crate) fn invalid(id: impl Into<String>, reason: impl Into<String>) -> Self {
        CrewError::InvalidConfig {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Identifier of the failing stage, for run-time failures
    pub fn failed_stage(&self) -> Option<&str> {
        match self {
            CrewError::StageExecution { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

/// Render an error followed by each of its causes, separated by ": "
pub fn render_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut cause = err.source();
    while let Some(next) = cause {
        rendered.push_str(": ");
        rendered.push_str(&next.to_string());
        cause = next.source();
    }
    rendered
}

/// Underlying cause of a stage failure
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Failed to write output to {}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
