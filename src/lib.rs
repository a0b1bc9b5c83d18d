//! crew - declarative crews of LLM agents run as sequential pipelines

pub mod agent;
pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;

// Re-export commonly used types
pub use agent::{AgentError, AgentExecutor, AgentResponse, BackendConfig, PreflightValidator};
pub use core::{
    ConfigStore, CrewDefinition, CrewError, CrewResult, ExecutionContext, ExecutionStatus,
    Pipeline, PipelineBuilder, Process,
};
pub use execution::{ExecutionEvent, PipelineRunner, RunResult};
pub use persistence::{ArtifactSink, FileArtifactSink};
