//! Pipeline execution

pub mod engine;
pub mod executor;

pub use engine::{EventHandler, ExecutionEvent, PipelineRunner, RunResult, StageOutput};
pub use executor::{StageExecutor, DEFAULT_STAGE_TIMEOUT_SECS};
