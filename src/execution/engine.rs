//! Pipeline runner - executes the stages of a pipeline in order

use crate::{
    agent::AgentExecutor,
    core::{
        render_chain, CrewError, CrewResult, ExecutionContext, ExecutionStatus, Pipeline,
        PipelineState, Stage, StageFailure,
    },
    execution::StageExecutor,
    persistence::{ArtifactSink, FileArtifactSink},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};
use uuid::Uuid;

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        execution_id: Uuid,
        pipeline_name: String,
        total_stages: usize,
    },
    StageStarted {
        stage_id: String,
        agent_id: String,
        /// Zero-based position in the pipeline
        index: usize,
        total: usize,
    },
    StageCompleted {
        stage_id: String,
        output: String,
    },
    OutputWritten {
        stage_id: String,
        path: PathBuf,
    },
    StageFailed {
        stage_id: String,
        error: String,
    },
    PipelineCompleted {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;

/// Output of one completed stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutput {
    pub stage_id: String,
    pub agent_id: String,
    pub output: String,

    /// Where the output was written, if the stage declares a destination
    pub output_path: Option<PathBuf>,
}

/// Result of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub execution_id: Uuid,
    pub outputs: Vec<StageOutput>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl RunResult {
    /// Output of the last stage, the overall result of the run
    pub fn final_output(&self) -> Option<&str> {
        self.outputs.last().map(|o| o.output.as_str())
    }

    /// Per-stage outputs in execution order
    pub fn outputs(&self) -> &[StageOutput] {
        &self.outputs
    }

    /// Output of a specific stage
    pub fn output(&self, stage_id: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.stage_id == stage_id)
            .map(|o| o.output.as_str())
    }
}

/// Sequential pipeline runner
pub struct PipelineRunner<A> {
    executor: StageExecutor<A>,
    sink: Arc<dyn ArtifactSink>,
    state: Mutex<PipelineState>,
    event_handlers: Vec<EventHandler>,
}

impl<A: AgentExecutor> PipelineRunner<A> {
    /// Create a runner writing artifacts relative to the working directory
    pub fn new(agent: A) -> Self {
        Self {
            executor: StageExecutor::new(agent),
            sink: Arc::new(FileArtifactSink::default()),
            state: Mutex::new(PipelineState::new()),
            event_handlers: Vec::new(),
        }
    }

    /// Resolve relative output paths against `root`
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sink = Arc::new(FileArtifactSink::new(root));
        self
    }

    /// Send artifacts to a custom sink
    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Timeout for stages whose task does not set one
    pub fn with_default_timeout(mut self, secs: u64) -> Self {
        self.executor = self.executor.with_default_timeout(secs);
        self
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Status of the most recent run
    pub async fn status(&self) -> ExecutionStatus {
        self.state.lock().await.status
    }

    /// Snapshot of the most recent run's state
    pub async fn state(&self) -> PipelineState {
        self.state.lock().await.clone()
    }

    /// Run every stage in order
    ///
    /// The caller's context is not modified; stage outputs accumulate in a
    /// private copy. The first failing stage aborts the run.
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        context: &ExecutionContext,
    ) -> CrewResult<RunResult> {
        let mut state = PipelineState::new();
        state.start(pipeline.len());
        let execution_id = state.execution_id;
        let started_at = state.started_at.unwrap_or_else(Utc::now);
        *self.state.lock().await = state;

        debug!(
            "Starting pipeline run: {} ({}, {} stages)",
            pipeline.name(),
            execution_id,
            pipeline.len()
        );
        self.emit_event(ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name: pipeline.name().to_string(),
            total_stages: pipeline.len(),
        });

        let mut context = context.clone();
        let mut outputs = Vec::with_capacity(pipeline.len());

        for (index, stage) in pipeline.stages().iter().enumerate() {
            self.emit_event(ExecutionEvent::StageStarted {
                stage_id: stage.id.clone(),
                agent_id: stage.agent_id().to_string(),
                index,
                total: pipeline.len(),
            });

            match self.run_stage(stage, &mut context).await {
                Ok(output) => {
                    self.state.lock().await.stage_completed();
                    outputs.push(output);
                }
                Err(failure) => {
                    let message = render_chain(&failure);
                    error!("Stage {} failed: {}", stage.id, message);
                    self.state.lock().await.fail(&stage.id);
                    self.emit_event(ExecutionEvent::StageFailed {
                        stage_id: stage.id.clone(),
                        error: message,
                    });
                    self.emit_event(ExecutionEvent::PipelineCompleted {
                        execution_id,
                        status: ExecutionStatus::Failed,
                    });
                    return Err(CrewError::StageExecution {
                        stage: stage.id.clone(),
                        source: failure,
                    });
                }
            }
        }

        let completed_at = {
            let mut state = self.state.lock().await;
            state.complete();
            state.completed_at.unwrap_or_else(Utc::now)
        };

        debug!("Pipeline run finished: {} - Completed", pipeline.name());
        self.emit_event(ExecutionEvent::PipelineCompleted {
            execution_id,
            status: ExecutionStatus::Completed,
        });

        Ok(RunResult {
            execution_id,
            outputs,
            started_at,
            completed_at,
        })
    }

    /// Execute one stage, record its output and write its artifact
    async fn run_stage(
        &self,
        stage: &Stage,
        context: &mut ExecutionContext,
    ) -> Result<StageOutput, StageFailure> {
        let output = self.executor.execute(stage, context).await?;
        context.record_stage_output(&stage.id, output.clone());

        self.emit_event(ExecutionEvent::StageCompleted {
            stage_id: stage.id.clone(),
            output: output.clone(),
        });

        let output_path = match &stage.output_path {
            Some(path) => Some(self.write_output(stage, path, &output).await?),
            None => None,
        };

        Ok(StageOutput {
            stage_id: stage.id.clone(),
            agent_id: stage.agent_id().to_string(),
            output,
            output_path,
        })
    }

    async fn write_output(
        &self,
        stage: &Stage,
        path: &Path,
        output: &str,
    ) -> Result<PathBuf, StageFailure> {
        let written = self
            .sink
            .write(path, output)
            .await
            .map_err(|source| StageFailure::Output {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Stage {} output written to {}", stage.id, written.display());
        self.emit_event(ExecutionEvent::OutputWritten {
            stage_id: stage.id.clone(),
            path: written.clone(),
        });
        Ok(written)
    }
}
