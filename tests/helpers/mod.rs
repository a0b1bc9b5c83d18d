//! Test utility functions for crew runs

#![allow(dead_code)]

use async_trait::async_trait;
use crew::agent::{AgentError, AgentExecutor, AgentResponse, StageRequest};
use crew::core::{
    render_chain, ConfigStore, CrewError, CrewResult, ExecutionContext, Pipeline, PipelineBuilder,
    Process,
};
use crew::execution::{ExecutionEvent, PipelineRunner, RunResult};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How the mock answers a request
#[derive(Debug, Clone)]
enum Mode {
    /// Predefined responses, one per request
    Scripted(Arc<Vec<String>>),
    /// Answer with the rendered task description
    Echo,
}

/// Mock agent that returns predefined responses
///
/// Clones share their request log, so a test can keep one clone for
/// inspection and hand another to the runner.
#[derive(Debug, Clone)]
pub struct MockAgent {
    mode: Mode,
    index: Arc<AtomicUsize>,
    fail_on: Option<String>,
    delay: Option<std::time::Duration>,
    requests: Arc<Mutex<Vec<StageRequest>>>,
}

impl MockAgent {
    /// Create a mock agent with predefined responses
    pub fn new(responses: Vec<&str>) -> Self {
        Self::with_mode(Mode::Scripted(Arc::new(
            responses.into_iter().map(str::to_string).collect(),
        )))
    }

    /// Create a mock agent that echoes the task description
    pub fn echo() -> Self {
        Self::with_mode(Mode::Echo)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            index: Arc::new(AtomicUsize::new(0)),
            fail_on: None,
            delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail every request for `stage_id`
    pub fn failing_on(mut self, stage_id: &str) -> Self {
        self.fail_on = Some(stage_id.to_string());
        self
    }

    /// Add artificial delay to simulate a slow backend
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<StageRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Stage ids in the order they were requested
    pub fn stage_order(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.stage_id).collect()
    }
}

#[async_trait]
impl AgentExecutor for MockAgent {
    async fn execute(&self, request: &StageRequest) -> Result<AgentResponse, AgentError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_on.as_deref() == Some(request.stage_id.as_str()) {
            return Err(AgentError::Api(format!(
                "MockAgent: refusing stage {}",
                request.stage_id
            )));
        }

        match &self.mode {
            Mode::Echo => Ok(AgentResponse::new(request.description.clone())),
            Mode::Scripted(responses) => {
                let idx = self.index.fetch_add(1, Ordering::SeqCst);
                responses
                    .get(idx)
                    .map(|r| AgentResponse::new(r.clone()))
                    .ok_or_else(|| {
                        AgentError::Internal(format!(
                            "MockAgent: No response available for request {}",
                            idx + 1
                        ))
                    })
            }
        }
    }
}

/// Result of running a pipeline with a mock agent
pub struct TestRun {
    pub result: CrewResult<RunResult>,
    pub events: Vec<String>,
}

/// Build a config store from two YAML documents
pub fn store(agents: &str, tasks: &str) -> ConfigStore {
    ConfigStore::from_yaml(agents, tasks).unwrap()
}

/// Build a sequential pipeline from (agent, task) pairs
pub fn pipeline(store: &ConfigStore, stages: &[(&str, &str)]) -> Pipeline {
    let mut builder = PipelineBuilder::new(store).named("test");
    for (agent, task) in stages {
        builder.add_stage(*agent, *task, None).unwrap();
    }
    builder.build(Process::Sequential).unwrap()
}

/// Run a pipeline with the mock agent, writing artifacts under `root`
pub async fn run_with_mock(
    pipeline: &Pipeline,
    agent: MockAgent,
    context: &ExecutionContext,
    root: &Path,
) -> TestRun {
    let events = Arc::new(Mutex::new(Vec::new()));
    let seen = events.clone();

    let mut runner = PipelineRunner::new(agent).with_output_root(root);
    runner.add_event_handler(move |event| {
        seen.lock().unwrap().push(event_label(event));
    });

    let result = runner.run(pipeline, context).await;
    let events = events.lock().unwrap().clone();
    TestRun { result, events }
}

/// Short label for an event, e.g. `started:report_task`
pub fn event_label(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted { .. } => "pipeline_started".to_string(),
        ExecutionEvent::StageStarted { stage_id, .. } => format!("started:{}", stage_id),
        ExecutionEvent::StageCompleted { stage_id, .. } => format!("completed:{}", stage_id),
        ExecutionEvent::OutputWritten { stage_id, .. } => format!("written:{}", stage_id),
        ExecutionEvent::StageFailed { stage_id, .. } => format!("failed:{}", stage_id),
        ExecutionEvent::PipelineCompleted { status, .. } => format!("finished:{:?}", status),
    }
}

/// Assert the run failed in `stage`, returning the error message
pub fn assert_stage_failed(run: &TestRun, stage: &str) -> String {
    match &run.result {
        Err(err @ CrewError::StageExecution { .. }) => {
            assert_eq!(err.failed_stage(), Some(stage), "wrong failing stage");
            render_chain(err)
        }
        Err(other) => panic!("Expected StageExecution for {}, got {:?}", stage, other),
        Ok(_) => panic!("Expected stage {} to fail, but the run succeeded", stage),
    }
}

/// Assert the run succeeded and return its result
pub fn assert_completed(run: &TestRun) -> &RunResult {
    match &run.result {
        Ok(result) => result,
        Err(err) => panic!("Expected the run to succeed, got {}", err),
    }
}

/// Assert a file under `root` has exactly `content`
pub fn assert_file_content(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    let actual = std::fs::read_to_string(&full)
        .unwrap_or_else(|e| panic!("Expected {} to exist: {}", full.display(), e));
    assert_eq!(actual, content, "unexpected content in {}", path);
}

/// Assert no file was written at `path` under `root`
pub fn assert_no_file(root: &Path, path: &str) {
    assert!(
        !root.join(path).exists(),
        "Expected {} not to be written",
        path
    );
}
