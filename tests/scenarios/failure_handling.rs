//! Test: Failure Handling - the first failing stage aborts the run

use crate::helpers::*;
use crew::core::{CrewError, ExecutionContext, StageFailure};
use crew::execution::PipelineRunner;
use std::time::Duration;

const AGENTS: &str = r#"
worker:
  role: "Worker"
  goal: "Work"
"#;

const TASKS: &str = r#"
first:
  description: "Step one"
  expected_output: "text"
  output_file: "out/first.md"
second:
  description: "Step two"
  expected_output: "text"
  output_file: "out/second.md"
third:
  description: "Step three"
  expected_output: "text"
  output_file: "out/third.md"
slow:
  description: "Takes a while"
  expected_output: "text"
  timeout_secs: 1
"#;

fn three_stages() -> crew::core::Pipeline {
    let store = store(AGENTS, TASKS);
    pipeline(
        &store,
        &[("worker", "first"), ("worker", "second"), ("worker", "third")],
    )
}

/// A failure in stage 2 of 3 stops the run before stage 3
#[tokio::test]
async fn test_middle_stage_failure_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let agent = MockAgent::new(vec!["one", "two", "three"]).failing_on("second");

    let run = run_with_mock(&three_stages(), agent.clone(), &ExecutionContext::new(), dir.path()).await;

    let message = assert_stage_failed(&run, "second");
    assert!(message.contains("refusing stage second"));

    // Stage 3 never reached the backend
    assert_eq!(agent.stage_order(), vec!["first", "second"]);

    assert_file_content(dir.path(), "out/first.md", "one");
    assert_no_file(dir.path(), "out/second.md");
    assert_no_file(dir.path(), "out/third.md");

    assert_eq!(
        run.events,
        vec![
            "pipeline_started",
            "started:first",
            "completed:first",
            "written:first",
            "started:second",
            "failed:second",
            "finished:Failed",
        ]
    );
}

/// The backend error is kept as the source of the stage failure
#[tokio::test]
async fn test_failure_wraps_backend_error() {
    let dir = tempfile::tempdir().unwrap();
    let agent = MockAgent::new(vec![]).failing_on("first");

    let run = run_with_mock(&three_stages(), agent, &ExecutionContext::new(), dir.path()).await;

    match run.result {
        Err(CrewError::StageExecution { stage, source }) => {
            assert_eq!(stage, "first");
            assert!(matches!(source, StageFailure::Agent(_)));
        }
        other => panic!("Expected StageExecution, got {:?}", other.map(|_| ())),
    }
}

/// A stage exceeding its timeout fails the run
#[tokio::test]
async fn test_stage_timeout() {
    let store = store(AGENTS, TASKS);
    let pipeline = pipeline(&store, &[("worker", "slow")]);
    let dir = tempfile::tempdir().unwrap();
    let agent = MockAgent::new(vec!["late"]).with_delay(Duration::from_secs(5));

    let run = run_with_mock(&pipeline, agent, &ExecutionContext::new(), dir.path()).await;

    match run.result {
        Err(CrewError::StageExecution { stage, source }) => {
            assert_eq!(stage, "slow");
            assert!(matches!(source, StageFailure::Timeout(1)));
        }
        other => panic!("Expected a timeout, got {:?}", other.map(|_| ())),
    }
}

/// The crew-wide default applies to tasks without their own timeout
#[tokio::test]
async fn test_default_timeout() {
    let store = store(AGENTS, TASKS);
    let pipeline = pipeline(&store, &[("worker", "first")]);
    let dir = tempfile::tempdir().unwrap();
    let agent = MockAgent::new(vec!["late"]).with_delay(Duration::from_secs(5));

    let runner = PipelineRunner::new(agent)
        .with_output_root(dir.path())
        .with_default_timeout(1);
    let err = runner
        .run(&pipeline, &ExecutionContext::new())
        .await
        .unwrap_err();

    assert_eq!(err.failed_stage(), Some("first"));
    assert_eq!(
        format!("{:#}", anyhow::Error::from(err)),
        "Stage 'first' failed: Timeout after 1 seconds"
    );
    assert_no_file(dir.path(), "out/first.md");
}

/// An unwritable output destination is a stage failure
#[tokio::test]
async fn test_output_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    // A file where the output directory should go
    std::fs::write(dir.path().join("out"), "in the way").unwrap();
    let agent = MockAgent::new(vec!["one", "two", "three"]);

    let run = run_with_mock(&three_stages(), agent.clone(), &ExecutionContext::new(), dir.path()).await;

    let message = assert_stage_failed(&run, "first");
    assert!(message.starts_with("Stage 'first' failed: Failed to write output to "));
    assert!(message.contains("out/first.md"));
    assert_eq!(agent.stage_order(), vec!["first"]);
}
