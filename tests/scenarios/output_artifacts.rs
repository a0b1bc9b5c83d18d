//! Test: Output Artifacts - designated outputs are written to files

use crate::helpers::*;
use crew::core::{ExecutionContext, PipelineBuilder, Process};
use std::path::PathBuf;

const AGENTS: &str = r#"
blog_writer:
  role: "Writer"
  goal: "Write"
"#;

const TASKS: &str = r#"
blog_writing_task:
  description: "Write a post"
  expected_output: "Markdown"
  output_file: "blogs/blogs.md"
notes_task:
  description: "Take notes"
  expected_output: "Notes"
"#;

/// A second run fully replaces the first run's file
#[tokio::test]
async fn test_second_run_overwrites() {
    let store = store(AGENTS, TASKS);
    let pipeline = pipeline(&store, &[("blog_writer", "blog_writing_task")]);
    let dir = tempfile::tempdir().unwrap();

    let first = MockAgent::new(vec!["A much longer first draft of the post"]);
    let run = run_with_mock(&pipeline, first, &ExecutionContext::new(), dir.path()).await;
    assert_completed(&run);
    assert_file_content(dir.path(), "blogs/blogs.md", "A much longer first draft of the post");

    let second = MockAgent::new(vec!["Short"]);
    let run = run_with_mock(&pipeline, second, &ExecutionContext::new(), dir.path()).await;
    let result = assert_completed(&run);
    assert_file_content(dir.path(), "blogs/blogs.md", "Short");

    assert_eq!(
        result.outputs()[0].output_path,
        Some(dir.path().join("blogs/blogs.md"))
    );
}

/// Stages without a destination write nothing
#[tokio::test]
async fn test_stage_without_destination() {
    let store = store(AGENTS, TASKS);
    let pipeline = pipeline(&store, &[("blog_writer", "notes_task")]);
    let dir = tempfile::tempdir().unwrap();

    let run = run_with_mock(&pipeline, MockAgent::new(vec!["notes"]), &ExecutionContext::new(), dir.path()).await;
    let result = assert_completed(&run);

    assert!(result.outputs()[0].output_path.is_none());
    assert!(!run.events.iter().any(|e| e.starts_with("written:")));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// A destination given at registration takes precedence over the task's
#[tokio::test]
async fn test_registration_overrides_task_destination() {
    let store = store(AGENTS, TASKS);
    let mut builder = PipelineBuilder::new(&store);
    builder
        .add_stage("blog_writer", "blog_writing_task", Some("drafts/today.md"))
        .unwrap()
        .add_stage("blog_writer", "notes_task", Some("notes.txt"))
        .unwrap();
    let pipeline = builder.build(Process::Sequential).unwrap();

    assert_eq!(
        pipeline.stage("blog_writing_task").unwrap().output_path,
        Some(PathBuf::from("drafts/today.md"))
    );

    let dir = tempfile::tempdir().unwrap();
    let run = run_with_mock(&pipeline, MockAgent::new(vec!["post", "notes"]), &ExecutionContext::new(), dir.path()).await;
    assert_completed(&run);

    assert_file_content(dir.path(), "drafts/today.md", "post");
    assert_file_content(dir.path(), "notes.txt", "notes");
    assert_no_file(dir.path(), "blogs/blogs.md");
}
