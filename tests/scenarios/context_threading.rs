//! Test: Context Threading - inputs and prior outputs reach later stages

use crate::helpers::*;
use crew::core::ExecutionContext;

const AGENTS: &str = r#"
report_generator:
  role: "Senior {topic} Researcher"
  goal: "Uncover developments in {topic}"
blog_writer:
  role: "Writer"
  goal: "Write about {topic}"
  backstory: "Writes for {audience}"
"#;

const TASKS: &str = r#"
report_task:
  description: "Research {topic}"
  expected_output: "Bullet points"
blog_writing_task:
  description: "Write a post from: {report_task_output}"
  expected_output: "Markdown for {audience}"
echo_task:
  description: "{topic}"
  expected_output: "The topic"
"#;

/// A single echo stage returns exactly the rendered input
#[tokio::test]
async fn test_echo_stage_returns_input() {
    let store = store(AGENTS, TASKS);
    let pipeline = pipeline(&store, &[("report_generator", "echo_task")]);
    let dir = tempfile::tempdir().unwrap();
    let context = ExecutionContext::from_inputs([("topic", "X")]);

    let run = run_with_mock(&pipeline, MockAgent::echo(), &context, dir.path()).await;
    let result = assert_completed(&run);

    assert_eq!(result.outputs().len(), 1);
    assert_eq!(result.final_output(), Some("X"));
}

/// Later stages see every earlier output, in order
#[tokio::test]
async fn test_prior_outputs_are_passed_along() {
    let store = store(AGENTS, TASKS);
    let pipeline = pipeline(
        &store,
        &[
            ("report_generator", "report_task"),
            ("blog_writer", "blog_writing_task"),
        ],
    );
    let dir = tempfile::tempdir().unwrap();
    let context = ExecutionContext::from_inputs([("topic", "AI agents"), ("audience", "devs")]);
    let agent = MockAgent::new(vec!["Ten findings", "A blog post"]);

    let run = run_with_mock(&pipeline, agent.clone(), &context, dir.path()).await;
    let result = assert_completed(&run);

    assert_eq!(result.output("report_task"), Some("Ten findings"));
    assert_eq!(result.final_output(), Some("A blog post"));
    assert_eq!(agent.stage_order(), vec!["report_task", "blog_writing_task"]);

    let requests = agent.requests();
    assert_eq!(requests[0].role, "Senior AI agents Researcher");
    assert!(requests[0].context.is_empty());

    let blog = &requests[1];
    assert_eq!(blog.description, "Write a post from: Ten findings");
    assert_eq!(blog.expected_output, "Markdown for devs");
    assert_eq!(blog.backstory.as_deref(), Some("Writes for devs"));
    assert_eq!(blog.context.len(), 1);
    assert_eq!(blog.context[0].stage_id, "report_task");
    assert_eq!(blog.context[0].output, "Ten findings");
}

/// Placeholders with no value are left as written
#[tokio::test]
async fn test_unknown_placeholder_is_left_verbatim() {
    let store = store(AGENTS, TASKS);
    let pipeline = pipeline(&store, &[("report_generator", "echo_task")]);
    let dir = tempfile::tempdir().unwrap();

    let run = run_with_mock(&pipeline, MockAgent::echo(), &ExecutionContext::new(), dir.path()).await;

    assert_eq!(assert_completed(&run).final_output(), Some("{topic}"));
}

/// The caller's context is the same before and after a run
#[tokio::test]
async fn test_callers_context_is_not_modified() {
    let store = store(AGENTS, TASKS);
    let pipeline = pipeline(&store, &[("report_generator", "report_task")]);
    let dir = tempfile::tempdir().unwrap();
    let context = ExecutionContext::from_inputs([("topic", "rust")]);
    let before = context.clone();

    let run = run_with_mock(&pipeline, MockAgent::new(vec!["done"]), &context, dir.path()).await;
    assert_completed(&run);

    assert_eq!(context, before);
    assert!(context.get_stage_output("report_task").is_none());
}
