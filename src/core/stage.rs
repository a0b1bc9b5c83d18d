//! Stage domain model

use crate::agent::{PriorOutput, StageRequest};
use crate::core::{
    context::ExecutionContext,
    factory::{AgentHandle, TaskHandle},
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::PathBuf;

/// One agent+task pairing executed as one step of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// Stage identifier (the task identifier)
    pub id: String,

    /// Agent performing the task
    pub agent: AgentHandle,

    /// Task being performed
    pub task: TaskHandle,

    /// Where the stage output is written, relative to the output root
    pub output_path: Option<PathBuf>,
}

impl Stage {
    pub fn agent_id(&self) -> &str {
        &self.agent.id
    }

    pub fn task_id(&self) -> &str {
        &self.task.id
    }

    /// Build the backend request for this stage from the accumulated context
    pub fn request(&self, context: &ExecutionContext) -> StageRequest {
        let vars = context.get_rendering_variables();

        StageRequest {
            stage_id: self.id.clone(),
            role: render_template(&self.agent.role, &vars),
            goal: render_template(&self.agent.goal, &vars),
            backstory: self
                .agent
                .backstory
                .as_ref()
                .map(|b| render_template(b, &vars)),
            model: self.agent.model.clone(),
            description: render_template(&self.task.description, &vars),
            expected_output: render_template(&self.task.expected_output, &vars),
            context: context
                .stage_outputs()
                .map(|(stage_id, output)| PriorOutput {
                    stage_id: stage_id.to_string(),
                    output: output.to_string(),
                })
                .collect(),
        }
    }
}

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_.\-]*)\}").expect("placeholder pattern is valid")
});

/// Replace `{name}` placeholders; unknown names are left untouched
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
