//! Execution context - input variables and accumulated stage outputs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key-value state threaded through a pipeline run
///
/// Callers supply the input variables once. The runner clones the context
/// and records each completed stage's output on its private copy, so the
/// caller's context is never mutated by a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Input variables supplied at invocation
    variables: HashMap<String, String>,

    /// Outputs from completed stages, in completion order
    stage_outputs: Vec<(String, String)>,
}

impl ExecutionContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from input variables
    pub fn from_inputs<I, K, V>(inputs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            variables: inputs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            stage_outputs: Vec::new(),
        }
    }

    /// Set a variable
    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Get a variable
    pub fn get_variable(&self, key: &str) -> Option<&String> {
        self.variables.get(key)
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    /// Record the output of a completed stage
    pub fn record_stage_output(&mut self, stage_id: &str, output: String) {
        self.stage_outputs.push((stage_id.to_string(), output));
    }

    /// Get the output of a completed stage
    pub fn get_stage_output(&self, stage_id: &str) -> Option<&str> {
        self.stage_outputs
            .iter()
            .rev()
            .find(|(id, _)| id == stage_id)
            .map(|(_, output)| output.as_str())
    }

    /// Completed stage outputs in the order they were produced
    pub fn stage_outputs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.stage_outputs
            .iter()
            .map(|(id, output)| (id.as_str(), output.as_str()))
    }

    /// All variables available for template rendering
    ///
    /// Stage outputs are exposed as `stages.<id>.output` and `<id>_output`.
    pub fn get_rendering_variables(&self) -> HashMap<String, String> {
        let mut vars = self.variables.clone();

        for (stage_id, output) in &self.stage_outputs {
            vars.insert(format!("stages.{}.output", stage_id), output.clone());
            vars.insert(format!("{}_output", stage_id), output.clone());
        }

        vars
    }
}
