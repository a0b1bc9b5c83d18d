//! Builds agent and task handles from configuration records

use crate::core::config::ConfigRecord;
use crate::core::error::{CrewError, CrewResult};
use serde_yaml::Value;
use std::path::{Component, Path, PathBuf};

/// A validated agent definition
#[derive(Debug, Clone, PartialEq)]
pub struct AgentHandle {
    pub id: String,

    /// Role the agent plays (may contain `{placeholders}`)
    pub role: String,

    /// What the agent is trying to achieve
    pub goal: String,

    pub backstory: Option<String>,

    /// Model override for this agent
    pub model: Option<String>,

    pub verbose: bool,
}

/// A validated task definition
#[derive(Debug, Clone, PartialEq)]
pub struct TaskHandle {
    pub id: String,

    /// Task text sent to the agent (may contain `{placeholders}`)
    pub description: String,

    /// Criteria for the final answer
    pub expected_output: String,

    /// Agent the task declares it belongs to, if any
    pub agent: Option<String>,

    /// Output destination declared on the task record
    pub output_file: Option<PathBuf>,

    /// Per-task timeout override
    pub timeout_secs: Option<u64>,
}

/// Turns configuration records into runnable handles
///
/// The factory only validates. It never touches the filesystem: output
/// directories are created by the runner when a stage actually produces
/// output.
pub struct StageFactory;

impl StageFactory {
    /// Build an agent handle; `role` and `goal` are required
    pub fn build_agent(record: &ConfigRecord) -> CrewResult<AgentHandle> {
        Ok(AgentHandle {
            id: record.id().to_string(),
            role: required(record, "role")?,
            goal: required(record, "goal")?,
            backstory: optional(record, "backstory")?,
            model: model(record)?,
            verbose: flag(record, "verbose")?,
        })
    }

    /// Build a task handle; `description` and `expected_output` are required
    pub fn build_task(record: &ConfigRecord) -> CrewResult<TaskHandle> {
        let output_file = optional(record, "output_file")?
            .map(|raw| Self::validate_output_path(record.id(), &raw))
            .transpose()?;

        let timeout_secs = match record.field("timeout_secs") {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_u64().filter(|secs| *secs > 0).ok_or_else(|| {
                CrewError::invalid(record.id(), "field 'timeout_secs' must be a positive integer")
            })?),
        };

        Ok(TaskHandle {
            id: record.id().to_string(),
            description: required(record, "description")?,
            expected_output: required(record, "expected_output")?,
            agent: optional(record, "agent")?,
            output_file,
            timeout_secs,
        })
    }

    /// Check that an output destination is a relative path inside the output root
    pub fn validate_output_path(owner: &str, raw: &str) -> CrewResult<PathBuf> {
        if raw.trim().is_empty() {
            return Err(CrewError::invalid(owner, "output path must not be empty"));
        }

        let path = Path::new(raw);
        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => {
                    return Err(CrewError::invalid(
                        owner,
                        format!("output path '{}' must not contain '..'", raw),
                    ))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(CrewError::invalid(
                        owner,
                        format!("output path '{}' must be relative", raw),
                    ))
                }
            }
        }

        if path.file_name().is_none() {
            return Err(CrewError::invalid(
                owner,
                format!("output path '{}' does not name a file", raw),
            ));
        }

        Ok(path.to_path_buf())
    }
}

fn required(record: &ConfigRecord, field: &str) -> CrewResult<String> {
    match optional(record, field)? {
        Some(value) => Ok(value),
        None => Err(CrewError::invalid(
            record.id(),
            format!("missing required field '{}'", field),
        )),
    }
}

/// A string field; blank values count as absent
fn optional(record: &ConfigRecord, field: &str) -> CrewResult<Option<String>> {
    match record.field(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim_end().to_string())),
        Some(_) => Err(CrewError::invalid(
            record.id(),
            format!("field '{}' must be a string", field),
        )),
    }
}

fn flag(record: &ConfigRecord, field: &str) -> CrewResult<bool> {
    match record.field(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(CrewError::invalid(
            record.id(),
            format!("field '{}' must be a boolean", field),
        )),
    }
}

/// `llm` may be a model name or a mapping with a `model` key
fn model(record: &ConfigRecord) -> CrewResult<Option<String>> {
    match record.field("llm") {
        Some(Value::Mapping(map)) => Ok(map
            .get("model")
            .and_then(Value::as_str)
            .map(str::to_string)),
        _ => optional(record, "llm"),
    }
}
