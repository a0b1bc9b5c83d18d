//! Crew manifest (`crew.yaml`) - the declarative crew definition

use crate::agent::BackendConfig;
use crate::core::error::{CrewError, CrewResult};
use crate::core::pipeline::Process;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the manifest inside a crew directory
pub const MANIFEST_FILE: &str = "crew.yaml";

/// Top-level crew definition loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewManifest {
    /// Crew name
    pub name: String,

    /// Optional crew description
    #[serde(default)]
    pub description: Option<String>,

    /// Execution process
    #[serde(default)]
    pub process: Process,

    /// Echo stage outputs while running
    #[serde(default)]
    pub verbose: bool,

    /// Default input variables (overridable at invocation)
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,

    /// Stages in execution order
    #[serde(default)]
    pub stages: Vec<StageEntry>,

    /// LLM backend; auto-detected from the environment when absent
    #[serde(default)]
    pub llm: Option<BackendConfig>,

    /// Default timeout for stages (in seconds)
    #[serde(default)]
    pub default_timeout_secs: Option<u64>,
}

/// One stage as listed in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEntry {
    /// Agent identifier from `agents.yaml`
    pub agent: String,

    /// Task identifier from `tasks.yaml`
    pub task: String,

    /// Output destination (overrides the task's `output_file`)
    #[serde(default)]
    pub output_file: Option<String>,
}

impl CrewManifest {
    /// Load a manifest from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> CrewResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CrewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&path.display().to_string(), &content)
    }

    /// Parse a manifest from a YAML string
    pub fn from_yaml(yaml: &str) -> CrewResult<Self> {
        Self::parse(MANIFEST_FILE, yaml)
    }

    fn parse(origin: &str, yaml: &str) -> CrewResult<Self> {
        let manifest: CrewManifest =
            serde_yaml::from_str(yaml).map_err(|source| CrewError::Yaml {
                origin: origin.to_string(),
                source,
            })?;

        if manifest.name.trim().is_empty() {
            return Err(CrewError::invalid(origin, "crew name must not be empty"));
        }
        if manifest.default_timeout_secs == Some(0) {
            return Err(CrewError::invalid(
                origin,
                "default_timeout_secs must be a positive integer",
            ));
        }
        Ok(manifest)
    }
}
