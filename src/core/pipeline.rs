//! Pipeline domain model and builder

use crate::core::{
    config::{ConfigStore, Namespace},
    error::{CrewError, CrewResult},
    factory::StageFactory,
    manifest::CrewManifest,
    stage::Stage,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// How the stages of a pipeline are executed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// One stage after another, in registration order
    #[default]
    Sequential,
    /// Manager-delegated execution (declared but not runnable)
    Hierarchical,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Process::Sequential => write!(f, "sequential"),
            Process::Hierarchical => write!(f, "hierarchical"),
        }
    }
}

/// An ordered, non-empty sequence of stages
///
/// Only `PipelineBuilder` creates pipelines, and a built pipeline cannot be
/// changed.
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    process: Process,
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn process(&self) -> Process {
        self.process
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Get a stage by ID
    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[derive(Debug, Clone)]
struct StageDraft {
    agent_id: String,
    task_id: String,
    output_path: Option<String>,
}

/// Assembles stages into a pipeline, resolving them against a config store
///
/// ```no_run
/// use crew::core::{ConfigStore, PipelineBuilder, Process};
///
/// # fn main() -> Result<(), crew::core::CrewError> {
/// let store = ConfigStore::from_dir("crews/research_and_blog")?;
/// let pipeline = PipelineBuilder::new(&store)
///     .add_stage("report_generator", "report_task", None)?
///     .add_stage("blog_writer", "blog_writing_task", Some("blogs/blogs.md"))?
///     .build(Process::Sequential)?;
/// # Ok(())
/// # }
/// ```
pub struct PipelineBuilder<'a> {
    store: &'a ConfigStore,
    name: String,
    drafts: Vec<StageDraft>,
    built: bool,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self {
            store,
            name: "crew".to_string(),
            drafts: Vec::new(),
            built: false,
        }
    }

    /// Set the pipeline name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Append a stage binding `task_id` to `agent_id`
    ///
    /// When `output_path` is `None` the task's own `output_file` applies.
    pub fn add_stage(
        &mut self,
        agent_id: impl Into<String>,
        task_id: impl Into<String>,
        output_path: Option<&str>,
    ) -> CrewResult<&mut Self> {
        if self.built {
            return Err(CrewError::AlreadyBuilt);
        }

        self.drafts.push(StageDraft {
            agent_id: agent_id.into(),
            task_id: task_id.into(),
            output_path: output_path.map(str::to_string),
        });
        Ok(self)
    }

    /// Validate the registered stages and produce the pipeline
    pub fn build(&mut self, process: Process) -> CrewResult<Pipeline> {
        if self.built {
            return Err(CrewError::AlreadyBuilt);
        }
        if self.drafts.is_empty() {
            return Err(CrewError::EmptyPipeline);
        }

        let mut seen = HashSet::new();
        for draft in &self.drafts {
            if !seen.insert(draft.task_id.as_str()) {
                return Err(CrewError::DuplicateStage(draft.task_id.clone()));
            }
        }

        if process != Process::Sequential {
            return Err(CrewError::invalid(
                &self.name,
                format!("process '{}' is not supported, use 'sequential'", process),
            ));
        }

        let stages = self
            .drafts
            .iter()
            .map(|draft| self.resolve(draft))
            .collect::<CrewResult<Vec<_>>>()?;

        self.built = true;
        debug!("Built pipeline '{}' with {} stages", self.name, stages.len());

        Ok(Pipeline {
            name: self.name.clone(),
            process,
            stages,
        })
    }

    /// Build a pipeline from the stages listed in a crew manifest
    pub fn from_manifest(store: &'a ConfigStore, manifest: &CrewManifest) -> CrewResult<Pipeline> {
        let mut builder = Self::new(store).named(manifest.name.clone());
        for entry in &manifest.stages {
            builder.add_stage(
                entry.agent.clone(),
                entry.task.clone(),
                entry.output_file.as_deref(),
            )?;
        }
        builder.build(manifest.process)
    }

    fn resolve(&self, draft: &StageDraft) -> CrewResult<Stage> {
        let agent_record = self.store.get(Namespace::Agents, &draft.agent_id)?;
        let task_record = self.store.get(Namespace::Tasks, &draft.task_id)?;

        let agent = StageFactory::build_agent(agent_record)?;
        let task = StageFactory::build_task(task_record)?;

        if let Some(declared) = &task.agent {
            if declared != &draft.agent_id {
                return Err(CrewError::invalid(
                    &draft.task_id,
                    format!(
                        "task declares agent '{}' but the stage binds '{}'",
                        declared, draft.agent_id
                    ),
                ));
            }
        }

        let output_path = match &draft.output_path {
            Some(raw) => Some(StageFactory::validate_output_path(&draft.task_id, raw)?),
            None => task.output_file.clone(),
        };

        Ok(Stage {
            id: draft.task_id.clone(),
            agent,
            task,
            output_path,
        })
    }
}
