//! A crew directory: manifest plus agent and task configuration

use crate::agent::BackendConfig;
use crate::core::{
    config::ConfigStore,
    context::ExecutionContext,
    error::CrewResult,
    manifest::{CrewManifest, MANIFEST_FILE},
    pipeline::{Pipeline, PipelineBuilder},
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything loaded from one crew directory
#[derive(Debug, Clone)]
pub struct CrewDefinition {
    root: PathBuf,
    manifest: CrewManifest,
    store: ConfigStore,
}

impl CrewDefinition {
    /// Load `crew.yaml`, `agents.yaml` and `tasks.yaml` from `dir`
    pub fn load<P: AsRef<Path>>(dir: P) -> CrewResult<Self> {
        let root = dir.as_ref().to_path_buf();
        let manifest = CrewManifest::from_file(root.join(MANIFEST_FILE))?;
        let store = ConfigStore::from_dir(&root)?;

        debug!(
            "Loaded crew '{}' from {} ({} stages)",
            manifest.name,
            root.display(),
            manifest.stages.len()
        );

        Ok(Self {
            root,
            manifest,
            store,
        })
    }

    /// Whether `dir` looks like a crew directory
    pub fn is_crew_dir<P: AsRef<Path>>(dir: P) -> bool {
        dir.as_ref().join(MANIFEST_FILE).is_file()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &CrewManifest {
        &self.manifest
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Build the crew's pipeline
    pub fn pipeline(&self) -> CrewResult<Pipeline> {
        PipelineBuilder::from_manifest(&self.store, &self.manifest)
    }

    /// Manifest inputs with overrides applied on top
    pub fn context<I>(&self, overrides: I) -> ExecutionContext
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut context = ExecutionContext::from_inputs(self.manifest.inputs.clone());
        for (key, value) in overrides {
            context.set_variable(key, value);
        }
        context
    }

    /// The configured backend, falling back to environment detection
    pub fn backend(&self) -> Option<BackendConfig> {
        self.manifest.llm.clone().or_else(BackendConfig::detect)
    }
}
