//! Backend availability check run before any stage executes

use crate::agent::{AgentExecutor, BackendProvider};
use crate::core::{CrewError, CrewResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Hint shown when no backend is configured at all
pub const NO_BACKEND_HINT: &str =
    "Set OPENAI_API_KEY or declare an `llm` section in crew.yaml (provider: openai | command)";

/// Confirms an LLM backend can be constructed
pub struct PreflightValidator<'a> {
    provider: Option<&'a dyn BackendProvider>,
}

impl<'a> PreflightValidator<'a> {
    pub fn new(provider: Option<&'a dyn BackendProvider>) -> Self {
        Self { provider }
    }

    /// Fail with `BackendUnavailable` when no backend can be built
    pub fn check_backend_available(&self) -> CrewResult<()> {
        self.connect().map(|_| ())
    }

    /// Build the backend, reporting why it is unavailable otherwise
    pub fn connect(&self) -> CrewResult<Arc<dyn AgentExecutor>> {
        let provider = self.provider.ok_or_else(|| CrewError::BackendUnavailable {
            reason: "no backend configured".to_string(),
            hint: NO_BACKEND_HINT.to_string(),
        })?;

        debug!("Preflight: constructing '{}' backend", provider.name());

        let executor = provider
            .connect()
            .map_err(|e| CrewError::BackendUnavailable {
                reason: format!("{} backend: {}", provider.name(), e),
                hint: provider.remediation(),
            })?;

        info!("Backend '{}' is available", provider.name());
        Ok(executor)
    }
}
