//! Core domain models for crews
//!
//! This module defines configuration records, the stage factory, pipelines
//! and their builder, and the execution context threaded through a run.

pub mod config;
pub mod context;
pub mod crew;
pub mod error;
pub mod factory;
pub mod manifest;
pub mod pipeline;
pub mod stage;
pub mod state;

pub use config::{ConfigRecord, ConfigSource, ConfigStore, Namespace};
pub use context::*;
pub use crew::CrewDefinition;
pub use error::{render_chain, CrewError, CrewResult, StageFailure};
pub use factory::{AgentHandle, StageFactory, TaskHandle};
pub use manifest::{CrewManifest, StageEntry};
pub use pipeline::*;
pub use stage::*;
pub use state::*;
