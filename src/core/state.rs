//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall pipeline execution status
///
/// Transitions: `Idle -> Running -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Pipeline has not started
    Idle,
    /// Pipeline is currently running
    Running,
    /// Every stage completed
    Completed,
    /// A stage failed and the run was aborted
    Failed,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed)
    }
}

/// State of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// Unique execution ID
    pub execution_id: Uuid,

    /// Current execution status
    pub status: ExecutionStatus,

    /// When execution started
    pub started_at: Option<DateTime<Utc>>,

    /// When execution completed/failed
    pub completed_at: Option<DateTime<Utc>>,

    /// Total number of stages
    pub total_stages: usize,

    /// Number of completed stages
    pub completed_stages: usize,

    /// Stage that aborted the run
    pub failed_stage: Option<String>,
}

impl PipelineState {
    /// Create a new idle state
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Idle,
            started_at: None,
            completed_at: None,
            total_stages: 0,
            completed_stages: 0,
            failed_stage: None,
        }
    }

    /// Mark pipeline as started
    pub fn start(&mut self, total_stages: usize) {
        debug_assert_eq!(self.status, ExecutionStatus::Idle);
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
        self.total_stages = total_stages;
    }

    /// Count a completed stage
    pub fn stage_completed(&mut self) {
        self.completed_stages += 1;
    }

    /// Mark pipeline as completed
    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark pipeline as failed at the given stage
    pub fn fail(&mut self, stage_id: &str) {
        self.status = ExecutionStatus::Failed;
        self.failed_stage = Some(stage_id.to_string());
        self.completed_at = Some(Utc::now());
    }

    /// Calculate progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_stages == 0 {
            return 0.0;
        }
        self.completed_stages as f64 / self.total_stages as f64
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}
