//! CLI output formatting

use crate::{core::ExecutionStatus, execution::ExecutionEvent};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static FILE: Emoji<'_, '_> = Emoji("📄 ", "- ");

/// Create a progress bar over the stages of a run
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Idle => style("IDLE").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an execution event for display
///
/// `StageCompleted` only reports the stage; output echo is handled by the caller.
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name,
            total_stages,
        } => format!(
            "{} Starting crew {} with {} stages ({})",
            ROCKET,
            style(pipeline_name).bold(),
            total_stages,
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StageStarted {
            stage_id,
            agent_id,
            index,
            total,
        } => format!(
            "{} [{}/{}] {} {}",
            SPINNER,
            index + 1,
            total,
            style(stage_id).cyan(),
            style(format!("({})", agent_id)).dim()
        ),
        ExecutionEvent::StageCompleted { stage_id, .. } => {
            format!("{} {}", CHECK, style(stage_id).green())
        }
        ExecutionEvent::OutputWritten { stage_id, path } => format!(
            "{} {} wrote {}",
            FILE,
            style(stage_id).dim(),
            style(path.display()).underlined()
        ),
        ExecutionEvent::StageFailed { stage_id, error } => {
            format!("{} {}: {}", CROSS, style(stage_id).red(), style(error).dim())
        }
        ExecutionEvent::PipelineCompleted {
            execution_id,
            status,
        } => format!(
            "{} Crew ({}) {}",
            INFO,
            style(&execution_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    }
}

/// Format stage output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}
