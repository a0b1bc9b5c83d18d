use anyhow::{Context, Result};
use crew::agent::{BackendProvider, PreflightValidator};
use crew::cli::commands::{CheckCommand, ListCommand, RunCommand, ValidateCommand};
use crew::cli::output::*;
use crew::cli::{Cli, Command};
use crew::core::{render_chain, CrewDefinition, Pipeline};
use crew::execution::{ExecutionEvent, PipelineRunner};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let result = match &cli.command {
        Command::Run(cmd) => run_crew(cmd, cli.verbose).await,
        Command::Validate(cmd) => validate_crew(cmd),
        Command::Check(cmd) => check_backend(cmd),
        Command::List(cmd) => list_crews(cmd),
    };

    if let Err(e) = result {
        eprintln!("\n{} {}", CROSS, style(format!("{:#}", e)).red());
        std::process::exit(1);
    }

    Ok(())
}

fn load_crew(dir: &Path) -> Result<CrewDefinition> {
    CrewDefinition::load(dir).with_context(|| format!("Failed to load crew from {}", dir.display()))
}

async fn run_crew(cmd: &RunCommand, verbose: bool) -> Result<()> {
    let crew = load_crew(&cmd.crew)?;
    let manifest = crew.manifest();

    println!("{} Loaded crew: {}", INFO, style(&manifest.name).bold());

    let pipeline = crew.pipeline().context("Failed to build pipeline")?;
    let context = crew.context(cmd.input.iter().cloned());
    for (key, value) in &cmd.input {
        println!(
            "{} Input override: {} = {}",
            INFO,
            style(key).cyan(),
            style(value).dim()
        );
    }

    // Preflight before any stage runs
    let backend = crew.backend();
    let agent = PreflightValidator::new(backend.as_ref().map(|b| b as &dyn BackendProvider))
        .connect()?;

    let mut runner = PipelineRunner::new(agent);
    if let Some(root) = &cmd.output_root {
        runner = runner.with_output_root(root.clone());
    }
    if let Some(secs) = manifest.default_timeout_secs {
        runner = runner.with_default_timeout(secs);
    }

    let progress = create_progress_bar(pipeline.len());
    let echo = verbose || manifest.verbose;
    let bar = progress.clone();
    runner.add_event_handler(move |event| {
        bar.println(format_execution_event(event));
        match event {
            ExecutionEvent::StageStarted { stage_id, .. } => bar.set_message(stage_id.clone()),
            ExecutionEvent::StageCompleted { output, .. } => {
                bar.inc(1);
                if echo {
                    bar.println(format_output(output, 20));
                }
            }
            _ => {}
        }
    });

    println!();
    let result = runner.run(&pipeline, &context).await;
    progress.finish_and_clear();
    let result = result?;

    if let Some(output) = result.final_output() {
        println!("\n{}", style("Final output:").bold());
        println!("{}", output);
    }

    println!(
        "\n{} {} completed {}",
        CHECK,
        style(pipeline.name()).bold(),
        style("successfully").green()
    );

    Ok(())
}

fn validate_crew(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating crew...", INFO);

    let crew = load_crew(&cmd.crew)?;
    let pipeline = crew.pipeline().context("Failed to build pipeline")?;

    println!("{} Crew configuration is valid!", CHECK);
    print_pipeline(&crew, &pipeline);

    if cmd.json {
        let stages: Vec<_> = pipeline
            .stages()
            .iter()
            .map(|stage| {
                serde_json::json!({
                    "id": stage.id,
                    "agent": stage.agent_id(),
                    "task": stage.task_id(),
                    "output_file": stage.output_path,
                })
            })
            .collect();
        let data = serde_json::json!({
            "name": pipeline.name(),
            "process": pipeline.process(),
            "inputs": crew.manifest().inputs,
            "stages": stages,
        });
        println!("\n{}", serde_json::to_string_pretty(&data)?);
    }

    Ok(())
}

fn print_pipeline(crew: &CrewDefinition, pipeline: &Pipeline) {
    println!("  Name: {}", style(pipeline.name()).bold());
    println!("  Process: {}", style(pipeline.process()).cyan());
    println!("  Inputs: {}", style(crew.manifest().inputs.len()).cyan());
    println!("  Stages:");
    for (i, stage) in pipeline.stages().iter().enumerate() {
        let output = stage
            .output_path
            .as_ref()
            .map(|p| format!(" -> {}", p.display()))
            .unwrap_or_default();
        println!(
            "    {}. {} {}{}",
            i + 1,
            style(&stage.id).cyan(),
            style(format!("({})", stage.agent_id())).dim(),
            output
        );
    }
}

fn check_backend(cmd: &CheckCommand) -> Result<()> {
    let crew = load_crew(&cmd.crew)?;
    let backend = crew.backend();

    PreflightValidator::new(backend.as_ref().map(|b| b as &dyn BackendProvider))
        .check_backend_available()?;

    let name = backend.as_ref().map(|b| b.name()).unwrap_or("none");
    println!("{} Backend {} is available", CHECK, style(name).green());
    Ok(())
}

fn list_crews(cmd: &ListCommand) -> Result<()> {
    let entries = std::fs::read_dir(&cmd.dir)
        .with_context(|| format!("Failed to read {}", cmd.dir.display()))?;

    let mut dirs: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| CrewDefinition::is_crew_dir(path))
        .collect();
    dirs.sort();

    if dirs.is_empty() {
        println!("{} No crews found in {}", INFO, cmd.dir.display());
        return Ok(());
    }

    println!("{} Crews in {}:", INFO, cmd.dir.display());
    for dir in &dirs {
        match CrewDefinition::load(dir) {
            Ok(crew) => {
                let manifest = crew.manifest();
                println!(
                    "  {} {} ({} stages){}",
                    style(&manifest.name).bold(),
                    style(dir.display()).dim(),
                    manifest.stages.len(),
                    manifest
                        .description
                        .as_ref()
                        .map(|d| format!(" - {}", d))
                        .unwrap_or_default()
                );
            }
            Err(e) => println!(
                "  {} {}: {}",
                WARN,
                style(dir.display()).dim(),
                style(render_chain(&e)).red()
            ),
        }
    }

    Ok(())
}
