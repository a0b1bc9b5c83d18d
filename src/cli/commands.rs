//! CLI command definitions

use clap::Args;
use std::path::PathBuf;

/// Run a crew
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Crew directory containing crew.yaml
    #[arg(short, long)]
    pub crew: PathBuf,

    /// Input overrides (key=value)
    #[arg(short, long, value_parser = parse_key_value)]
    pub input: Vec<(String, String)>,

    /// Directory that relative output files are written under
    #[arg(long)]
    pub output_root: Option<PathBuf>,
}

/// Build a crew's pipeline without running it
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Crew directory containing crew.yaml
    #[arg(short, long)]
    pub crew: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run only the backend preflight
#[derive(Debug, Args, Clone)]
pub struct CheckCommand {
    /// Crew directory containing crew.yaml
    #[arg(short, long)]
    pub crew: PathBuf,
}

/// List crews
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Directory to search
    #[arg(default_value = "crews")]
    pub dir: PathBuf,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("Invalid key=value pair: {}", s)),
    }
}
