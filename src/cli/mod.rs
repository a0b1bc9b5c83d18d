//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{CheckCommand, ListCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Sequential LLM crew runner
#[derive(Debug, Parser, Clone)]
#[command(name = "crew")]
#[command(version = "0.1.0")]
#[command(about = "Run crews of LLM agents as sequential pipelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a crew
    Run(RunCommand),

    /// Build a crew's pipeline without running it
    Validate(ValidateCommand),

    /// Check that an LLM backend is available for a crew
    Check(CheckCommand),

    /// List crews under a directory
    List(ListCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
