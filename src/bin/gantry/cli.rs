//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Gantry - settings and managed-model tooling for the Gantry build system
#[derive(Parser)]
#[command(name = "gantry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate every declared managed model type
    Check(CheckArgs),

    /// Show the resolved bindings for one declared type
    Describe(DescribeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args)]
pub struct CheckArgs {
    /// Directory to search for the settings file (defaults to cwd)
    pub path: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Load as a nested build (skips included-build registration)
    #[arg(long)]
    pub nested: bool,
}

#[derive(Args)]
pub struct DescribeArgs {
    /// The declared type to describe
    pub type_name: String,

    /// Bind against a declared delegate type
    #[arg(long)]
    pub delegate: Option<String>,

    /// Directory to search for the settings file (defaults to cwd)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
