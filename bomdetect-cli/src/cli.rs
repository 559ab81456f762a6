//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Default configuration file, silently skipped when missing.
pub const DEFAULT_CONFIG_PATH: &str = "bomdetect.toml";

/// bomdetect -- detect package ecosystems and write bill-of-materials documents.
///
/// Use `bomdetect <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "bomdetect", version, about, long_about = None)]
pub struct Cli {
    /// Path to the bomdetect.toml configuration file.
    ///
    /// When omitted, `bomdetect.toml` is used if it exists.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect projects under a directory and write bill-of-materials documents.
    Scan(ScanArgs),

    /// List known detector kinds and whether the configuration runs them.
    Detectors,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Detect projects and write bill-of-materials documents.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan (default: current directory).
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Directory the documents are written to.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Write a single document with this tag instead of one per project.
    #[arg(long)]
    pub aggregate_name: Option<String>,

    /// Explicit project name (wins over any detector suggestion).
    #[arg(long)]
    pub project_name: Option<String>,

    /// Explicit project version (wins over any detector suggestion).
    #[arg(long)]
    pub project_version: Option<String>,

    /// Detector kind whose suggestions are preferred (e.g. cargo, npm).
    #[arg(long)]
    pub preferred_detector: Option<String>,

    /// Only run detector kinds matching these glob patterns (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Never run detector kinds matching these glob patterns (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Document format (cyclonedx, spdx).
    #[arg(long)]
    pub format: Option<String>,

    /// Maximum directory depth searched below the scan root.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Skip detectors that need an external package manager.
    #[arg(long)]
    pub no_external_tools: bool,
}

// ---- config ----

/// Manage bomdetect configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, project, detectors, search, bom).
        #[arg(long)]
        section: Option<String>,
    },
}
