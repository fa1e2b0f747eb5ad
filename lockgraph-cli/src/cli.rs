//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "lockgraph.toml";

/// lockgraph -- catalog package lockfiles into one dependency graph and SBOM.
///
/// Use `lockgraph <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "lockgraph", version, about, long_about = None)]
pub struct Cli {
    /// Path to the lockgraph.toml configuration file.
    ///
    /// When omitted, `lockgraph.toml` is used if present, otherwise defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format for reports.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Catalog lockfiles and print the result.
    Scan(ScanArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// What `scan` prints on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScanFormat {
    /// Package table and summary.
    Table,
    /// Raw catalog JSON.
    Json,
    /// CycloneDX 1.5 JSON.
    Cyclonedx,
    /// SPDX 2.3 JSON.
    Spdx,
}

/// Catalog one or more directories (or lockfiles).
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Paths to scan (default: `catalog.scan_dirs` from config).
    pub paths: Vec<PathBuf>,

    /// Output document format (default: `catalog.output_format` from config).
    #[arg(short, long)]
    pub format: Option<ScanFormat>,

    /// Concurrent extraction workers (0 = number of cores).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Abort unstarted work after this many seconds (0 = no limit).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Exit with code 3 when any warning-level diagnostic was recorded.
    #[arg(long)]
    pub fail_on_diagnostics: bool,
}

// ---- config ----

/// Manage lockgraph configuration.
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
        /// Show only a specific section (general, catalog).
        #[arg(long)]
        section: Option<String>,
    },
}
