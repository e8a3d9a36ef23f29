//! CLI module for Reelgraph
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{ArgsArgs, CompileArgs, ExportArgs};

/// Reelgraph timeline compiler
///
/// Compiles a multi-track editing timeline into an ffmpeg filter graph for
/// preview or export.
#[derive(Parser, Debug)]
#[command(name = "reelgraph")]
#[command(about = "Reelgraph - compile editing timelines into ffmpeg filter graphs")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (default: reelgraph.toml or config/reelgraph.toml)
    #[arg(long, global = true, env = "REELGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a project and print the filter graph
    Compile(CompileArgs),
    /// Render a project to a file with ffmpeg
    Export(ExportArgs),
    /// Print the ffmpeg command line an export would run
    Args(ArgsArgs),
}
