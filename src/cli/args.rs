//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// svgin inline-SVG pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: svgin.toml)
    #[arg(short = 'C', long, default_value = "svgin.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Replace SVG image references in a content fragment with inline markup
    #[command(visible_alias = "p")]
    Process {
        /// Input file (`-` or omitted reads stdin)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Sanitize an uploaded SVG file against the allow-list
    #[command(visible_alias = "s")]
    Sanitize {
        /// SVG file to sanitize
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

/// Cache subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum CacheAction {
    /// Remove every cache entry this tool owns (deactivation hook)
    Clear,
}
