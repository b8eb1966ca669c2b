//! svgin - replaces SVG image references in rendered content with
//! sanitized inline markup.

mod cache;
mod cli;
mod config;
mod fetch;
mod logger;
mod merge;
mod pipeline;
mod sanitize;
mod upload;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    // `sanitize` is config-free: the allow-list is static and the
    // upload path touches neither origin nor cache.
    if let Commands::Sanitize { input, output } = &cli.command {
        return cli::sanitize::run(input, output.as_ref());
    }

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log!("error"; "{e}");
            std::process::exit(1);
        }
    };

    match &cli.command {
        Commands::Process { input, output } => {
            cli::process::run(&config, input.as_ref(), output.as_ref())
        }
        Commands::Cache { action } => cli::cache::run(&config, action),
        Commands::Sanitize { .. } => unreachable!("handled above"),
    }
}
