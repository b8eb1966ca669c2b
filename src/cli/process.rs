//! `process` command: transform a content fragment.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cache::{CacheStore, DiskStore, MemoryStore};
use crate::config::Config;
use crate::debug;
use crate::fetch::Fetcher;
use crate::pipeline::InlinePipeline;

/// Read a fragment, run the inline pipeline over it, write the result.
///
/// The pipeline never fails the fragment: on any per-reference error the
/// output still carries the original reference, so this command only
/// errors on IO.
pub fn run(config: &Config, input: Option<&PathBuf>, output: Option<&PathBuf>) -> Result<()> {
    let fragment = read_input(input.map(PathBuf::as_path))?;

    let store: Box<dyn CacheStore> = if config.cache.persistent {
        Box::new(DiskStore::new(config.cache_dir()))
    } else {
        Box::new(MemoryStore::new())
    };
    let fetcher = Fetcher::new(config.timeout(), config.relax_tls())?;
    let pipeline = InlinePipeline::new(config.origin(), config.ttl(), store.as_ref(), &fetcher);

    let result = pipeline.process(&fragment);
    debug!("process"; "{} bytes in, {} bytes out", fragment.len(), result.len());

    write_output(output.map(PathBuf::as_path), &result)
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("failed to write `{}`", path.display())),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}
