//! `sanitize` command: upload-path check for a single file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::log;
use crate::upload::{self, UploadError};
use crate::utils::mime;

/// Sanitize one file the way the upload collaborator would.
///
/// Unlike the render pipeline, a rejected file is a hard error here:
/// the whole point of the upload path is refusing unsafe content.
pub fn run(input: &Path, output: Option<&PathBuf>) -> Result<()> {
    let buffer =
        std::fs::read(input).with_context(|| format!("failed to read `{}`", input.display()))?;
    let declared = mime::from_path(input);

    match upload::sanitize_upload(&buffer, declared) {
        Ok(Some(sanitized)) => {
            write_output(output.map(PathBuf::as_path), &sanitized)?;
            log!("sanitize"; "{}: accepted ({} -> {} bytes)",
                input.display(), buffer.len(), sanitized.len());
            Ok(())
        }
        Ok(None) => {
            bail!(
                "`{}` does not look like an SVG file (detected {})",
                input.display(),
                declared
            );
        }
        Err(e @ UploadError::Rejected) | Err(e @ UploadError::InvalidEncoding) => {
            bail!("upload rejected for `{}`: {}", input.display(), e);
        }
    }
}

fn write_output(output: Option<&Path>, content: &[u8]) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("failed to write `{}`", path.display())),
        None => {
            use std::io::Write;
            std::io::stdout()
                .write_all(content)
                .context("failed to write stdout")
        }
    }
}
