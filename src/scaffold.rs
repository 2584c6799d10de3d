//! Multi-file responses: splitting model output into named files and writing
//! them below an output root.
//!
//! A response looks like
//!
//! ```text
//! optional preamble`````src/app.ts
//! file content
//! `````package.json
//! file content
//! ```
//!
//! Paths come straight from the model and are not sanitised: `..` components
//! can escape the output root. Such paths are logged at `warn` level.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{error, info, warn};

/// Separator placed in front of every file path.
pub const FILE_DELIMITER: &str = "`````";

/// Directory, relative to the working directory, that receives generated files.
pub const OUTPUT_ROOT: &str = "generated-api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Outcome of [`write_files`]. Every file is attempted; failures do not stop
/// the remaining writes.
#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl WriteReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Splits a multi-file response into files, in response order.
///
/// The fragment before the first delimiter is discarded. In every other
/// fragment the first line is the path and the rest is the content; fragments
/// with an empty first line are skipped.
pub fn split_files(text: &str) -> Vec<GeneratedFile> {
    text.split(FILE_DELIMITER)
        .skip(1)
        .filter_map(|fragment| {
            let (first_line, rest) = fragment.split_once('\n').unwrap_or((fragment, ""));
            let path = first_line.trim();
            if path.is_empty() {
                return None;
            }

            // The line break in front of the next delimiter is not content.
            let content = rest.strip_suffix('\n').unwrap_or(rest);
            let content = content.strip_suffix('\r').unwrap_or(content);

            Some(GeneratedFile {
                path: path.to_string(),
                content: content.to_string(),
            })
        })
        .collect()
}

/// Resolves a model-supplied path below `root`. Root and prefix components
/// are dropped so absolute paths stay under `root`; `..` is kept.
pub fn resolve_output_path(root: &Path, relative: &str) -> PathBuf {
    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

/// Writes each file below `root`, creating parent directories as needed.
/// Writes run sequentially in order; a failed write is recorded and the
/// next file is still attempted.
pub fn write_files(root: &Path, files: &[GeneratedFile]) -> WriteReport {
    let mut report = WriteReport::default();

    for file in files {
        if Path::new(&file.path)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            warn!("Generated path '{}' escapes the output root", file.path);
        }

        let target = resolve_output_path(root, &file.path);
        match write_one(&target, &file.content) {
            Ok(()) => {
                info!("Wrote {}", target.display());
                report.written.push(target);
            }
            Err(e) => {
                error!("Failed to write {}: {:#}", target.display(), e);
                report.failed.push((target, e));
            }
        }
    }

    report
}

fn write_one(target: &Path, content: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    fs::write(target, content).with_context(|| format!("writing {}", target.display()))?;
    Ok(())
}
