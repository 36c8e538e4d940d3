//! File-system helpers for emitted output.

use anyhow::Context;
use std::path::{Path, PathBuf};

/// First line of every emitted TypeScript file.
pub const GENERATED_HEADER: &str = "// Code generated by layergen. DO NOT EDIT.";

/// A file produced by an emitter, relative to the domain output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let mut contents = contents.into();
        if !contents.ends_with('\n') {
            contents.push('\n');
        }
        GeneratedFile {
            path: path.into(),
            contents,
        }
    }
}

/// Create `dir` and its parents.
pub fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))
}

/// Remove `dir` and everything below it; a missing directory is fine.
pub fn clean_dir(dir: &Path) -> anyhow::Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to remove {}", dir.display()))?;
    }
    Ok(())
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// Write a batch of generated files below `base`.
pub fn write_all(base: &Path, files: &[GeneratedFile]) -> anyhow::Result<usize> {
    for file in files {
        write_file(&base.join(&file.path), &file.contents)?;
    }
    Ok(files.len())
}
