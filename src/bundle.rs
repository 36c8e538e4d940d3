//! External spec bundler invocation.
//!
//! Multi-file specs are flattened by an external tool before loading. The child
//! runs under a wall-clock limit and is killed when it overruns; every failure is
//! a [`GeneratorError::Bundling`] for the domain being processed.

use crate::config::BundlerConfig;
use crate::error::GeneratorError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Overrides [`BundlerConfig::command`] without touching the config file.
pub const BUNDLER_BIN_ENV: &str = "LAYERGEN_BUNDLER_BIN";

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Substitute `{input}` and `{output}` in the configured arguments.
pub fn substitute_args(args: &[String], input: &Path, output: &Path) -> Vec<String> {
    let input = input.display().to_string();
    let output = output.display().to_string();
    args.iter()
        .map(|arg| arg.replace("{input}", &input).replace("{output}", &output))
        .collect()
}

/// Run the bundler on `input`, writing the bundled document to `output`.
pub fn bundle_spec(config: &BundlerConfig, input: &Path, output: &Path) -> anyhow::Result<PathBuf> {
    let bin = std::env::var(BUNDLER_BIN_ENV).unwrap_or_else(|_| config.command.clone());
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            GeneratorError::bundling(format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    match std::fs::remove_file(output) {
        Ok(()) => tracing::debug!(output = %output.display(), "removed previous bundle"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(GeneratorError::bundling(format!(
                "cannot remove previous {}: {e}",
                output.display()
            ))
            .into());
        }
    }
    let args = substitute_args(&config.args, input, output);
    tracing::debug!(bin = %bin, args = ?args, "running spec bundler");

    let mut child = Command::new(&bin)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| GeneratorError::bundling(format!("failed to start '{bin}': {e}")))?;

    let limit = Duration::from_secs(config.timeout_secs);
    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => break,
            Ok(Some(status)) => {
                return Err(GeneratorError::bundling(format!("'{bin}' exited with {status}")).into());
            }
            Ok(None) if started.elapsed() >= limit => {
                if let Err(err) = child.kill() {
                    tracing::warn!(error = %err, "failed to kill timed out bundler");
                }
                if let Err(err) = child.wait() {
                    tracing::debug!(error = %err, "failed to reap bundler");
                }
                return Err(GeneratorError::bundling(format!(
                    "'{bin}' timed out after {}s",
                    config.timeout_secs
                ))
                .into());
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                return Err(GeneratorError::bundling(format!("waiting for '{bin}': {err}")).into());
            }
        }
    }

    if !output.exists() {
        return Err(GeneratorError::bundling(format!(
            "'{bin}' succeeded but wrote no {}",
            output.display()
        ))
        .into());
    }
    tracing::info!(
        output = %output.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "bundled spec"
    );
    Ok(output.to_path_buf())
}
