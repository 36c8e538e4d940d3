//! Generator configuration loaded from `layergen.toml`
//!
//! Every key is optional; a missing default config file yields [`GeneratorConfig::default`].
//! CLI flags are applied on top by the command layer.

use crate::error::{Warning, WarningKind};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "layergen.toml";

/// Top-level generator configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base directory for generated output (one subdirectory per domain)
    pub output_dir: PathBuf,
    /// Directory searched for domain specs
    pub specs_dir: PathBuf,
    /// File names accepted as `<specs_dir>/<domain>/<name>`
    pub spec_file_names: Vec<String>,
    /// Stop the whole run at the first failed domain
    pub fail_fast: bool,
    /// Accepted for compatibility; domains always run sequentially
    pub parallel: bool,
    /// Accepted for compatibility; partial output of failed domains is kept
    pub rollback: bool,
    pub bundler: BundlerConfig,
    pub classification: ClassificationConfig,
    pub verbs: VerbConfig,
    /// Per-domain overrides keyed by domain name
    pub domains: BTreeMap<String, DomainConfig>,
    pub shared_types: SharedTypesConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            output_dir: PathBuf::from("generated"),
            specs_dir: PathBuf::from("specs"),
            spec_file_names: vec![
                "openapi.yaml".to_string(),
                "openapi.yml".to_string(),
                "openapi.json".to_string(),
            ],
            fail_fast: false,
            parallel: false,
            rollback: false,
            bundler: BundlerConfig::default(),
            classification: ClassificationConfig::default(),
            verbs: VerbConfig::default(),
            domains: BTreeMap::new(),
            shared_types: SharedTypesConfig::default(),
        }
    }
}

/// External spec bundler invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BundlerConfig {
    pub enabled: bool,
    /// Executable name or path; `LAYERGEN_BUNDLER_BIN` overrides it
    pub command: String,
    /// Arguments; `{input}` and `{output}` are substituted per domain
    pub args: Vec<String>,
    /// Wall-clock limit after which the child is killed
    pub timeout_secs: u64,
    /// Directory for bundled documents (defaults to `<output_dir>/.bundled`)
    pub work_dir: Option<PathBuf>,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        BundlerConfig {
            enabled: false,
            command: "redocly".to_string(),
            args: vec![
                "bundle".to_string(),
                "{input}".to_string(),
                "--ext".to_string(),
                "json".to_string(),
                "-o".to_string(),
                "{output}".to_string(),
            ],
            timeout_secs: 120,
            work_dir: None,
        }
    }
}

/// Conventional marker schema names used by response classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClassificationConfig {
    /// `data: $ref <marker>` classifies as an operation-success response
    pub operation_success_markers: Vec<String>,
    /// `allOf` members naming the `{data, meta}` envelope itself
    pub envelope_markers: Vec<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        ClassificationConfig {
            operation_success_markers: vec!["OperationSuccess".to_string()],
            envelope_markers: vec![
                "ResponseEnvelope".to_string(),
                "SuccessEnvelope".to_string(),
                "ApiResponse".to_string(),
            ],
        }
    }
}

/// Verb names counted as create/update/delete capability
///
/// Values are verb names as produced by verb mapping: `list`, `get`, `create`, `update`,
/// `patch`, `delete`, `action`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerbConfig {
    pub create: BTreeSet<String>,
    pub update: BTreeSet<String>,
    pub delete: BTreeSet<String>,
}

impl Default for VerbConfig {
    fn default() -> Self {
        VerbConfig {
            create: BTreeSet::from(["create".to_string()]),
            update: BTreeSet::from(["update".to_string()]),
            delete: BTreeSet::from(["delete".to_string()]),
        }
    }
}

/// `[domains.<name>]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DomainConfig {
    /// Explicit spec path, relative to the working directory
    pub spec: Option<PathBuf>,
    /// Replaces the global verb sets for this domain
    pub verbs: Option<VerbConfig>,
}

/// Ownership rules for type names emitted by more than one domain
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SharedTypesConfig {
    /// Domains in descending ownership priority; unlisted domains rank alphabetically after
    pub owner_priority: Vec<String>,
}

impl GeneratorConfig {
    /// Verb sets in effect for `domain`.
    pub fn verbs_for(&self, domain: &str) -> &VerbConfig {
        self.domains
            .get(domain)
            .and_then(|d| d.verbs.as_ref())
            .unwrap_or(&self.verbs)
    }

    /// Where the spec for `domain` lives, if it can be found.
    ///
    /// An explicit `[domains.<name>].spec` wins, then `<specs_dir>/<domain>/<spec_file_name>`,
    /// then `<specs_dir>/<domain>.{yaml,yml,json}`.
    pub fn spec_path_for(&self, domain: &str) -> Option<PathBuf> {
        if let Some(explicit) = self.domains.get(domain).and_then(|d| d.spec.clone()) {
            return Some(explicit);
        }
        let dir = self.specs_dir.join(domain);
        for name in &self.spec_file_names {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        ["yaml", "yml", "json"]
            .iter()
            .map(|ext| self.specs_dir.join(format!("{domain}.{ext}")))
            .find(|p| p.is_file())
    }

    /// Every domain known to the configuration or present under `specs_dir`, sorted.
    pub fn discover_domains(&self) -> Vec<String> {
        let mut domains: BTreeSet<String> = self.domains.keys().cloned().collect();
        if let Ok(entries) = std::fs::read_dir(&self.specs_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    let has_spec = self
                        .spec_file_names
                        .iter()
                        .any(|name| path.join(name).is_file());
                    if has_spec {
                        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                            domains.insert(name.to_string());
                        }
                    }
                } else if let (Some(stem), Some(ext)) = (
                    path.file_stem().and_then(|s| s.to_str()),
                    path.extension().and_then(|s| s.to_str()),
                ) {
                    if matches!(ext, "yaml" | "yml" | "json") {
                        domains.insert(stem.to_string());
                    }
                }
            }
        }
        domains.into_iter().collect()
    }

    /// Options that are accepted but have no effect.
    pub fn unsupported_warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();
        if self.parallel {
            warnings.push(Warning::new(
                WarningKind::Unsupported,
                "config:parallel",
                "parallel execution is not supported; domains run sequentially",
            ));
        }
        if self.rollback {
            warnings.push(Warning::new(
                WarningKind::Unsupported,
                "config:rollback",
                "rollback is not supported; partial output of failed domains is retained",
            ));
        }
        warnings
    }
}

/// Load a configuration file.
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but cannot be read
/// or parsed.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let config: GeneratorConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
    Ok(Some(config))
}

/// Resolve the effective configuration.
///
/// An explicitly given path must exist; the default `layergen.toml` is optional.
pub fn resolve_config(explicit_path: Option<&Path>) -> anyhow::Result<GeneratorConfig> {
    match explicit_path {
        Some(path) => load_config(path)?
            .ok_or_else(|| anyhow::anyhow!("Config file not found: {}", path.display())),
        None => Ok(load_config(Path::new(DEFAULT_CONFIG_FILE))?.unwrap_or_default()),
    }
}
