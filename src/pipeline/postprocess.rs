//! Cross-domain post-processing.
//!
//! Runs once after every domain has finished. It discovers the domain directories
//! under the output root, drops the ones whose domain failed or was skipped in this
//! run, assigns each exported type name a single owning domain and writes:
//!
//! - `<output_dir>/shared/types.ts` re-exporting every type once, from its owner
//! - `<output_dir>/index.ts` re-exporting each domain under a namespace

use super::report::PostProcessSummary;
use crate::casing::{is_identifier, to_camel_case};
use crate::config::SharedTypesConfig;
use crate::generator::templates::{render_with_header, BarrelTemplate};
use crate::generator::{write_all, GeneratedFile};
use anyhow::Context;
use std::collections::{BTreeMap, BTreeSet};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use walkdir::WalkDir;

static EXPORTED_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^export (?:interface|type) ([A-Za-z_$][A-Za-z0-9_$]*)")
        .expect("exported type regex should be valid")
});

/// Directory holding the deduplicated type module.
pub const SHARED_DIR: &str = "shared";

/// Ownership of type names across domains, built once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedTypeRegistry {
    /// type name → owning domain
    owners: BTreeMap<String, String>,
    /// type name → every domain declaring it, in rank order
    declared_by: BTreeMap<String, Vec<String>>,
}

impl SharedTypeRegistry {
    /// Build the registry from `(domain, exported type names)` pairs.
    ///
    /// Domains listed in `priority` outrank everything else, in list order; the
    /// rest rank alphabetically.
    pub fn build(exports: &[(String, Vec<String>)], priority: &[String]) -> Self {
        let rank = |domain: &str| -> (u8, String) {
            priority
                .iter()
                .position(|p| p == domain)
                .map_or((1, domain.to_string()), |i| (0, format!("{i:08}")))
        };
        let mut ranked: Vec<&(String, Vec<String>)> = exports.iter().collect();
        ranked.sort_by_key(|(domain, _)| rank(domain.as_str()));

        let mut registry = SharedTypeRegistry::default();
        for (domain, names) in ranked {
            for name in names {
                registry
                    .owners
                    .entry(name.clone())
                    .or_insert_with(|| domain.clone());
                let declared = registry.declared_by.entry(name.clone()).or_default();
                if !declared.contains(domain) {
                    declared.push(domain.clone());
                }
            }
        }
        registry
    }

    pub fn owner_of(&self, type_name: &str) -> Option<&str> {
        self.owners.get(type_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Names declared by more than one domain: `(name, owner, other domains)`.
    pub fn collisions(&self) -> Vec<(String, String, Vec<String>)> {
        self.declared_by
            .iter()
            .filter(|(_, domains)| domains.len() > 1)
            .filter_map(|(name, domains)| {
                let owner = self.owners.get(name)?;
                let others = domains.iter().filter(|d| *d != owner).cloned().collect();
                Some((name.clone(), owner.clone(), others))
            })
            .collect()
    }

    /// Re-export lines grouped by owner, owners and names sorted.
    pub fn export_lines(&self) -> Vec<String> {
        let mut by_owner: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (name, owner) in &self.owners {
            by_owner.entry(owner.as_str()).or_default().push(name.as_str());
        }
        by_owner
            .into_iter()
            .map(|(owner, names)| {
                format!("export type {{ {} }} from '../{owner}/types';", names.join(", "))
            })
            .collect()
    }
}

/// Domain directories directly under `output_dir` that carry a domain barrel.
pub fn discover_domain_dirs(output_dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut domains = BTreeSet::new();
    if !output_dir.exists() {
        return Ok(Vec::new());
    }
    for entry in WalkDir::new(output_dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to scan {}", output_dir.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with('.') || name == SHARED_DIR {
            continue;
        }
        if entry.path().join("index.ts").is_file() {
            domains.insert(name.to_string());
        }
    }
    Ok(domains.into_iter().collect())
}

/// Type names declared by a domain's `types.ts` from an earlier run.
pub fn read_exported_types(types_file: &Path) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(types_file)
        .with_context(|| format!("Failed to read {}", types_file.display()))?;
    let names: BTreeSet<String> = EXPORTED_TYPE
        .captures_iter(&text)
        .map(|c| c[1].to_string())
        .collect();
    Ok(names.into_iter().collect())
}

/// Namespace a domain is re-exported under from the root barrel.
pub fn domain_namespace(domain: &str) -> String {
    let camel = to_camel_case(domain);
    if is_identifier(&camel) {
        camel
    } else {
        format!("_{camel}")
    }
}

/// Run the cross-domain pass over every discovered domain not in `excluded`.
///
/// `exports` lists the type names each domain emitted in this run. Domains left
/// on disk by earlier runs contribute the names their `types.ts` declares.
/// Domains whose `types.ts` is not on disk cannot own a name.
pub fn post_process(
    output_dir: &Path,
    exports: &[(String, Vec<String>)],
    excluded: &[String],
    config: &SharedTypesConfig,
) -> anyhow::Result<PostProcessSummary> {
    let discovered = discover_domain_dirs(output_dir)?;
    let domains: Vec<String> = discovered
        .into_iter()
        .filter(|d| !excluded.contains(d))
        .collect();
    if domains.is_empty() {
        tracing::info!("no completed domains; skipping cross-domain barrels");
        return Ok(PostProcessSummary::default());
    }

    let mut eligible: Vec<(String, Vec<String>)> = Vec::new();
    for domain in &domains {
        let types_file = output_dir.join(domain).join("types.ts");
        if !types_file.is_file() {
            continue;
        }
        let names = match exports.iter().find(|(d, _)| d == domain) {
            Some((_, names)) => names.clone(),
            None => {
                tracing::debug!(domain = %domain, "reading types from a previous run");
                read_exported_types(&types_file)?
            }
        };
        eligible.push((domain.clone(), names));
    }
    let registry = SharedTypeRegistry::build(&eligible, &config.owner_priority);
    for (name, owner, others) in registry.collisions() {
        tracing::info!(type_name = %name, owner = %owner, others = ?others, "shared type collision");
    }

    let mut files = vec![GeneratedFile::new(
        Path::new(SHARED_DIR).join("types.ts"),
        render_with_header(&BarrelTemplate {
            lines: registry.export_lines(),
        })?,
    )];

    let mut root_lines: Vec<String> = domains
        .iter()
        .map(|d| format!("export * as {} from './{d}';", domain_namespace(d)))
        .collect();
    root_lines.push(format!("export * as {SHARED_DIR} from './{SHARED_DIR}/types';"));
    files.push(GeneratedFile::new(
        "index.ts",
        render_with_header(&BarrelTemplate { lines: root_lines })?,
    ));

    let files_written = write_all(output_dir, &files)?;
    tracing::info!(
        domains = domains.len(),
        shared_types = registry.len(),
        "wrote cross-domain barrels"
    );
    Ok(PostProcessSummary {
        collisions: registry.collisions(),
        shared_types: registry.len(),
        domains,
        files_written,
    })
}
