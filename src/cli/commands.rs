use crate::analysis::DomainModel;
use crate::config::{resolve_config, GeneratorConfig};
use crate::generator::OutputPart;
use crate::pipeline::{Orchestrator, RunOptions, StageWarning};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line interface for layergen
///
/// Generates layered TypeScript service code from per-domain OpenAPI specs.
#[derive(Parser)]
#[command(name = "layergen")]
#[command(about = "OpenAPI-driven layered TypeScript generator", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate code for one or more domains
    Generate {
        /// Domain names, or `all` for every discovered domain
        #[arg(default_value = "all")]
        domains: Vec<String>,

        /// Path to the configuration file (default: ./layergen.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Base output directory (overrides `output_dir`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Limit writing to specific parts (comma-separated or repeated)
        #[arg(long, value_enum, num_args = 1.., value_delimiter = ',')]
        only: Option<Vec<OnlyPart>>,

        /// Remove each domain's previous output before writing
        #[arg(long, default_value_t = false)]
        clean: bool,

        /// Stop at the first failed domain
        #[arg(long, default_value_t = false)]
        fail_fast: bool,

        /// Load specs directly even when the bundler is enabled
        #[arg(long, default_value_t = false)]
        no_bundle: bool,
    },
    /// Print the analysis of one domain without writing files
    Inspect {
        /// Domain name
        domain: String,

        /// Path to the configuration file (default: ./layergen.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Load the spec directly even when the bundler is enabled
        #[arg(long, default_value_t = false)]
        no_bundle: bool,
    },
}

/// Parts that can be selected with `--only`
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnlyPart {
    /// `types.ts`
    Types,
    /// `schemas.ts` validators
    Schemas,
    /// Repository interfaces
    Repositories,
    /// Handler modules
    Handlers,
    /// Entity converters
    Converters,
    /// `prisma/schema.prisma`
    Prisma,
    /// Test factories and repository mocks
    Tests,
}

impl From<OnlyPart> for OutputPart {
    fn from(part: OnlyPart) -> Self {
        match part {
            OnlyPart::Types => OutputPart::Types,
            OnlyPart::Schemas => OutputPart::Schemas,
            OnlyPart::Repositories => OutputPart::Repositories,
            OnlyPart::Handlers => OutputPart::Handlers,
            OnlyPart::Converters => OutputPart::Converters,
            OnlyPart::Prisma => OutputPart::Prisma,
            OnlyPart::Tests => OutputPart::Tests,
        }
    }
}

/// Convert `--only` to the parts written. `None` selects everything.
pub(crate) fn selected_parts(only: Option<&[OnlyPart]>) -> Vec<OutputPart> {
    match only {
        None => OutputPart::ALL.to_vec(),
        Some(parts) => OutputPart::ALL
            .into_iter()
            .filter(|p| parts.iter().any(|o| OutputPart::from(*o) == *p))
            .collect(),
    }
}

/// Expand `all` and drop duplicates, keeping first-seen order.
pub(crate) fn resolve_domains(requested: &[String], config: &GeneratorConfig) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    for name in requested {
        let expanded = if name.eq_ignore_ascii_case("all") {
            config.discover_domains()
        } else {
            vec![name.clone()]
        };
        for domain in expanded {
            if !domains.contains(&domain) {
                domains.push(domain);
            }
        }
    }
    domains
}

/// Parse the process arguments and execute the command.
///
/// Returns `Ok(true)` when every selected domain completed.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or no domain was found.
/// Per-domain failures are reported in the summary and yield `Ok(false)`.
pub fn run_cli() -> anyhow::Result<bool> {
    run_command(Cli::parse())
}

/// Execute an already parsed command line.
pub fn run_command(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Generate {
            domains,
            config,
            output,
            only,
            clean,
            fail_fast,
            no_bundle,
        } => {
            let mut config = resolve_config(config.as_deref())?;
            if let Some(output) = output {
                config.output_dir = output;
            }
            config.fail_fast |= fail_fast;

            let domains = resolve_domains(&domains, &config);
            if domains.is_empty() {
                anyhow::bail!(
                    "No domains found (specs_dir: {})",
                    config.specs_dir.display()
                );
            }
            println!(
                "ℹ️  Generating {} domain(s) into {}",
                domains.len(),
                config.output_dir.display()
            );

            let options = RunOptions {
                parts: selected_parts(only.as_deref()),
                clean,
                bundle: !no_bundle,
                ..RunOptions::new(domains)
            };
            let report = Orchestrator::new(config, options).run();
            report.print_summary();
            Ok(report.success())
        }
        Commands::Inspect {
            domain,
            config,
            no_bundle,
        } => {
            let config = resolve_config(config.as_deref())?;
            let options = RunOptions {
                bundle: !no_bundle,
                ..RunOptions::new(vec![domain.clone()])
            };
            match Orchestrator::new(config, options).inspect(&domain) {
                Ok((model, warnings)) => {
                    print_inspection(&model, &warnings);
                    Ok(true)
                }
                Err(err) => {
                    eprintln!("❌ {err}");
                    Ok(false)
                }
            }
        }
    }
}

fn print_inspection(model: &DomainModel, warnings: &[StageWarning]) {
    println!("📄 Domain: {}", model.domain);
    for resource in &model.resources {
        match &resource.repository {
            Some(capability) => println!(
                "\n  {} → {} ({})",
                resource.name,
                capability.interface_name(),
                capability.base_type()
            ),
            None => println!("\n  {} → no repository", resource.name),
        }
        for op in &resource.operations {
            println!(
                "    {:<7} {:<40} {:<28} verb={:<7} status={:<4} shape={}{}",
                op.method.to_string(),
                op.path,
                op.operation_id,
                op.verb.to_string(),
                op.status.as_deref().unwrap_or("-"),
                op.shape,
                op.classification
                    .map(|c| format!(" [{c}]"))
                    .unwrap_or_default()
            );
        }
    }
    if !warnings.is_empty() {
        println!("\n⚠️  Warnings");
        for warning in warnings {
            println!("  - {warning}");
        }
    }
}
