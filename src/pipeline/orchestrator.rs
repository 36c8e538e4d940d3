//! Sequential per-domain pipeline.
//!
//! Domains run one after another; stages within a domain run in [`Stage::ALL`]
//! order. A stage error is caught at the domain boundary and attributed to
//! `(domain, stage)`. Partial output stays on disk. With fail-fast the remaining
//! domains are skipped, otherwise the run continues with the next domain. The
//! cross-domain pass always runs afterwards over every domain on disk except the
//! ones that failed or were skipped in this run.

use super::postprocess::post_process;
use super::report::{DomainOutcome, RunReport, StageError, StageWarning};
use super::stage::{DomainState, Stage};
use crate::analysis::{Analyzer, DomainModel};
use crate::bundle::bundle_spec;
use crate::config::GeneratorConfig;
use crate::error::{error_kind_of, GeneratorError, Warning};
use crate::generator::{
    barrels, build_catalog, clean_dir, converters, handlers, prisma, repositories, test_support,
    types, write_all, GeneratedFile, OutputPart, TypeCatalog,
};
use crate::spec::{load_spec, SpecDocument};
use std::path::{Component, Path, PathBuf};
use tracing::info_span;

/// Per-invocation options layered over [`GeneratorConfig`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Domains to generate, in order
    pub domains: Vec<String>,
    /// Parts whose files are written; the rest are computed but not written
    pub parts: Vec<OutputPart>,
    /// Remove each domain's previous output before writing
    pub clean: bool,
    /// Run the configured bundler (when enabled in config)
    pub bundle: bool,
}

impl RunOptions {
    pub fn new(domains: Vec<String>) -> Self {
        RunOptions {
            domains,
            parts: OutputPart::ALL.to_vec(),
            clean: false,
            bundle: true,
        }
    }
}

/// Drives every selected domain through the stages.
pub struct Orchestrator {
    config: GeneratorConfig,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(config: GeneratorConfig, options: RunOptions) -> Self {
        Orchestrator { config, options }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run all domains, then the cross-domain pass.
    pub fn run(&self) -> RunReport {
        let mut report = RunReport {
            run_warnings: self.config.unsupported_warnings(),
            ..RunReport::default()
        };
        for warning in &report.run_warnings {
            tracing::warn!(kind = %warning.kind, location = %warning.location, "{}", warning.message);
        }

        let mut exports: Vec<(String, Vec<String>)> = Vec::new();
        let mut aborted = false;
        for domain in &self.options.domains {
            if aborted {
                tracing::info!(domain = %domain, "skipped after fail-fast abort");
                report.outcomes.push(DomainOutcome::skipped(domain.clone()));
                continue;
            }
            let (outcome, exported) = self.run_domain(domain);
            if outcome.is_done() {
                exports.push((domain.clone(), exported));
            } else if self.config.fail_fast {
                tracing::warn!(domain = %domain, "fail-fast: aborting remaining domains");
                aborted = true;
            }
            report.outcomes.push(outcome);
        }

        let excluded: Vec<String> = report
            .outcomes
            .iter()
            .filter(|o| !o.is_done())
            .map(|o| o.domain.clone())
            .collect();
        let span = info_span!("post_process");
        let _enter = span.enter();
        match post_process(
            &self.config.output_dir,
            &exports,
            &excluded,
            &self.config.shared_types,
        ) {
            Ok(summary) => report.post_process = Some(summary),
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "post-processing failed");
                report.post_process_error = Some(format!("{err:#}"));
            }
        }
        report
    }

    /// Run one domain to `Done` or `Failed`. Also returns the exported type names.
    pub fn run_domain(&self, domain: &str) -> (DomainOutcome, Vec<String>) {
        let span = info_span!("domain", domain = %domain);
        let _enter = span.enter();
        tracing::info!("generating domain");

        let mut run = DomainRun::new(&self.config, &self.options, domain);
        let error = run.drive(Stage::Done).err();
        match (&error, run.state) {
            (None, _) => tracing::info!(files = run.files_written, "domain done"),
            (Some(err), state) => tracing::error!(state = %state, "{err}"),
        }
        let outcome = DomainOutcome {
            domain: domain.to_string(),
            state: run.state,
            error,
            warnings: run.warnings,
            files_written: run.files_written,
        };
        (outcome, run.model.exported_types)
    }

    /// Load and analyze one domain without writing generated files.
    pub fn inspect(&self, domain: &str) -> Result<(DomainModel, Vec<StageWarning>), StageError> {
        let span = info_span!("inspect", domain = %domain);
        let _enter = span.enter();
        let options = RunOptions {
            parts: Vec::new(),
            clean: false,
            ..self.options.clone()
        };
        let mut run = DomainRun::new(&self.config, &options, domain);
        run.drive(Stage::SchemaExtracted)?;
        Ok((run.model, run.warnings))
    }
}

/// Mutable state of one domain while its stages run.
struct DomainRun<'a> {
    config: &'a GeneratorConfig,
    options: &'a RunOptions,
    domain: String,
    out_dir: PathBuf,
    state: DomainState,
    spec: Option<SpecDocument>,
    model: DomainModel,
    catalog: TypeCatalog,
    written: Vec<OutputPart>,
    files_written: usize,
    pending: Vec<Warning>,
    warnings: Vec<StageWarning>,
}

impl<'a> DomainRun<'a> {
    fn new(config: &'a GeneratorConfig, options: &'a RunOptions, domain: &str) -> Self {
        DomainRun {
            config,
            options,
            domain: domain.to_string(),
            out_dir: config.output_dir.join(domain),
            state: DomainState::Pending,
            spec: None,
            model: DomainModel::new(domain),
            catalog: TypeCatalog::default(),
            written: Vec::new(),
            files_written: 0,
            pending: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Run stages until `last` completes or one fails.
    fn drive(&mut self, last: Stage) -> Result<(), StageError> {
        while let Some(stage) = self.state.pending_stage() {
            if stage > last {
                break;
            }
            let span = info_span!("stage", stage = %stage);
            let _enter = span.enter();
            let result = self.execute(stage);
            self.attribute_warnings(stage);
            match result {
                Ok(()) => {
                    self.state.advance(stage);
                    tracing::debug!("stage complete");
                }
                Err(err) => {
                    self.state.fail();
                    return Err(StageError {
                        domain: self.domain.clone(),
                        stage,
                        kind: error_kind_of(&err),
                        message: format!("{err:#}"),
                    });
                }
            }
        }
        Ok(())
    }

    fn attribute_warnings(&mut self, stage: Stage) {
        for warning in self.pending.drain(..) {
            tracing::warn!(kind = %warning.kind, location = %warning.location, "{}", warning.message);
            self.warnings.push(StageWarning {
                domain: self.domain.clone(),
                stage,
                warning,
            });
        }
    }

    fn spec(&self) -> anyhow::Result<&SpecDocument> {
        self.spec
            .as_ref()
            .ok_or_else(|| GeneratorError::generation("document not loaded").into())
    }

    fn selected(&self, part: OutputPart) -> bool {
        self.options.parts.contains(&part)
    }

    /// Write `files` if `part` is selected in this run.
    fn emit(&mut self, part: OutputPart, files: Vec<GeneratedFile>) -> anyhow::Result<()> {
        if !self.selected(part) {
            tracing::debug!(part = %part, files = files.len(), "not selected; skipping write");
            return Ok(());
        }
        self.files_written += write_all(&self.out_dir, &files)?;
        if !self.written.contains(&part) {
            self.written.push(part);
        }
        Ok(())
    }

    fn execute(&mut self, stage: Stage) -> anyhow::Result<()> {
        match stage {
            Stage::Loaded => self.load(),
            Stage::SchemaExtracted => self.extract_schemas(),
            Stage::TypesExtracted => {
                let file = types::emit_types(&self.catalog)?;
                self.emit(OutputPart::Types, vec![file])
            }
            Stage::EntitySchemasCopied => {
                let file = prisma::emit(self.spec()?, &self.model)?;
                self.emit(OutputPart::Prisma, vec![file])
            }
            Stage::RepositoriesSynthesized => {
                let files = repositories::emit(&self.model)?;
                self.emit(OutputPart::Repositories, files)
            }
            Stage::HandlersSynthesized => {
                let files = handlers::emit(&self.model)?;
                self.emit(OutputPart::Handlers, files)
            }
            Stage::ConvertersSynthesized => {
                let files = converters::emit(self.spec()?, &self.model)?;
                self.emit(OutputPart::Converters, files)
            }
            Stage::TestSupportSynthesized => {
                let files = test_support::emit(self.spec()?, &self.model)?;
                self.emit(OutputPart::Tests, files)
            }
            Stage::Indexed => self.index(),
            Stage::Done => Ok(()),
        }
    }

    fn load(&mut self) -> anyhow::Result<()> {
        check_domain_name(&self.domain)?;
        let source = self.config.spec_path_for(&self.domain).ok_or_else(|| {
            GeneratorError::spec(format!(
                "no spec found for domain '{}' under {}",
                self.domain,
                self.config.specs_dir.display()
            ))
        })?;
        if self.options.clean && !self.options.parts.is_empty() {
            clean_dir(&self.out_dir)?;
            tracing::info!(dir = %self.out_dir.display(), "cleaned previous output");
        }
        let path = if self.config.bundler.enabled && self.options.bundle {
            let work_dir = self
                .config
                .bundler
                .work_dir
                .clone()
                .unwrap_or_else(|| self.config.output_dir.join(".bundled"));
            bundle_spec(
                &self.config.bundler,
                &source,
                &work_dir.join(format!("{}.json", self.domain)),
            )?
        } else {
            source
        };
        let (spec, warnings) = load_spec(&path)?;
        tracing::info!(
            spec = %path.display(),
            operations = spec.operations.len(),
            schemas = spec.components.schemas.len(),
            "loaded spec"
        );
        self.pending.extend(warnings);
        self.spec = Some(spec);
        Ok(())
    }

    fn extract_schemas(&mut self) -> anyhow::Result<()> {
        let spec = self
            .spec
            .as_ref()
            .ok_or_else(|| GeneratorError::generation("document not loaded"))?;
        let mut warnings = Vec::new();
        let analyzer = Analyzer::new(
            spec,
            &self.config.classification,
            self.config.verbs_for(&self.domain),
        );
        self.model.schemas = analyzer.classify_schemas();
        self.model.resources = analyzer.plan_resources(&mut warnings);
        self.catalog = build_catalog(spec, &self.model, &mut warnings);
        self.model.exported_types = self.catalog.type_names();
        self.model.validated_types = self.catalog.validator_names();
        self.model.warnings = warnings.clone();
        self.pending.extend(warnings);
        tracing::info!(
            resources = self.model.resources.len(),
            repositories = self.model.repositories().count(),
            types = self.model.exported_types.len(),
            "analyzed domain"
        );

        let file = types::emit_schemas(&self.catalog)?;
        self.emit(OutputPart::Schemas, vec![file])
    }

    /// Domain barrel over the modules present after this run.
    fn index(&mut self) -> anyhow::Result<()> {
        if self.options.parts.is_empty() {
            return Ok(());
        }
        let present: Vec<OutputPart> = OutputPart::ALL
            .into_iter()
            .filter(|part| self.written.contains(part) || module_exists(&self.out_dir, *part))
            .collect();
        let file = barrels::emit_domain_index(&present)?;
        self.files_written += write_all(&self.out_dir, &[file])?;
        Ok(())
    }
}

/// A domain name becomes a directory under `output_dir`: exactly one plain,
/// non-hidden path component.
fn check_domain_name(domain: &str) -> anyhow::Result<()> {
    let mut components = Path::new(domain).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single || domain.starts_with('.') || domain.contains(['/', '\\']) {
        return Err(GeneratorError::spec(format!(
            "invalid domain name '{domain}': expected a single directory name"
        ))
        .into());
    }
    Ok(())
}

/// Whether a previous run left `part`'s entry module in `dir`.
fn module_exists(dir: &Path, part: OutputPart) -> bool {
    let entry = match part {
        OutputPart::Types => "types.ts",
        OutputPart::Schemas => "schemas.ts",
        OutputPart::Repositories => "repositories/index.ts",
        OutputPart::Handlers => "handlers/index.ts",
        OutputPart::Converters => "converters/index.ts",
        OutputPart::Prisma | OutputPart::Tests => return false,
    };
    dir.join(entry).is_file()
}

#[cfg(test)]
mod tests;
