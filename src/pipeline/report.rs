//! Run results and the operator-facing summary.

use super::stage::{DomainState, Stage};
use crate::error::{ErrorKind, Warning};
use std::fmt;

/// A fatal error attributed to the domain and stage that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageError {
    pub domain: String,
    pub stage: Stage,
    pub kind: ErrorKind,
    /// Full error chain, outermost context first
    pub message: String,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {}: [{}] {}",
            self.domain, self.stage, self.kind, self.message
        )
    }
}

/// A warning attributed to the domain and stage that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageWarning {
    pub domain: String,
    pub stage: Stage,
    pub warning: Warning,
}

impl fmt::Display for StageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}: {}", self.domain, self.stage, self.warning)
    }
}

/// Result of one domain's run.
#[derive(Debug, Clone)]
pub struct DomainOutcome {
    pub domain: String,
    pub state: DomainState,
    pub error: Option<StageError>,
    pub warnings: Vec<StageWarning>,
    /// Number of files written for this domain
    pub files_written: usize,
}

impl DomainOutcome {
    pub fn skipped(domain: impl Into<String>) -> Self {
        DomainOutcome {
            domain: domain.into(),
            state: DomainState::Skipped,
            error: None,
            warnings: Vec::new(),
            files_written: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }
}

/// What the cross-domain pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostProcessSummary {
    /// Domains included in the cross-domain barrels
    pub domains: Vec<String>,
    /// Distinct type names re-exported from `shared/types.ts`
    pub shared_types: usize,
    /// `(type name, owning domain, other domains declaring it)`
    pub collisions: Vec<(String, String, Vec<String>)>,
    pub files_written: usize,
}

/// Everything a `generate` run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outcomes: Vec<DomainOutcome>,
    /// Findings not tied to a domain (e.g. ignored config options)
    pub run_warnings: Vec<Warning>,
    pub post_process: Option<PostProcessSummary>,
    pub post_process_error: Option<String>,
}

impl RunReport {
    /// True iff every selected domain reached `Done` and post-processing succeeded.
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(DomainOutcome::is_done) && self.post_process_error.is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &StageError> {
        self.outcomes.iter().filter_map(|o| o.error.as_ref())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StageWarning> {
        self.outcomes.iter().flat_map(|o| o.warnings.iter())
    }

    pub fn outcome(&self, domain: &str) -> Option<&DomainOutcome> {
        self.outcomes.iter().find(|o| o.domain == domain)
    }

    /// Print the per-domain summary, warnings and errors.
    pub fn print_summary(&self) {
        println!("\n📄 Generation summary");
        for outcome in &self.outcomes {
            let marker = match outcome.state {
                DomainState::Reached(Stage::Done) => "✅",
                DomainState::Failed { .. } => "❌",
                _ => "⏭️ ",
            };
            println!(
                "  {marker} {:<24} {:<32} {} file(s), {} warning(s)",
                outcome.domain,
                outcome.state.to_string(),
                outcome.files_written,
                outcome.warnings.len()
            );
        }

        if let Some(post) = &self.post_process {
            println!(
                "  ℹ️  shared: {} type(s) across {} domain(s), {} collision(s)",
                post.shared_types,
                post.domains.len(),
                post.collisions.len()
            );
            for (name, owner, others) in &post.collisions {
                println!("      {name}: owned by {owner}, also in {}", others.join(", "));
            }
        }

        if !self.run_warnings.is_empty() || self.warnings().next().is_some() {
            println!("\n⚠️  Warnings");
            for warning in &self.run_warnings {
                println!("  - {warning}");
            }
            for warning in self.warnings() {
                println!("  - {warning}");
            }
        }

        if self.errors().next().is_some() || self.post_process_error.is_some() {
            eprintln!("\n❌ Errors");
            for error in self.errors() {
                eprintln!("  - {error}");
            }
            if let Some(err) = &self.post_process_error {
                eprintln!("  - post-processing: {err}");
            }
        }
    }
}
