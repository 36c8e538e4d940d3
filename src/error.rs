//! Error and warning taxonomy for generation runs.
//!
//! Fatal conditions travel as [`GeneratorError`] inside `anyhow::Error` so the
//! orchestrator can recover the kind at the domain boundary. Non-fatal findings are
//! collected as [`Warning`]s and never stop generation.

use std::fmt;

/// A fatal condition for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// The input document is missing, unparsable, or a required section is absent.
    Spec {
        /// What was wrong with the document
        message: String,
    },
    /// The external bundling step failed or timed out.
    Bundling {
        /// Exit status, timeout, or spawn failure description
        message: String,
    },
    /// Any other stage failure (e.g. an unwritable output path).
    Generation {
        /// Failure description
        message: String,
    },
}

impl GeneratorError {
    pub fn spec(message: impl Into<String>) -> Self {
        GeneratorError::Spec {
            message: message.into(),
        }
    }

    pub fn bundling(message: impl Into<String>) -> Self {
        GeneratorError::Bundling {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        GeneratorError::Generation {
            message: message.into(),
        }
    }

    /// The taxonomy bucket this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeneratorError::Spec { .. } => ErrorKind::SpecError,
            GeneratorError::Bundling { .. } => ErrorKind::BundlingFailure,
            GeneratorError::Generation { .. } => ErrorKind::GenerationError,
        }
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::Spec { message } => write!(f, "spec error: {message}"),
            GeneratorError::Bundling { message } => write!(f, "bundling failed: {message}"),
            GeneratorError::Generation { message } => write!(f, "generation failed: {message}"),
        }
    }
}

impl std::error::Error for GeneratorError {}

/// Kind of a fatal, per-domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorKind {
    SpecError,
    BundlingFailure,
    GenerationError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::SpecError => "SpecError",
            ErrorKind::BundlingFailure => "BundlingFailure",
            ErrorKind::GenerationError => "GenerationError",
        };
        write!(f, "{s}")
    }
}

/// Recover the taxonomy kind from an `anyhow` error chain.
///
/// Anything that is not a [`GeneratorError`] (I/O, template rendering, ...) counts as a
/// `GenerationError`.
#[must_use]
pub fn error_kind_of(err: &anyhow::Error) -> ErrorKind {
    err.chain()
        .find_map(|e| e.downcast_ref::<GeneratorError>())
        .map(GeneratorError::kind)
        .unwrap_or(ErrorKind::GenerationError)
}

/// Kind of a non-fatal finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningKind {
    /// A schema or response could not be confidently classified; a fallback was emitted.
    ClassificationAmbiguity,
    /// Related operations of one resource disagree structurally.
    SchemaMismatch,
    /// The document deviates from conventions the generator relies on (ids, refs).
    SpecIrregularity,
    /// A configuration option was accepted but has no effect.
    Unsupported,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WarningKind::ClassificationAmbiguity => "ClassificationAmbiguity",
            WarningKind::SchemaMismatch => "SchemaMismatch",
            WarningKind::SpecIrregularity => "SpecIrregularity",
            WarningKind::Unsupported => "Unsupported",
        };
        write!(f, "{s}")
    }
}

/// A non-fatal finding surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    /// Where it was found (e.g. `operation:listWidgets`, `resource:schedule`)
    pub location: String,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, location: impl Into<String>, message: impl Into<String>) -> Self {
        Warning {
            kind,
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn ambiguity(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::ClassificationAmbiguity, location, message)
    }

    pub fn mismatch(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::SchemaMismatch, location, message)
    }

    pub fn irregularity(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningKind::SpecIrregularity, location, message)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}
