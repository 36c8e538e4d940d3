//! Per-domain stage machine.

use std::fmt;

/// Stages a domain passes through, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Loaded,
    SchemaExtracted,
    TypesExtracted,
    EntitySchemasCopied,
    RepositoriesSynthesized,
    HandlersSynthesized,
    ConvertersSynthesized,
    TestSupportSynthesized,
    Indexed,
    Done,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::Loaded,
        Stage::SchemaExtracted,
        Stage::TypesExtracted,
        Stage::EntitySchemasCopied,
        Stage::RepositoriesSynthesized,
        Stage::HandlersSynthesized,
        Stage::ConvertersSynthesized,
        Stage::TestSupportSynthesized,
        Stage::Indexed,
        Stage::Done,
    ];

    /// The stage after this one; `Done` is terminal.
    pub fn next(self) -> Option<Stage> {
        let index = Stage::ALL.iter().position(|s| *s == self)?;
        Stage::ALL.get(index + 1).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Loaded => "Loaded",
            Stage::SchemaExtracted => "SchemaExtracted",
            Stage::TypesExtracted => "TypesExtracted",
            Stage::EntitySchemasCopied => "EntitySchemasCopied",
            Stage::RepositoriesSynthesized => "RepositoriesSynthesized",
            Stage::HandlersSynthesized => "HandlersSynthesized",
            Stage::ConvertersSynthesized => "ConvertersSynthesized",
            Stage::TestSupportSynthesized => "TestSupportSynthesized",
            Stage::Indexed => "Indexed",
            Stage::Done => "Done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a domain currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainState {
    /// Not started yet
    Pending,
    /// Last stage completed successfully
    Reached(Stage),
    /// The named stage raised; terminal
    Failed { stage: Stage },
    /// Never started because an earlier domain failed under fail-fast
    Skipped,
}

impl DomainState {
    /// The stage that would run next, if any.
    pub fn pending_stage(&self) -> Option<Stage> {
        match self {
            DomainState::Pending => Some(Stage::Loaded),
            DomainState::Reached(stage) => stage.next(),
            DomainState::Failed { .. } | DomainState::Skipped => None,
        }
    }

    /// Record completion of `stage`.
    ///
    /// Only the pending stage may complete; anything else is a sequencing bug and
    /// leaves the state untouched.
    pub fn advance(&mut self, stage: Stage) -> bool {
        if self.pending_stage() == Some(stage) {
            *self = DomainState::Reached(stage);
            true
        } else {
            false
        }
    }

    /// Mark the pending stage as failed. Terminal states are left as they are.
    pub fn fail(&mut self) -> Option<Stage> {
        let stage = self.pending_stage()?;
        *self = DomainState::Failed { stage };
        Some(stage)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, DomainState::Reached(Stage::Done))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DomainState::Reached(Stage::Done) | DomainState::Failed { .. } | DomainState::Skipped
        )
    }
}

impl fmt::Display for DomainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainState::Pending => f.write_str("Pending"),
            DomainState::Reached(stage) => write!(f, "{stage}"),
            DomainState::Failed { stage } => write!(f, "Failed at {stage}"),
            DomainState::Skipped => f.write_str("Skipped"),
        }
    }
}
