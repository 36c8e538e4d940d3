//! # Pipeline Module
//!
//! Drives domains through the generation stages and reports the outcome.
//!
//! - [`stage`] defines the per-domain state machine
//! - [`orchestrator`] runs the stages with per-domain failure isolation
//! - [`postprocess`] builds the shared-type registry and cross-domain barrels
//! - [`report`] collects attributed errors and warnings for the operator

pub mod orchestrator;
pub mod postprocess;
pub mod report;
pub mod stage;

pub use orchestrator::{Orchestrator, RunOptions};
pub use postprocess::{post_process, SharedTypeRegistry};
pub use report::{DomainOutcome, PostProcessSummary, RunReport, StageError, StageWarning};
pub use stage::{DomainState, Stage};
