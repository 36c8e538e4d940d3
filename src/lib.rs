//! # layergen
//!
//! **layergen** turns one OpenAPI 3.x document per business domain into a layered,
//! strongly-typed TypeScript source tree: types, zod validators, repository
//! interfaces, handler stubs, entity converters, a Prisma schema, and test factories.
//!
//! ## Architecture
//!
//! - **[`spec`]** - document loading, operation normalization, local `$ref` resolution
//! - **[`analysis`]** - schema classification, response shapes, entity extraction,
//!   repository synthesis, and the per-domain [`DomainModel`](analysis::DomainModel)
//! - **[`generator`]** - Askama-based TypeScript emitters consuming the model
//! - **[`pipeline`]** - the per-domain stage machine, post-processing and run report
//! - **[`bundle`]** - external spec bundler with a wall-clock timeout
//! - **[`config`]** - `layergen.toml`
//! - **[`error`]** - error and warning taxonomy
//! - **[`logging`]** - `tracing-subscriber` setup
//! - **[`cli`]** - the `layergen` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(layergen)
//!     participant Orch as pipeline::Orchestrator
//!     participant Spec as spec::load_spec
//!     participant Analysis as analysis::Analyzer
//!     participant Gen as generator::*
//!     participant FS as File System
//!
//!     CLI->>Orch: run(domains)
//!     loop every domain
//!         Orch->>Spec: load_spec(bundled or raw path)
//!         Orch->>Analysis: classify_schemas / plan_resources
//!         Analysis-->>Orch: DomainModel
//!         Orch->>Gen: emit types, schemas, repositories, handlers, ...
//!         Gen-->>Orch: Vec<GeneratedFile>
//!         Orch->>FS: write selected parts
//!     end
//!     Orch->>FS: shared/types.ts, index.ts
//!     Orch-->>CLI: RunReport
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use layergen::config::GeneratorConfig;
//! use layergen::pipeline::{Orchestrator, RunOptions};
//!
//! let report = Orchestrator::new(
//!     GeneratorConfig::default(),
//!     RunOptions::new(vec!["billing".to_string()]),
//! )
//! .run();
//! report.print_summary();
//! assert!(report.success());
//! ```

pub mod analysis;
pub mod bundle;
pub mod casing;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod pipeline;
pub mod spec;

pub use error::{ErrorKind, GeneratorError, Warning, WarningKind};
pub use spec::{load_spec, SpecDocument};
