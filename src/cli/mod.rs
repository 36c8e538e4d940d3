//! # CLI Module
//!
//! Command-line surface of the `layergen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! ```bash
//! layergen generate all
//! layergen generate billing orders --only types,repositories --fail-fast
//! layergen generate billing --clean --output ../web/src/generated
//! ```
//!
//! Options:
//! - `--config <FILE>` - configuration file (default: `./layergen.toml` if present)
//! - `--output <DIR>` - base output directory
//! - `--only <PARTS>` - write only `types`, `schemas`, `repositories`, `handlers`,
//!   `converters`, `prisma`, `tests`
//! - `--clean` - remove each domain's previous output first
//! - `--fail-fast` - stop at the first failed domain
//! - `--no-bundle` - skip the external bundler
//!
//! The process exits with status 0 only if every selected domain reached `Done`.
//!
//! ### `inspect`
//!
//! ```bash
//! layergen inspect billing
//! ```
//!
//! Prints repository capabilities, per-operation verbs and response shapes, and
//! warnings, without writing any generated files.

mod commands;


pub use commands::{run_cli, run_command, Cli, Commands, OnlyPart};
