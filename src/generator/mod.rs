//! # Generator Module
//!
//! TypeScript emitters. Each emitter turns values from a
//! [`DomainModel`](crate::analysis::DomainModel) into [`GeneratedFile`]s; the
//! pipeline decides which of them are written.
//!
//! ## Generated Structure
//!
//! ```text
//! <output_dir>/<domain>/
//! ├── index.ts                  # domain barrel
//! ├── types.ts                  # component, request body and query types
//! ├── schemas.ts                # zod validators
//! ├── repositories/
//! │   ├── base.ts               # the eight capability interfaces
//! │   ├── <resource>.repository.ts
//! │   └── index.ts
//! ├── handlers/
//! │   ├── envelope.ts
//! │   ├── <resource>/<operation>.handler.ts
//! │   ├── <resource>/index.ts
//! │   └── index.ts
//! ├── converters/
//! │   ├── <entity>.converter.ts
//! │   └── index.ts
//! ├── prisma/schema.prisma
//! └── __tests__/
//!     ├── factories.ts
//!     └── repository-mocks.ts
//! ```
//!
//! Templates live in `templates/` and are rendered with Askama. Every file starts
//! with [`GENERATED_HEADER`] and contains nothing run-dependent, so two runs over
//! the same document produce identical bytes.

use std::fmt;

pub mod barrels;
pub mod converters;
pub mod fs;
pub mod handlers;
pub mod prisma;
pub mod repositories;
pub mod templates;
pub mod test_support;
pub mod types;
pub mod typescript;

#[cfg(test)]
pub(crate) mod fixtures;

pub use fs::{clean_dir, ensure_dir, write_all, write_file, GeneratedFile, GENERATED_HEADER};
pub use types::{build_catalog, TypeCatalog};

/// A selectable group of emitted files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputPart {
    Types,
    Schemas,
    Repositories,
    Handlers,
    Converters,
    Prisma,
    Tests,
}

impl OutputPart {
    /// Layer order.
    pub const ALL: [OutputPart; 7] = [
        OutputPart::Types,
        OutputPart::Schemas,
        OutputPart::Repositories,
        OutputPart::Handlers,
        OutputPart::Converters,
        OutputPart::Prisma,
        OutputPart::Tests,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputPart::Types => "types",
            OutputPart::Schemas => "schemas",
            OutputPart::Repositories => "repositories",
            OutputPart::Handlers => "handlers",
            OutputPart::Converters => "converters",
            OutputPart::Prisma => "prisma",
            OutputPart::Tests => "tests",
        }
    }
}

impl fmt::Display for OutputPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
