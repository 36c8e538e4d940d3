//! OpenAPI 3.x document model and loading.
//!
//! [`load_spec`] reads a YAML or JSON document into a [`SpecDocument`], normalising
//! operations (merged parameters, resolved component refs, unique operation ids).
//! Schema `$ref`s are left in place and resolved lazily through [`refs`].

mod load;
pub mod refs;
mod types;

pub use load::*;
pub use types::*;
