//! Classification and synthesis core.
//!
//! Everything here is pure with respect to the file system: it reads a loaded
//! [`SpecDocument`](crate::spec::SpecDocument) and produces typed decisions that the
//! emitters in [`generator`](crate::generator) turn into files.
//!
//! - [`classifier`] decides Entity vs. response DTO for schemas
//! - [`response_shape`] decides the envelope shape of each response
//! - [`entity`] finds the entity type carried in `data`
//! - [`verbs`] and [`resources`] map operations to verbs and resources
//! - [`repository`] synthesizes the repository interface per resource
//! - [`model`] holds the per-domain registry the pipeline stages share

pub mod classifier;
pub mod entity;
pub mod model;
pub mod repository;
pub mod resources;
pub mod response_shape;
pub mod verbs;

pub use classifier::{needs_data_access_despite_dto, EntityClassification, SchemaClassifier};
pub use entity::EntityExtractor;
pub use model::{Analyzer, DomainModel, OperationPlan, ResourcePlan, SchemaInfo};
pub use repository::{RepositoryCapability, RepositoryKind};
pub use response_shape::{ResponseShape, ResponseShapeAnalyzer};
pub use verbs::{Verb, VerbSets};
