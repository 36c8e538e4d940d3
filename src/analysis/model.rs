//! In-memory registry of everything derived from one domain's document.
//!
//! Stages fill a [`DomainModel`] as they run and later stages read it back, so no
//! stage has to rediscover type names from files an earlier stage wrote.

use super::classifier::{
    needs_data_access_despite_dto, EntityClassification, SchemaClassifier, ENTITY_INDICATORS,
};
use super::repository::{requires_repository, synthesize, RepositoryCapability};
use super::resources::group_by_resource;
use super::response_shape::{select_status, ResponseShape, ResponseShapeAnalyzer};
use super::verbs::{map_verb, Verb, VerbSets};
use crate::casing::{is_identifier, to_camel_case, to_kebab_case, to_pascal_case};
use crate::config::{ClassificationConfig, VerbConfig};
use crate::error::Warning;
use crate::spec::refs::ref_name;
use crate::spec::{HttpMethod, Operation, SpecDocument};

/// Verdict for one component schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaInfo {
    pub name: String,
    pub classification: EntityClassification,
    /// Carries at least one identity/lifecycle field (`id`, `createdAt`, ...)
    pub has_identity: bool,
}

/// Everything decided about one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPlan {
    pub operation_id: String,
    /// Kebab-case resource name
    pub resource: String,
    pub method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub verb: Verb,
    /// Status the shape was computed for; `None` when no response is declared
    pub status: Option<String>,
    pub shape: ResponseShape,
    /// Classification of the response entity when it is a component schema
    pub classification: Option<EntityClassification>,
    pub needs_data_access: bool,
    /// Request body type name (component name or `<OperationId>Body`)
    pub request_type: Option<String>,
    /// `<OperationId>Params` when the operation has query parameters
    pub params_type: Option<String>,
    pub path_params: Vec<String>,
    /// Whether the generated handler receives the resource repository
    pub uses_repository: bool,
}

impl OperationPlan {
    /// Exported handler function name, e.g. `createWidget`.
    pub fn handler_name(&self) -> String {
        to_camel_case(&self.operation_id)
    }

    /// File stem, e.g. `create-widget`.
    pub fn file_stem(&self) -> String {
        to_kebab_case(&self.operation_id)
    }

    /// `CreateWidget`, the prefix of per-operation type names.
    pub fn type_prefix(&self) -> String {
        to_pascal_case(&self.operation_id)
    }

    /// Numeric HTTP status emitted by the handler.
    pub fn status_code(&self) -> u16 {
        self.status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(match self.shape {
                ResponseShape::Empty => 204,
                ResponseShape::TaskAccepted => 202,
                _ => 200,
            })
    }
}

/// A resource and the operations acting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePlan {
    pub name: String,
    pub operations: Vec<OperationPlan>,
    pub repository: Option<RepositoryCapability>,
}

/// Derived data for one domain run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainModel {
    pub domain: String,
    pub schemas: Vec<SchemaInfo>,
    pub resources: Vec<ResourcePlan>,
    /// Type names exported from the domain's `types.ts`, in declaration order
    pub exported_types: Vec<String>,
    /// Type names with a `<Name>Schema` validator in `schemas.ts`
    pub validated_types: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl DomainModel {
    pub fn new(domain: impl Into<String>) -> Self {
        DomainModel {
            domain: domain.into(),
            ..DomainModel::default()
        }
    }

    pub fn repositories(&self) -> impl Iterator<Item = &RepositoryCapability> {
        self.resources.iter().filter_map(|r| r.repository.as_ref())
    }

    pub fn operations(&self) -> impl Iterator<Item = &OperationPlan> {
        self.resources.iter().flat_map(|r| r.operations.iter())
    }

    pub fn exports_type(&self, name: &str) -> bool {
        self.exported_types.iter().any(|t| t == name)
    }

    pub fn has_validator(&self, name: &str) -> bool {
        self.validated_types.iter().any(|t| t == name)
    }

    /// Entities that are stored: repository entities plus entity schemas with
    /// identity fields, in schema declaration order.
    pub fn persisted_entities(&self) -> Vec<&str> {
        let repository_entities = self.repository_entities();
        self.schemas
            .iter()
            .filter(|s| {
                repository_entities.contains(&s.name)
                    || (s.classification == EntityClassification::Entity && s.has_identity)
            })
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Distinct, known entity types backing repositories, in resource order.
    pub fn repository_entities(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for entity in self.repositories().filter_map(|r| r.entity_type.as_ref()) {
            if !out.contains(entity) {
                out.push(entity.clone());
            }
        }
        out
    }
}

/// Run-scoped analysis context for one document.
pub struct Analyzer<'a> {
    spec: &'a SpecDocument,
    classifier: SchemaClassifier<'a>,
    shapes: ResponseShapeAnalyzer<'a>,
    verb_sets: VerbSets<'a>,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        spec: &'a SpecDocument,
        classification: &'a ClassificationConfig,
        verbs: &'a VerbConfig,
    ) -> Self {
        Analyzer {
            spec,
            classifier: SchemaClassifier::new(spec),
            shapes: ResponseShapeAnalyzer::new(spec, classification),
            verb_sets: VerbSets::new(verbs),
        }
    }

    pub fn spec(&self) -> &'a SpecDocument {
        self.spec
    }

    pub fn classifier(&self) -> &SchemaClassifier<'a> {
        &self.classifier
    }

    pub fn shapes(&self) -> &ResponseShapeAnalyzer<'a> {
        &self.shapes
    }

    /// Classify every component schema.
    pub fn classify_schemas(&self) -> Vec<SchemaInfo> {
        self.spec
            .components
            .schemas
            .iter()
            .map(|(name, schema)| {
                let fields = self.classifier.field_names(schema);
                SchemaInfo {
                    name: name.to_string(),
                    classification: self.classifier.classify(name, schema),
                    has_identity: ENTITY_INDICATORS
                        .iter()
                        .any(|indicator| fields.iter().any(|f| f.as_str() == *indicator)),
                }
            })
            .collect()
    }

    fn request_type(&self, op: &Operation) -> Option<String> {
        let schema = op.request_schema()?;
        if let Some(name) = ref_name(schema) {
            return Some(name);
        }
        match schema.title.as_deref() {
            Some(title) if is_identifier(title) && self.spec.schema(title).is_none() => {
                Some(title.to_string())
            }
            _ => Some(format!("{}Body", to_pascal_case(&op.operation_id))),
        }
    }

    /// Plan a single operation. Repository wiring is decided later per resource.
    pub fn plan_operation(
        &self,
        op: &Operation,
        resource: &str,
        warnings: &mut Vec<Warning>,
    ) -> OperationPlan {
        let status = select_status(op);
        let shape = match status.as_deref() {
            Some(status) => self.shapes.classify_with_warnings(op, status, warnings),
            None => {
                warnings.push(Warning::irregularity(
                    format!("operation:{}", op.operation_id),
                    "no responses declared; treated as empty",
                ));
                ResponseShape::Empty
            }
        };
        let shape_at_200 = if status.as_deref() == Some("200") {
            shape.clone()
        } else {
            self.shapes.classify(op, "200")
        };
        let verb = map_verb(op, &shape_at_200);
        let classification = shape
            .entity()
            .and_then(|entity| self.classifier.classify_named(entity));
        let params_type = (op.query_parameters().count() > 0)
            .then(|| format!("{}Params", to_pascal_case(&op.operation_id)));

        OperationPlan {
            operation_id: op.operation_id.clone(),
            resource: resource.to_string(),
            method: op.method,
            path: op.path.clone(),
            summary: op.summary.clone(),
            verb,
            status,
            shape,
            classification,
            needs_data_access: needs_data_access_despite_dto(&op.operation_id),
            request_type: self.request_type(op),
            params_type,
            path_params: op.path_parameters().map(|p| p.name.clone()).collect(),
            uses_repository: false,
        }
    }

    /// Group operations into resources, plan them, and synthesize repositories.
    pub fn plan_resources(&self, warnings: &mut Vec<Warning>) -> Vec<ResourcePlan> {
        group_by_resource(&self.spec.operations)
            .into_iter()
            .map(|(name, ops)| {
                let mut operations: Vec<OperationPlan> = ops
                    .into_iter()
                    .map(|op| self.plan_operation(op, &name, warnings))
                    .collect();
                let repository = requires_repository(&operations, &self.verb_sets).then(|| {
                    synthesize(&name, &operations, &self.verb_sets, &self.classifier, warnings)
                });
                if repository.is_some() {
                    for op in &mut operations {
                        op.uses_repository = op.verb != Verb::Action || op.needs_data_access;
                    }
                }
                ResourcePlan {
                    name,
                    operations,
                    repository,
                }
            })
            .collect()
    }
}
