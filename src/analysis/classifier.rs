//! Entity vs. response-DTO classification of component schemas.

use crate::spec::refs::resolve_schema;
use crate::spec::{SchemaDefinition, SpecDocument};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// Fields whose presence marks a persistent domain object.
pub const ENTITY_INDICATORS: [&str; 6] = [
    "id",
    "orgId",
    "createdAt",
    "created_at",
    "updatedAt",
    "updated_at",
];

/// Fields whose presence marks a derived/computed payload.
pub const DTO_INDICATORS: [&str; 9] = [
    "allowed",
    "isValid",
    "reason",
    "remaining",
    "accessToken",
    "refreshToken",
    "token",
    "metricKey",
    "series",
];

/// Operation-id fragments of operations that return DTOs computed from stored entities.
const DATA_ACCESS_KEYWORDS: [&str; 6] = ["evaluate", "query", "search", "validate", "check", "verify"];

const MAX_FLATTEN_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClassification {
    Entity,
    ResponseDto,
}

impl fmt::Display for EntityClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityClassification::Entity => write!(f, "Entity"),
            EntityClassification::ResponseDto => write!(f, "ResponseDTO"),
        }
    }
}

/// Decision rule over a schema's (flattened) field names.
#[must_use]
pub fn classify_fields<S: AsRef<str>>(schema_name: &str, fields: &[S]) -> EntityClassification {
    let has = |name: &str| fields.iter().any(|f| f.as_ref() == name);
    let entity_hits = ENTITY_INDICATORS.iter().filter(|n| has(n)).count();
    let dto_hits = DTO_INDICATORS.iter().filter(|n| has(n)).count();

    match (entity_hits, dto_hits) {
        (e, 0) if e > 0 => EntityClassification::Entity,
        (0, d) if d > 0 => EntityClassification::ResponseDto,
        (e, d) if e > d => EntityClassification::Entity,
        (e, d) if d > e => EntityClassification::ResponseDto,
        _ if schema_name.ends_with("Response") => EntityClassification::ResponseDto,
        _ => EntityClassification::Entity,
    }
}

/// True when an operation must read persisted entities even though it returns a DTO.
#[must_use]
pub fn needs_data_access_despite_dto(operation_id: &str) -> bool {
    let lower = operation_id.to_ascii_lowercase();
    DATA_ACCESS_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Classifies schemas of one document.
///
/// Verdicts for component schemas looked up through [`classify_named`](Self::classify_named)
/// are cached by component name. One instance per domain run; nothing is shared
/// across domains.
pub struct SchemaClassifier<'a> {
    spec: &'a SpecDocument,
    cache: RefCell<HashMap<String, EntityClassification>>,
}

impl<'a> SchemaClassifier<'a> {
    pub fn new(spec: &'a SpecDocument) -> Self {
        SchemaClassifier {
            spec,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Classify `schema` under `schema_name`. Total: every input yields a verdict.
    ///
    /// Not cached: the same name may be paired with different schemas.
    pub fn classify(&self, schema_name: &str, schema: &SchemaDefinition) -> EntityClassification {
        let fields = self.field_names(schema);
        classify_fields(schema_name, &fields)
    }

    /// Classify a component schema by name; `None` if the document has no such schema.
    pub fn classify_named(&self, schema_name: &str) -> Option<EntityClassification> {
        if let Some(hit) = self.cache.borrow().get(schema_name) {
            return Some(*hit);
        }
        let schema = self.spec.schema(schema_name)?;
        let verdict = self.classify(schema_name, schema);
        self.cache
            .borrow_mut()
            .insert(schema_name.to_string(), verdict);
        Some(verdict)
    }

    /// Property names of `schema`, flattened through `$ref` and `allOf`.
    pub fn field_names(&self, schema: &SchemaDefinition) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_fields(schema, 0, &mut out);
        out
    }

    fn collect_fields(&self, schema: &SchemaDefinition, depth: usize, out: &mut Vec<String>) {
        if depth > MAX_FLATTEN_DEPTH {
            return;
        }
        let Some(schema) = resolve_schema(self.spec, schema) else {
            return;
        };
        for (name, _) in &schema.properties {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        for member in &schema.all_of {
            self.collect_fields(member, depth + 1, out);
        }
    }

    /// Number of verdicts computed so far.
    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }
}
