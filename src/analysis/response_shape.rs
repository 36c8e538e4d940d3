//! Response envelope shape classification.
//!
//! Every `(operation, status)` pair maps to exactly one [`ResponseShape`]. The shapes
//! overlap structurally, so [`ResponseShapeAnalyzer::classify`] checks them in a fixed
//! priority order: the order of the arms below is the order of precedence.

use super::classifier::{EntityClassification, SchemaClassifier};
use super::entity::EntityExtractor;
use crate::config::ClassificationConfig;
use crate::error::Warning;
use crate::spec::refs::{ref_name, resolve_schema};
use crate::spec::{HttpMethod, Operation, SchemaDefinition, SpecDocument};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    /// `202`-style acknowledgement of queued work
    TaskAccepted,
    /// `data` is the conventional operation-success marker
    OperationSuccess,
    /// No JSON content, or `data` is a closed empty object
    Empty,
    /// `data` is an array
    ArrayOfEntity { entity: Option<String> },
    /// `data.items` is an array
    PaginatedItems { entity: Option<String> },
    /// The component already returns a complete inline `{data, meta}` envelope
    FullEnvelope,
    /// Default: `data` names one entity (`None` when it cannot be determined)
    SingleEntity { entity: Option<String> },
}

impl ResponseShape {
    /// Entity type carried by the shape, if any.
    pub fn entity(&self) -> Option<&str> {
        match self {
            ResponseShape::ArrayOfEntity { entity }
            | ResponseShape::PaginatedItems { entity }
            | ResponseShape::SingleEntity { entity } => entity.as_deref(),
            _ => None,
        }
    }

    /// Shapes that describe a collection response.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            ResponseShape::ArrayOfEntity { .. } | ResponseShape::PaginatedItems { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResponseShape::TaskAccepted => "TaskAccepted",
            ResponseShape::OperationSuccess => "OperationSuccess",
            ResponseShape::Empty => "Empty",
            ResponseShape::ArrayOfEntity { .. } => "ArrayOfEntity",
            ResponseShape::PaginatedItems { .. } => "PaginatedItems",
            ResponseShape::FullEnvelope => "FullEnvelope",
            ResponseShape::SingleEntity { .. } => "SingleEntity",
        }
    }
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entity() {
            Some(entity) => write!(f, "{}({entity})", self.name()),
            None if matches!(
                self,
                ResponseShape::SingleEntity { .. }
                    | ResponseShape::ArrayOfEntity { .. }
                    | ResponseShape::PaginatedItems { .. }
            ) =>
            {
                write!(f, "{}(unknown)", self.name())
            }
            None => write!(f, "{}", self.name()),
        }
    }
}

/// Status codes tried in order when no explicit status is requested.
pub fn status_preference(method: HttpMethod) -> &'static [&'static str] {
    match method {
        HttpMethod::Post => &["201", "200", "202"],
        HttpMethod::Delete => &["204", "200"],
        _ => &["200", "204"],
    }
}

/// Status to classify for `op`: the method's preference list, then the lowest
/// declared 2xx, then `default`.
pub fn select_status(op: &Operation) -> Option<String> {
    status_preference(op.method)
        .iter()
        .find(|s| op.responses.contains_key(**s))
        .map(|s| (*s).to_string())
        .or_else(|| op.success_statuses().first().map(|s| (*s).to_string()))
        .or_else(|| op.responses.contains_key("default").then(|| "default".to_string()))
}

pub struct ResponseShapeAnalyzer<'a> {
    spec: &'a SpecDocument,
    config: &'a ClassificationConfig,
    extractor: EntityExtractor<'a>,
    classifier: SchemaClassifier<'a>,
}

impl<'a> ResponseShapeAnalyzer<'a> {
    pub fn new(spec: &'a SpecDocument, config: &'a ClassificationConfig) -> Self {
        ResponseShapeAnalyzer {
            spec,
            config,
            extractor: EntityExtractor::new(spec, &config.envelope_markers),
            classifier: SchemaClassifier::new(spec),
        }
    }

    pub fn extractor(&self) -> &EntityExtractor<'a> {
        &self.extractor
    }

    /// Classify the response of `op` at `status`, discarding warnings.
    pub fn classify(&self, op: &Operation, status: &str) -> ResponseShape {
        let mut ignored = Vec::new();
        self.classify_with_warnings(op, status, &mut ignored)
    }

    /// Classify the response of `op` at `status`.
    ///
    /// Fallbacks (unresolvable payloads, undeterminable entities) are reported as
    /// `ClassificationAmbiguity` warnings.
    pub fn classify_with_warnings(
        &self,
        op: &Operation,
        status: &str,
        warnings: &mut Vec<Warning>,
    ) -> ResponseShape {
        let location = format!("operation:{}", op.operation_id);
        let Some(root) = op.response(status).and_then(|r| r.json_schema()) else {
            return ResponseShape::Empty;
        };
        let Some(envelope) = resolve_schema(self.spec, root) else {
            warnings.push(Warning::ambiguity(
                &location,
                format!("response {status} schema could not be resolved; entity type unknown"),
            ));
            return ResponseShape::SingleEntity {
                entity: ref_name(root),
            };
        };

        let data = self.find_property(envelope, "data", 0);
        let payload = data.unwrap_or(root);
        let Some(payload_resolved) = resolve_schema(self.spec, payload) else {
            warnings.push(Warning::ambiguity(
                &location,
                format!("response {status} data could not be resolved; entity type unknown"),
            ));
            return ResponseShape::SingleEntity {
                entity: ref_name(payload),
            };
        };
        let payload_has = |name: &str| self.find_property(payload_resolved, name, 0).is_some();

        let marker = ref_name(payload);
        // a stored entity may carry the id of the task that produced it
        let payload_is_entity = marker.as_deref().is_some_and(|name| {
            self.classifier.classify_named(name) == Some(EntityClassification::Entity)
        });
        let task_accepted = (payload_has("taskId") && (status == "202" || !payload_is_entity))
            || (data.is_some() && self.find_property(envelope, "taskId", 0).is_some())
            || (status == "202" && data.is_some() && payload_has("status"));
        let operation_success = marker
            .as_deref()
            .is_some_and(|m| self.config.operation_success_markers.iter().any(|k| k == m));
        let items_array = self
            .find_property(payload_resolved, "items", 0)
            .and_then(|items| resolve_schema(self.spec, items))
            .filter(|items| items.is_array());
        let full_envelope = data.is_some_and(|d| !d.is_ref() && !d.properties.is_empty())
            && self.find_property(envelope, "meta", 0).is_some();

        let shape = match () {
            _ if task_accepted => ResponseShape::TaskAccepted,
            _ if operation_success => ResponseShape::OperationSuccess,
            _ if payload_resolved.is_closed_empty_object() => ResponseShape::Empty,
            _ if payload_resolved.is_array() => ResponseShape::ArrayOfEntity {
                entity: payload_resolved
                    .items
                    .as_deref()
                    .and_then(|items| self.extractor.element_entity(items)),
            },
            _ if items_array.is_some() => ResponseShape::PaginatedItems {
                entity: items_array
                    .and_then(|items| items.items.as_deref())
                    .and_then(|element| self.extractor.element_entity(element)),
            },
            _ if full_envelope => ResponseShape::FullEnvelope,
            _ => ResponseShape::SingleEntity {
                entity: match data {
                    Some(_) => self.extractor.extract_entity_type(root),
                    None => self.extractor.payload_entity(root, 0),
                },
            },
        };

        if let ResponseShape::SingleEntity { entity: None }
        | ResponseShape::ArrayOfEntity { entity: None }
        | ResponseShape::PaginatedItems { entity: None } = &shape
        {
            warnings.push(Warning::ambiguity(
                &location,
                format!(
                    "response {status} classified {} without a named entity; pass-through code emitted",
                    shape.name()
                ),
            ));
        }
        shape
    }

    /// Look up a property directly or through `allOf` members.
    fn find_property<'s>(
        &'s self,
        schema: &'s SchemaDefinition,
        name: &str,
        depth: usize,
    ) -> Option<&'s SchemaDefinition>
    where
        'a: 's,
    {
        if depth > 8 {
            return None;
        }
        if let Some(prop) = schema.property(name) {
            return Some(prop);
        }
        schema.all_of.iter().find_map(|member| {
            let member = resolve_schema(self.spec, member)?;
            self.find_property(member, name, depth + 1)
        })
    }
}
