//! Find the entity type carried by a response envelope.

use crate::casing::is_identifier;
use crate::spec::refs::{name_from_ref, resolve_schema};
use crate::spec::{SchemaDefinition, SpecDocument};

const MAX_DEPTH: usize = 8;

/// Walks response schemas looking for the named type in `data`.
pub struct EntityExtractor<'a> {
    spec: &'a SpecDocument,
    envelope_markers: &'a [String],
}

impl<'a> EntityExtractor<'a> {
    pub fn new(spec: &'a SpecDocument, envelope_markers: &'a [String]) -> Self {
        EntityExtractor {
            spec,
            envelope_markers,
        }
    }

    fn is_envelope_marker(&self, name: &str) -> bool {
        self.envelope_markers.iter().any(|m| m == name)
    }

    /// Entity type name carried by a whole response schema, or `None`.
    pub fn extract_entity_type(&self, response_schema: &SchemaDefinition) -> Option<String> {
        self.extract(response_schema, 0)
    }

    fn extract(&self, schema: &SchemaDefinition, depth: usize) -> Option<String> {
        if depth > MAX_DEPTH {
            return None;
        }

        if let Some(reference) = schema.reference.as_deref() {
            let name = name_from_ref(reference);
            let Some(target) = resolve_schema(self.spec, schema) else {
                // unresolved: the literal ref name is the best-effort label
                return Some(name);
            };
            if self.is_envelope_marker(&name) || target.has_property("data") || !target.all_of.is_empty() {
                if let Some(inner) = self.extract_unwrapped(target, depth + 1) {
                    return Some(inner);
                }
                if self.is_envelope_marker(&name) {
                    return None;
                }
            }
            return Some(self.preferred_name(target, name));
        }

        self.extract_unwrapped(schema, depth)
    }

    /// Inspect `data` and `allOf` of a schema that is not itself a reference.
    fn extract_unwrapped(&self, schema: &SchemaDefinition, depth: usize) -> Option<String> {
        if let Some(data) = schema.property("data") {
            return self.payload_entity(data, depth + 1);
        }
        for member in &schema.all_of {
            if let Some(name) = member.reference.as_deref().map(name_from_ref) {
                if self.is_envelope_marker(&name) {
                    continue;
                }
            }
            if member.is_ref() {
                if let Some(found) = self.extract(member, depth + 1) {
                    return Some(found);
                }
            } else if let Some(data) = member.property("data") {
                if let Some(found) = self.payload_entity(data, depth + 1) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Entity named by a `data` payload schema.
    pub fn payload_entity(&self, data: &SchemaDefinition, depth: usize) -> Option<String> {
        if depth > MAX_DEPTH {
            return None;
        }
        if let Some(reference) = data.reference.as_deref() {
            let name = name_from_ref(reference);
            return match resolve_schema(self.spec, data) {
                Some(target) if target.is_array() => target
                    .items
                    .as_deref()
                    .and_then(|items| self.element_entity(items)),
                Some(target) => Some(self.preferred_name(target, name)),
                None => Some(name),
            };
        }
        if data.is_array() {
            return data.items.as_deref().and_then(|items| self.element_entity(items));
        }
        if let Some(items) = data.property("items") {
            if let Some(resolved) = resolve_schema(self.spec, items) {
                if resolved.is_array() {
                    return resolved
                        .items
                        .as_deref()
                        .and_then(|element| self.element_entity(element));
                }
            }
        }
        for member in &data.all_of {
            let skip = member
                .reference
                .as_deref()
                .map(|r| self.is_envelope_marker(&name_from_ref(r)))
                .unwrap_or(false);
            if skip {
                continue;
            }
            if let Some(found) = self.payload_entity(member, depth + 1) {
                return Some(found);
            }
        }
        data.title.as_deref().filter(|t| is_identifier(t)).map(String::from)
    }

    /// Entity named by an array element schema.
    pub fn element_entity(&self, items: &SchemaDefinition) -> Option<String> {
        match items.reference.as_deref() {
            Some(reference) => {
                let name = name_from_ref(reference);
                match resolve_schema(self.spec, items) {
                    Some(target) => Some(self.preferred_name(target, name)),
                    None => Some(name),
                }
            }
            None => items.title.as_deref().filter(|t| is_identifier(t)).map(String::from),
        }
    }

    /// A resolved schema's `title` wins over its ref name when it is a usable type name.
    fn preferred_name(&self, target: &SchemaDefinition, ref_name: String) -> String {
        match target.title.as_deref() {
            Some(title) if is_identifier(title) => title.to_string(),
            _ => ref_name,
        }
    }
}
