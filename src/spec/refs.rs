//! Local `$ref` resolution.
//!
//! Only pointers into the same document's `components` are followed:
//!
//! ```text
//! #/components/<kind>/<name>
//! #/components/<kind>/<name>/<member>
//! ```
//!
//! The optional `<member>` selects a property of the referenced schema (for
//! `requestBodies`/`responses` the JSON body schema is used as the base). Anything else,
//! including external file or URL refs, resolves to `None`. Resolution never panics.

use super::types::{SchemaDefinition, SpecDocument};

pub const COMPONENTS_PREFIX: &str = "#/components/";

/// Bound on `$ref` → `$ref` chains; cycles resolve to `None`.
const MAX_REF_HOPS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Schemas,
    Responses,
    RequestBodies,
    Parameters,
}

impl ComponentKind {
    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "schemas" => Some(ComponentKind::Schemas),
            "responses" => Some(ComponentKind::Responses),
            "requestBodies" => Some(ComponentKind::RequestBodies),
            "parameters" => Some(ComponentKind::Parameters),
            _ => None,
        }
    }
}

/// A parsed local component pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRef {
    pub kind: ComponentKind,
    pub name: String,
    pub member: Option<String>,
}

fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Parse `#/components/<kind>/<name>[/<member>]`.
pub fn parse_local_ref(reference: &str) -> Option<LocalRef> {
    let rest = reference.strip_prefix(COMPONENTS_PREFIX)?;
    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() < 2 || segments.len() > 3 || segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(LocalRef {
        kind: ComponentKind::parse(segments[0])?,
        name: unescape_pointer(segments[1]),
        member: segments.get(2).map(|s| unescape_pointer(s)),
    })
}

/// Canonical type name carried by a reference: its last path segment.
///
/// Works for external refs too (`./common.yaml#/Money` → `Money`,
/// `schemas/Widget.yaml` → `Widget`), which callers use as a best-effort label.
pub fn name_from_ref(reference: &str) -> String {
    let last = reference
        .rsplit(['/', '#'])
        .find(|s| !s.is_empty())
        .unwrap_or(reference);
    let last = unescape_pointer(last);
    for ext in [".yaml", ".yml", ".json"] {
        if let Some(stem) = last.strip_suffix(ext) {
            return stem.to_string();
        }
    }
    last
}

/// Resolve a local reference to the schema it denotes.
pub fn resolve<'a>(spec: &'a SpecDocument, reference: &str) -> Option<&'a SchemaDefinition> {
    let local = parse_local_ref(reference)?;
    let components = &spec.components;
    let base = match local.kind {
        ComponentKind::Schemas => components.schemas.get(&local.name)?,
        ComponentKind::Responses => components.responses.get(&local.name)?.json_schema()?,
        ComponentKind::RequestBodies => {
            components.request_bodies.get(&local.name)?.json_schema()?
        }
        ComponentKind::Parameters => components.parameters.get(&local.name)?.schema.as_ref()?,
    };
    match local.member {
        None => Some(base),
        Some(member) => resolve_schema(spec, base)?.property(&member),
    }
}

/// Follow `$ref` chains starting at `schema` until a non-reference schema is reached.
///
/// Returns `schema` itself when it is not a reference.
pub fn resolve_schema<'a>(
    spec: &'a SpecDocument,
    schema: &'a SchemaDefinition,
) -> Option<&'a SchemaDefinition> {
    let mut current = schema;
    for _ in 0..MAX_REF_HOPS {
        match current.reference.as_deref() {
            None => return Some(current),
            Some(reference) => current = resolve(spec, reference)?,
        }
    }
    None
}

/// Name of the component a schema points at, if it is a reference.
pub fn ref_name(schema: &SchemaDefinition) -> Option<String> {
    schema.reference.as_deref().map(name_from_ref)
}
