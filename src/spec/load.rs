use super::refs::{parse_local_ref, ComponentKind};
use super::types::{
    Components, HttpMethod, NamedSchemas, ObjectOrReference, Operation, Parameter, RequestBody,
    ResponseSpec, SchemaDefinition, SpecDocument,
};
use crate::error::{GeneratorError, Warning};
use anyhow::Context;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

const METHODS: [&str; 8] = ["get", "post", "put", "delete", "patch", "options", "head", "trace"];

fn strip_unknown_verbs(val: &mut Value) {
    if let Some(Value::Object(paths_map)) = val.get_mut("paths") {
        for item in paths_map.values_mut() {
            if let Value::Object(obj) = item {
                obj.retain(|k, _| {
                    let lk = k.to_ascii_lowercase();
                    match lk.as_str() {
                        "summary" | "description" | "servers" | "parameters" | "$ref" => true,
                        m if METHODS.contains(&m) => true,
                        _ => k.starts_with("x-"),
                    }
                });
            }
        }
    }
}

fn de_scalar_string<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct RawInfo {
    #[serde(default, deserialize_with = "de_scalar_string")]
    title: String,
    #[serde(default, deserialize_with = "de_scalar_string")]
    version: String,
}

fn de_named_schemas<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> Result<Vec<(String, SchemaDefinition)>, D::Error> {
    use serde::de::Error as _;
    let map = Option::<Map<String, Value>>::deserialize(d)?.unwrap_or_default();
    map.into_iter()
        .map(|(name, value)| {
            SchemaDefinition::deserialize(value)
                .map(|schema| (name.clone(), schema))
                .map_err(|e| D::Error::custom(format!("components.schemas.{name}: {e}")))
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct RawComponents {
    #[serde(default, deserialize_with = "de_named_schemas")]
    schemas: Vec<(String, SchemaDefinition)>,
    #[serde(default)]
    responses: BTreeMap<String, ObjectOrReference<ResponseSpec>>,
    #[serde(default, rename = "requestBodies")]
    request_bodies: BTreeMap<String, ObjectOrReference<RequestBody>>,
    #[serde(default)]
    parameters: BTreeMap<String, ObjectOrReference<Parameter>>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    openapi: Option<Value>,
    #[serde(default)]
    info: RawInfo,
    #[serde(default)]
    paths: Map<String, Value>,
    #[serde(default)]
    components: RawComponents,
}

#[derive(Debug, Deserialize)]
struct RawOperation {
    #[serde(default, rename = "operationId")]
    operation_id: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    parameters: Vec<ObjectOrReference<Parameter>>,
    #[serde(default, rename = "requestBody")]
    request_body: Option<ObjectOrReference<RequestBody>>,
    #[serde(default)]
    responses: BTreeMap<String, ObjectOrReference<ResponseSpec>>,
    #[serde(flatten)]
    extensions: BTreeMap<String, Value>,
}

/// Resolve a component object reference of the expected kind (one hop plus chains).
fn resolve_component<'a, T>(
    map: &'a BTreeMap<String, ObjectOrReference<T>>,
    kind: ComponentKind,
    item: &'a ObjectOrReference<T>,
) -> Option<&'a T> {
    let mut current = item;
    for _ in 0..8 {
        match current {
            ObjectOrReference::Object(obj) => return Some(obj),
            ObjectOrReference::Ref { ref_path } => {
                let local = parse_local_ref(ref_path)?;
                if local.kind != kind || local.member.is_some() {
                    return None;
                }
                current = map.get(&local.name)?;
            }
        }
    }
    None
}

fn flatten_components<T: Clone>(
    map: &BTreeMap<String, ObjectOrReference<T>>,
    kind: ComponentKind,
) -> BTreeMap<String, T> {
    map.iter()
        .filter_map(|(name, item)| {
            resolve_component(map, kind, item).map(|obj| (name.clone(), obj.clone()))
        })
        .collect()
}

fn pascal_segment(segment: &str) -> String {
    segment
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `GET /widgets/{id}` → `getWidgetsById`
pub fn synthesize_operation_id(method: HttpMethod, path: &str) -> String {
    let mut id = method.as_str().to_ascii_lowercase();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if let Some(param) = segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            id.push_str("By");
            id.push_str(&pascal_segment(param));
        } else {
            id.push_str(&pascal_segment(segment));
        }
    }
    id
}

fn merge_parameters(
    components: &RawComponents,
    path_level: &[ObjectOrReference<Parameter>],
    op_level: &[ObjectOrReference<Parameter>],
    location: &str,
    warnings: &mut Vec<Warning>,
) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = Vec::new();
    for item in path_level.iter().chain(op_level.iter()) {
        match resolve_component(&components.parameters, ComponentKind::Parameters, item) {
            Some(param) => {
                // Operation-level parameters override path-level ones with the same key.
                if let Some(existing) = merged
                    .iter_mut()
                    .find(|p| p.name == param.name && p.location == param.location)
                {
                    *existing = param.clone();
                } else {
                    merged.push(param.clone());
                }
            }
            None => warnings.push(Warning::irregularity(
                location,
                "parameter $ref could not be resolved; parameter dropped",
            )),
        }
    }
    merged
}

/// Build a [`SpecDocument`] from an already parsed JSON value.
///
/// Returns the document plus load-time warnings (synthesised or duplicate
/// operationIds, unresolvable body/response refs).
pub fn parse_spec_value(mut value: Value) -> anyhow::Result<(SpecDocument, Vec<Warning>)> {
    if !value.is_object() {
        return Err(GeneratorError::spec("document root is not an object").into());
    }
    strip_unknown_verbs(&mut value);
    let raw: RawDocument = serde_json::from_value(value)
        .map_err(|e| GeneratorError::spec(format!("invalid OpenAPI document: {e}")))?;

    // `openapi: 3.0` arrives as a YAML float
    let version = raw.openapi.as_ref().map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });
    match version.as_deref() {
        Some(v) if v.starts_with("3.") => {}
        Some(v) => {
            return Err(GeneratorError::spec(format!(
                "unsupported OpenAPI version '{v}' (3.x required)"
            ))
            .into())
        }
        None => return Err(GeneratorError::spec("missing 'openapi' version field").into()),
    }

    let mut warnings = Vec::new();
    let mut operations = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (path, item) in &raw.paths {
        let Value::Object(item_map) = item else {
            warnings.push(Warning::irregularity(
                format!("path:{path}"),
                "path item is not an object; skipped",
            ));
            continue;
        };
        let path_params: Vec<ObjectOrReference<Parameter>> = match item_map.get("parameters") {
            Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
                GeneratorError::spec(format!("{path}: invalid path-level parameters: {e}"))
            })?,
            None => Vec::new(),
        };

        for (key, op_value) in item_map {
            let Some(method) = HttpMethod::parse(key) else {
                continue;
            };
            let raw_op: RawOperation = serde_json::from_value(op_value.clone()).map_err(|e| {
                GeneratorError::spec(format!("{method} {path}: invalid operation: {e}"))
            })?;
            let route = format!("{method} {path}");

            let mut operation_id = match raw_op.operation_id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => {
                    let id = synthesize_operation_id(method, path);
                    warnings.push(Warning::irregularity(
                        format!("operation:{route}"),
                        format!("missing operationId; using '{id}'"),
                    ));
                    id
                }
            };
            if seen_ids.contains(&operation_id) {
                let mut counter = 2;
                let mut candidate = format!("{operation_id}{counter}");
                while seen_ids.contains(&candidate) {
                    counter += 1;
                    candidate = format!("{operation_id}{counter}");
                }
                warnings.push(Warning::irregularity(
                    format!("operation:{route}"),
                    format!("duplicate operationId '{operation_id}'; using '{candidate}'"),
                ));
                operation_id = candidate;
            }
            seen_ids.insert(operation_id.clone());
            let location = format!("operation:{operation_id}");

            let parameters = merge_parameters(
                &raw.components,
                &path_params,
                &raw_op.parameters,
                &location,
                &mut warnings,
            );

            let request_body = match &raw_op.request_body {
                None => None,
                Some(item) => {
                    let resolved = resolve_component(
                        &raw.components.request_bodies,
                        ComponentKind::RequestBodies,
                        item,
                    );
                    if resolved.is_none() {
                        warnings.push(Warning::irregularity(
                            &location,
                            "requestBody $ref could not be resolved; treated as absent",
                        ));
                    }
                    resolved.cloned()
                }
            };

            let mut responses = BTreeMap::new();
            for (status, item) in &raw_op.responses {
                match resolve_component(
                    &raw.components.responses,
                    ComponentKind::Responses,
                    item,
                ) {
                    Some(resp) => {
                        responses.insert(status.clone(), resp.clone());
                    }
                    None => {
                        warnings.push(Warning::irregularity(
                            &location,
                            format!("response {status} $ref could not be resolved; treated as empty"),
                        ));
                        responses.insert(status.clone(), ResponseSpec::default());
                    }
                }
            }

            let extensions = raw_op
                .extensions
                .iter()
                .filter(|(k, _)| k.starts_with("x-"))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();

            operations.push(Operation {
                path: path.clone(),
                method,
                operation_id,
                summary: raw_op.summary.clone(),
                tags: raw_op.tags.clone(),
                parameters,
                request_body,
                responses,
                extensions,
            });
        }
    }

    let components = Components {
        responses: flatten_components(&raw.components.responses, ComponentKind::Responses),
        request_bodies: flatten_components(
            &raw.components.request_bodies,
            ComponentKind::RequestBodies,
        ),
        parameters: flatten_components(&raw.components.parameters, ComponentKind::Parameters),
        schemas: NamedSchemas::new(raw.components.schemas),
    };

    Ok((
        SpecDocument {
            title: raw.info.title,
            version: raw.info.version,
            operations,
            components,
        },
        warnings,
    ))
}

/// Parse document text; YAML when `is_yaml`, JSON otherwise.
pub fn parse_spec_str(content: &str, is_yaml: bool) -> anyhow::Result<(SpecDocument, Vec<Warning>)> {
    let value: Value = if is_yaml {
        serde_yaml::from_str(content)
            .map_err(|e| GeneratorError::spec(format!("invalid YAML: {e}")))?
    } else {
        serde_json::from_str(content)
            .map_err(|e| GeneratorError::spec(format!("invalid JSON: {e}")))?
    };
    parse_spec_value(value)
}

/// Load a spec file, choosing the parser by extension.
pub fn load_spec(file_path: &Path) -> anyhow::Result<(SpecDocument, Vec<Warning>)> {
    if !file_path.exists() {
        return Err(GeneratorError::spec(format!(
            "spec file not found: {}",
            file_path.display()
        ))
        .into());
    }
    let content = std::fs::read_to_string(file_path)
        .map_err(|e| GeneratorError::spec(format!("cannot read {}: {e}", file_path.display())))?;
    let is_yaml = file_path
        .extension()
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false);
    parse_spec_str(&content, is_yaml)
        .with_context(|| format!("while loading {}", file_path.display()))
}
