//! Test support for generated code: entity factories and in-memory repository
//! mocks, both derived from the domain model rather than from emitted files.

use super::converters::convertible_entities;
use super::fs::GeneratedFile;
use super::repositories::{exported_capability, referenced_types};
use super::templates::{
    render_with_header, FactoriesTemplate, Factory, FactoryField, RepositoryMock,
    RepositoryMocksTemplate,
};
use super::typescript::{flattened_fields, property_key, quote};
use crate::analysis::DomainModel;
use crate::spec::refs::resolve_schema;
use crate::spec::{SchemaDefinition, SpecDocument};

fn json_literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => quote(s),
        other => other.to_string(),
    }
}

/// Deterministic sample value for a field.
fn sample_value(spec: &SpecDocument, field_name: &str, schema: &SchemaDefinition) -> String {
    if let Some(example) = schema.example.as_ref().or(schema.default_value.as_ref()) {
        return json_literal(example);
    }
    let Some(schema) = resolve_schema(spec, schema) else {
        return "null".to_string();
    };
    if let Some(first) = schema.enum_values.first() {
        return json_literal(first);
    }
    match (schema.primary_type(), schema.format.as_deref()) {
        (Some("string"), Some("uuid")) => quote("00000000-0000-4000-8000-000000000001"),
        (Some("string"), Some("date-time")) => quote("2024-01-01T00:00:00.000Z"),
        (Some("string"), Some("date")) => quote("2024-01-01"),
        (Some("string"), Some("email")) => quote("user@example.com"),
        (Some("string"), Some("uri" | "url")) => quote("https://example.com"),
        (Some("string"), _) => quote(&format!("{field_name}-1")),
        (Some("integer" | "number"), _) => schema
            .minimum
            .map(|m| m.to_string())
            .unwrap_or_else(|| "1".to_string()),
        (Some("boolean"), _) => "false".to_string(),
        (Some("array"), _) => "[]".to_string(),
        (Some("null"), _) => "null".to_string(),
        _ if schema.is_object() || !schema.all_of.is_empty() => "{}".to_string(),
        _ => "null".to_string(),
    }
}

pub fn build_factories(spec: &SpecDocument, model: &DomainModel) -> Vec<Factory> {
    convertible_entities(spec, model)
        .into_iter()
        .filter_map(|entity| {
            let schema = spec.schema(entity)?;
            let fields = flattened_fields(spec, schema)
                .into_iter()
                .map(|f| FactoryField {
                    key: property_key(f.name),
                    value: sample_value(spec, f.name, f.schema),
                })
                .collect();
            Some(Factory {
                entity: entity.to_string(),
                fields,
            })
        })
        .collect()
}

pub fn build_mocks(model: &DomainModel) -> Vec<RepositoryMock> {
    model
        .repositories()
        .map(|capability| {
            let capability = exported_capability(model, capability);
            let args = capability.generic_args();
            let create_input = if capability.kind.has_create() {
                args.get(1).cloned().unwrap_or_default()
            } else {
                String::new()
            };
            let update_input = if capability.kind.has_update() {
                let index = if capability.kind.has_create() { 2 } else { 1 };
                args.get(index).cloned().unwrap_or_default()
            } else {
                String::new()
            };
            RepositoryMock {
                resource: capability.resource.clone(),
                interface_name: capability.interface_name(),
                entity: capability.entity_ts(),
                has_create: capability.kind.has_create(),
                has_update: capability.kind.has_update(),
                has_delete: capability.kind.has_delete(),
                create_input,
                update_input,
            }
        })
        .collect()
}

pub fn emit(spec: &SpecDocument, model: &DomainModel) -> anyhow::Result<Vec<GeneratedFile>> {
    let factories = build_factories(spec, model);
    let factory_imports: Vec<&str> = factories.iter().map(|f| f.entity.as_str()).collect();
    let factories_file = render_with_header(&FactoriesTemplate {
        type_imports: factory_imports.join(", "),
        factories,
    })?;

    let mocks = build_mocks(model);
    let mut type_imports: Vec<String> = Vec::new();
    for capability in model.repositories() {
        for name in referenced_types(&exported_capability(model, capability)) {
            if !type_imports.contains(&name) {
                type_imports.push(name);
            }
        }
    }
    let repo_imports: Vec<&str> = mocks.iter().map(|m| m.interface_name.as_str()).collect();
    let mocks_file = render_with_header(&RepositoryMocksTemplate {
        repo_imports: repo_imports.join(", "),
        type_imports: type_imports.join(", "),
        mocks,
    })?;

    Ok(vec![
        GeneratedFile::new("__tests__/factories.ts", factories_file),
        GeneratedFile::new("__tests__/repository-mocks.ts", mocks_file),
    ])
}
