//! Entity converters between persisted records and API entity types.

use super::fs::GeneratedFile;
use super::templates::{render_with_header, BarrelTemplate, ConverterField, ConverterTemplate};
use super::typescript::{flattened_fields, property_key, quote};
use crate::analysis::DomainModel;
use crate::casing::to_kebab_case;
use crate::spec::SpecDocument;

/// Entities that get a converter: exported persisted entities with at least one field.
pub fn convertible_entities<'m>(spec: &SpecDocument, model: &'m DomainModel) -> Vec<&'m str> {
    model
        .persisted_entities()
        .into_iter()
        .filter(|name| model.exports_type(name))
        .filter(|name| {
            spec.schema(name)
                .is_some_and(|schema| !flattened_fields(spec, schema).is_empty())
        })
        .collect()
}

pub fn emit(spec: &SpecDocument, model: &DomainModel) -> anyhow::Result<Vec<GeneratedFile>> {
    let mut files = Vec::new();
    let mut exports = Vec::new();
    for entity in convertible_entities(spec, model) {
        let Some(schema) = spec.schema(entity) else {
            continue;
        };
        let fields = flattened_fields(spec, schema)
            .into_iter()
            .map(|f| ConverterField {
                key: property_key(f.name),
                quoted: quote(f.name),
            })
            .collect();
        let stem = format!("{}.converter", to_kebab_case(entity));
        let contents = render_with_header(&ConverterTemplate {
            entity: entity.to_string(),
            fields,
        })?;
        files.push(GeneratedFile::new(format!("converters/{stem}.ts"), contents));
        exports.push(format!("export * from './{stem}';"));
    }
    files.push(GeneratedFile::new(
        "converters/index.ts",
        render_with_header(&BarrelTemplate { lines: exports })?,
    ));
    Ok(files)
}
