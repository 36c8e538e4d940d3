//! Prisma data model: one `model` block per persisted entity schema.

use super::fs::GeneratedFile;
use super::templates::{render_with_header, PrismaModel, PrismaTemplate};
use super::typescript::{flattened_fields, FlatField};
use crate::analysis::DomainModel;
use crate::casing::{is_identifier, to_camel_case};
use crate::spec::refs::resolve_schema;
use crate::spec::{SchemaDefinition, SpecDocument};

struct PrismaField {
    name: String,
    ty: String,
    attributes: Vec<String>,
}

/// Prisma scalar for a resolved schema, or `None` when it must be stored as `Json`.
fn scalar(schema: &SchemaDefinition) -> Option<&'static str> {
    if !schema.one_of.is_empty() || !schema.any_of.is_empty() || !schema.all_of.is_empty() {
        return None;
    }
    match (schema.primary_type(), schema.format.as_deref()) {
        (Some("string"), Some("date-time" | "date")) => Some("DateTime"),
        (Some("string"), _) => Some("String"),
        (Some("integer"), Some("int64")) => Some("BigInt"),
        (Some("integer"), _) => Some("Int"),
        (Some("number"), _) => Some("Float"),
        (Some("boolean"), _) => Some("Boolean"),
        _ => None,
    }
}

fn field_type(spec: &SpecDocument, field: &FlatField<'_>) -> (String, bool) {
    let Some(schema) = resolve_schema(spec, field.schema) else {
        return ("Json".to_string(), false);
    };
    if schema.is_array() {
        let element = schema
            .items
            .as_deref()
            .and_then(|items| resolve_schema(spec, items))
            .and_then(scalar);
        return match element {
            Some(element) => (format!("{element}[]"), true),
            None => ("Json".to_string(), false),
        };
    }
    (scalar(schema).unwrap_or("Json").to_string(), false)
}

fn prisma_field(spec: &SpecDocument, field: &FlatField<'_>) -> PrismaField {
    let (base, is_list) = field_type(spec, field);
    let mut attributes = Vec::new();
    let name = if is_identifier(field.name) && !field.name.contains('$') {
        field.name.to_string()
    } else {
        attributes.push(format!("@map(\"{}\")", field.name.replace('"', "\\\"")));
        to_camel_case(field.name)
    };
    let is_id = field.name == "id";
    if is_id {
        attributes.insert(0, "@id".to_string());
        if base == "String" && field.schema.format.as_deref() == Some("uuid") {
            attributes.insert(1, "@default(uuid())".to_string());
        }
    } else if base == "DateTime" && matches!(field.name, "createdAt" | "created_at") {
        attributes.push("@default(now())".to_string());
    } else if base == "DateTime" && matches!(field.name, "updatedAt" | "updated_at") {
        attributes.push("@updatedAt".to_string());
    }
    let optional = !is_list && !is_id && !field.required;
    PrismaField {
        name,
        ty: if optional { format!("{base}?") } else { base },
        attributes,
    }
}

/// Aligned field lines of one model.
fn model_lines(fields: &[PrismaField]) -> Vec<String> {
    let name_width = fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
    let type_width = fields.iter().map(|f| f.ty.len()).max().unwrap_or(0);
    fields
        .iter()
        .map(|f| {
            if f.attributes.is_empty() {
                format!("{:name_width$} {}", f.name, f.ty)
            } else {
                format!(
                    "{:name_width$} {:type_width$} {}",
                    f.name,
                    f.ty,
                    f.attributes.join(" ")
                )
            }
        })
        .collect()
}

pub fn build_models(spec: &SpecDocument, model: &DomainModel) -> Vec<PrismaModel> {
    model
        .persisted_entities()
        .into_iter()
        .filter(|name| is_identifier(name))
        .filter_map(|name| {
            let schema = spec.schema(name)?;
            let flat = flattened_fields(spec, schema);
            if flat.is_empty() {
                return None;
            }
            let mut fields: Vec<PrismaField> = flat.iter().map(|f| prisma_field(spec, f)).collect();
            if !flat.iter().any(|f| f.name == "id") {
                fields.insert(
                    0,
                    PrismaField {
                        name: "id".to_string(),
                        ty: "String".to_string(),
                        attributes: vec!["@id".to_string(), "@default(uuid())".to_string()],
                    },
                );
            }
            Some(PrismaModel {
                name: name.to_string(),
                lines: model_lines(&fields),
            })
        })
        .collect()
}

pub fn emit(spec: &SpecDocument, model: &DomainModel) -> anyhow::Result<GeneratedFile> {
    let contents = render_with_header(&PrismaTemplate {
        models: build_models(spec, model),
    })?;
    Ok(GeneratedFile::new("prisma/schema.prisma", contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::fixtures::{analyze, WIDGETS};

    #[test]
    fn test_widget_model() {
        let (spec, model, _) = analyze(WIDGETS);
        let models = build_models(&spec, &model);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "Widget");
        assert_eq!(
            models[0].lines,
            vec![
                "id        String    @id @default(uuid())",
                "name      String",
                "size      Int?",
                "weight    Float?",
                "active    Boolean?",
                "createdAt DateTime? @default(now())",
                "tags      String[]",
            ]
        );
    }

    #[test]
    fn test_missing_id_and_odd_names() {
        let yaml = r#"
openapi: 3.0.3
info: {title: Ledger, version: '1'}
paths: {}
components:
  schemas:
    Entry:
      type: object
      required: [amount]
      properties:
        orgId: {type: string}
        amount: {type: integer, format: int64}
        line-items: {type: array, items: {type: object}}
"#;
        let (spec, model, _) = analyze(yaml);
        let models = build_models(&spec, &model);
        assert_eq!(
            models[0].lines,
            vec![
                "id        String  @id @default(uuid())",
                "orgId     String?",
                "amount    BigInt",
                "lineItems Json?   @map(\"line-items\")",
            ]
        );
        let file = emit(&spec, &model).unwrap();
        assert!(file.contents.starts_with("// Code generated by layergen."));
        assert!(file.contents.contains("model Entry {\n  id "));
        assert!(file.contents.contains("provider = \"prisma-client-js\""));
    }
}
