//! `types.ts` and `schemas.ts`: one declaration and one zod validator per
//! component schema, plus the inline request bodies and query parameter types
//! operations refer to.

use super::fs::GeneratedFile;
use super::templates::{render_with_header, SchemaEntry, SchemasTemplate, TypesTemplate};
use super::typescript::{doc_comment, property_key, ts_type, type_decl, zod_expr, FieldDecl, TypeDecl};
use crate::analysis::DomainModel;
use crate::casing::is_identifier;
use crate::error::Warning;
use crate::spec::SpecDocument;
use std::collections::HashSet;

/// Declarations and validators of one domain, in emission order.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    pub decls: Vec<TypeDecl>,
    pub validators: Vec<SchemaEntry>,
}

impl TypeCatalog {
    pub fn type_names(&self) -> Vec<String> {
        self.decls.iter().map(|d| d.name.clone()).collect()
    }

    pub fn validator_names(&self) -> Vec<String> {
        self.validators.iter().map(|v| v.name.clone()).collect()
    }
}

/// Collect every type the domain exports.
///
/// Component schemas whose names are not TypeScript identifiers are skipped
/// with a warning.
pub fn build_catalog(
    spec: &SpecDocument,
    model: &DomainModel,
    warnings: &mut Vec<Warning>,
) -> TypeCatalog {
    let mut catalog = TypeCatalog::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (name, schema) in spec.components.schemas.iter() {
        if !is_identifier(name) {
            warnings.push(Warning::irregularity(
                format!("schema:{name}"),
                "schema name is not a valid TypeScript identifier; skipped",
            ));
            continue;
        }
        seen.insert(name.to_string());
        catalog.decls.push(type_decl(spec, name, schema));
        catalog.validators.push(SchemaEntry {
            name: name.to_string(),
            expr: zod_expr(spec, schema),
        });
    }

    for plan in model.operations() {
        let Some(op) = spec.operation(&plan.operation_id) else {
            continue;
        };
        if let Some(request_type) = &plan.request_type {
            let inline = op.request_schema().filter(|s| s.reference.is_none());
            if let Some(schema) = inline {
                if seen.insert(request_type.clone()) {
                    catalog.decls.push(type_decl(spec, request_type, schema));
                    catalog.validators.push(SchemaEntry {
                        name: request_type.clone(),
                        expr: zod_expr(spec, schema),
                    });
                }
            }
        }
        if let Some(params_type) = &plan.params_type {
            if seen.insert(params_type.clone()) {
                let fields = op
                    .query_parameters()
                    .map(|p| FieldDecl {
                        key: property_key(&p.name),
                        ts_type: p
                            .schema
                            .as_ref()
                            .map(|s| ts_type(spec, s))
                            .unwrap_or_else(|| "string".to_string()),
                        optional: !p.required,
                        doc: doc_comment(p.description.as_deref()),
                    })
                    .collect();
                catalog.decls.push(TypeDecl {
                    name: params_type.clone(),
                    doc: format!("/** Query parameters of `{}`. */", plan.operation_id),
                    is_alias: false,
                    alias: String::new(),
                    extends: String::new(),
                    fields,
                });
            }
        }
    }
    catalog
}

pub fn emit_types(catalog: &TypeCatalog) -> anyhow::Result<GeneratedFile> {
    let contents = render_with_header(&TypesTemplate {
        decls: catalog.decls.clone(),
    })?;
    Ok(GeneratedFile::new("types.ts", contents))
}

pub fn emit_schemas(catalog: &TypeCatalog) -> anyhow::Result<GeneratedFile> {
    let contents = render_with_header(&SchemasTemplate {
        entries: catalog.validators.clone(),
    })?;
    Ok(GeneratedFile::new("schemas.ts", contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::config::{ClassificationConfig, VerbConfig};
    use crate::spec::parse_spec_str;

    const SPEC: &str = r#"
openapi: 3.0.3
info: {title: Widgets, version: '1'}
paths:
  /widgets:
    get:
      operationId: listWidgets
      parameters:
        - {name: page, in: query, schema: {type: integer}}
        - {name: sort-by, in: query, required: true, schema: {type: string}}
      responses:
        '200': {description: ok}
    post:
      operationId: createWidget
      requestBody:
        content:
          application/json:
            schema:
              type: object
              required: [name]
              properties: {name: {type: string}}
      responses:
        '201': {description: ok}
components:
  schemas:
    Widget:
      type: object
      required: [id]
      properties: {id: {type: string}, name: {type: string}}
    not-valid: {type: string}
"#;

    fn catalog() -> (TypeCatalog, Vec<Warning>) {
        let (spec, _) = parse_spec_str(SPEC, true).unwrap();
        let classification = ClassificationConfig::default();
        let verbs = VerbConfig::default();
        let analyzer = Analyzer::new(&spec, &classification, &verbs);
        let mut warnings = Vec::new();
        let mut model = DomainModel::new("widgets");
        model.resources = analyzer.plan_resources(&mut warnings);
        let catalog = build_catalog(&spec, &model, &mut warnings);
        (catalog, warnings)
    }

    #[test]
    fn test_catalog_covers_components_bodies_and_params() {
        let (catalog, warnings) = catalog();
        assert_eq!(
            catalog.type_names(),
            vec!["Widget", "ListWidgetsParams", "CreateWidgetBody"]
        );
        assert_eq!(catalog.validator_names(), vec!["Widget", "CreateWidgetBody"]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].location, "schema:not-valid");
    }

    #[test]
    fn test_rendered_types_and_schemas() {
        let (catalog, _) = catalog();
        let types = emit_types(&catalog).unwrap();
        assert!(types.contents.starts_with(super::super::fs::GENERATED_HEADER));
        assert!(types.contents.contains("export interface Widget {\n  id: string;\n  name?: string;\n}"));
        assert!(types.contents.contains("  'sort-by': string;"));
        assert!(types.contents.contains("  page?: number;"));

        let schemas = emit_schemas(&catalog).unwrap();
        assert!(schemas.contents.contains("import { z } from 'zod';"));
        assert!(schemas.contents.contains("export const WidgetSchema = "));
        assert!(schemas.contents.contains("export const CreateWidgetBodySchema = "));
    }
}
