//! Mapping of OpenAPI schemas to TypeScript types and zod validators.

use crate::casing::is_identifier;
use crate::spec::refs::{parse_local_ref, resolve_schema, ComponentKind};
use crate::spec::{AdditionalProperties, SchemaDefinition, SpecDocument};

const MAX_DEPTH: usize = 12;

/// Name of the component schema a `$ref` denotes, if it is declared in `spec`.
pub fn component_name(spec: &SpecDocument, reference: &str) -> Option<String> {
    let local = parse_local_ref(reference)?;
    if local.kind != ComponentKind::Schemas || local.member.is_some() {
        return None;
    }
    (spec.schema(&local.name).is_some() && is_identifier(&local.name)).then_some(local.name)
}

/// Property key as written in an object type or literal.
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

/// Single-quoted TypeScript string literal.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => quote(s),
        serde_json::Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn wrap_union_member(ty: String) -> String {
    if ty.contains(" | ") || ty.contains(" & ") {
        format!("({ty})")
    } else {
        ty
    }
}

/// TypeScript type expression for `schema`.
pub fn ts_type(spec: &SpecDocument, schema: &SchemaDefinition) -> String {
    ts_type_at(spec, schema, 0)
}

fn ts_type_at(spec: &SpecDocument, schema: &SchemaDefinition, depth: usize) -> String {
    if depth > MAX_DEPTH {
        return "unknown".to_string();
    }
    let base = if let Some(reference) = schema.reference.as_deref() {
        component_name(spec, reference).unwrap_or_else(|| "unknown".to_string())
    } else if !schema.all_of.is_empty() {
        let mut parts: Vec<String> = schema
            .all_of
            .iter()
            .map(|s| wrap_union_member(ts_type_at(spec, s, depth + 1)))
            .collect();
        if !schema.properties.is_empty() {
            parts.push(inline_object(spec, schema, depth));
        }
        parts.join(" & ")
    } else if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
        let members = if schema.one_of.is_empty() {
            &schema.any_of
        } else {
            &schema.one_of
        };
        let mut parts: Vec<String> = Vec::new();
        for member in members {
            let ty = ts_type_at(spec, member, depth + 1);
            if !parts.contains(&ty) {
                parts.push(ty);
            }
        }
        parts.join(" | ")
    } else if !schema.enum_values.is_empty() {
        schema
            .enum_values
            .iter()
            .map(literal)
            .collect::<Vec<_>>()
            .join(" | ")
    } else {
        match schema.primary_type() {
            Some("string") => "string".to_string(),
            Some("integer") | Some("number") => "number".to_string(),
            Some("boolean") => "boolean".to_string(),
            Some("null") => "null".to_string(),
            Some("array") => {
                let inner = schema
                    .items
                    .as_deref()
                    .map(|items| ts_type_at(spec, items, depth + 1))
                    .unwrap_or_else(|| "unknown".to_string());
                if is_identifier(&inner) {
                    format!("{inner}[]")
                } else {
                    format!("Array<{inner}>")
                }
            }
            _ if !schema.properties.is_empty() => inline_object(spec, schema, depth),
            _ => match &schema.additional_properties {
                Some(AdditionalProperties::Schema(inner)) => {
                    format!("Record<string, {}>", ts_type_at(spec, inner, depth + 1))
                }
                _ if schema.is_object() || schema.primary_type() == Some("object") => {
                    "Record<string, unknown>".to_string()
                }
                _ => "unknown".to_string(),
            },
        }
    };
    if schema.is_nullable() && base != "null" && !base.ends_with(" | null") {
        format!("{} | null", wrap_union_member(base))
    } else {
        base
    }
}

fn inline_object(spec: &SpecDocument, schema: &SchemaDefinition, depth: usize) -> String {
    let fields: Vec<String> = schema
        .properties
        .iter()
        .map(|(name, prop)| {
            let optional = if schema.is_required(name) { "" } else { "?" };
            format!(
                "{}{optional}: {}",
                property_key(name),
                ts_type_at(spec, prop, depth + 1)
            )
        })
        .collect();
    format!("{{ {} }}", fields.join("; "))
}

/// One field of an emitted interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub key: String,
    pub ts_type: String,
    pub optional: bool,
    /// `/** ... */` line, or empty
    pub doc: String,
}

/// A top-level type declaration in `types.ts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    /// `/** ... */` line, or empty
    pub doc: String,
    /// When set, the declaration is `export type Name = <alias>;`
    pub is_alias: bool,
    pub alias: String,
    /// ` extends A, B` or empty
    pub extends: String,
    pub fields: Vec<FieldDecl>,
}

pub fn doc_comment(text: Option<&str>) -> String {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => format!("/** {} */", t.replace("*/", "*\\/").replace('\n', " ")),
        None => String::new(),
    }
}

fn fields_of(spec: &SpecDocument, schema: &SchemaDefinition) -> Vec<FieldDecl> {
    schema
        .properties
        .iter()
        .map(|(name, prop)| FieldDecl {
            key: property_key(name),
            ts_type: ts_type(spec, prop),
            optional: !schema.is_required(name),
            doc: doc_comment(prop.description.as_deref()),
        })
        .collect()
}

/// Declaration for a named schema: an interface for plain objects and for
/// `allOf` compositions of named schemas and inline objects, a type alias otherwise.
pub fn type_decl(spec: &SpecDocument, name: &str, schema: &SchemaDefinition) -> TypeDecl {
    let doc = doc_comment(schema.description.as_deref());
    let open_record = matches!(
        schema.additional_properties,
        Some(AdditionalProperties::Schema(_))
    );
    let interface_candidate = schema.reference.is_none()
        && schema.one_of.is_empty()
        && schema.any_of.is_empty()
        && schema.enum_values.is_empty()
        && !schema.is_nullable()
        && !open_record
        && matches!(schema.primary_type(), None | Some("object"))
        && (!schema.properties.is_empty() || !schema.all_of.is_empty());

    if interface_candidate {
        let mut extends = Vec::new();
        let mut fields = Vec::new();
        let mut composable = true;
        for member in &schema.all_of {
            match member.reference.as_deref().and_then(|r| component_name(spec, r)) {
                Some(parent) => extends.push(parent),
                None if member.reference.is_none() && member.is_object() => {
                    fields.extend(fields_of(spec, member));
                }
                None => composable = false,
            }
        }
        fields.extend(fields_of(spec, schema));
        if composable {
            return TypeDecl {
                name: name.to_string(),
                doc,
                is_alias: false,
                alias: String::new(),
                extends: if extends.is_empty() {
                    String::new()
                } else {
                    format!(" extends {}", extends.join(", "))
                },
                fields,
            };
        }
    }
    TypeDecl {
        name: name.to_string(),
        doc,
        is_alias: true,
        alias: ts_type(spec, schema),
        extends: String::new(),
        fields: Vec::new(),
    }
}

/// A property reached through `$ref`s and `allOf` members.
#[derive(Debug, Clone, Copy)]
pub struct FlatField<'s> {
    pub name: &'s str,
    pub schema: &'s SchemaDefinition,
    pub required: bool,
}

/// Properties of `schema` including inherited `allOf` members; the first
/// declaration of a name wins.
pub fn flattened_fields<'s>(spec: &'s SpecDocument, schema: &'s SchemaDefinition) -> Vec<FlatField<'s>> {
    let mut out = Vec::new();
    collect_fields(spec, schema, 0, &mut out);
    out
}

fn collect_fields<'s>(
    spec: &'s SpecDocument,
    schema: &'s SchemaDefinition,
    depth: usize,
    out: &mut Vec<FlatField<'s>>,
) {
    if depth > MAX_DEPTH {
        return;
    }
    let Some(schema) = resolve_schema(spec, schema) else {
        return;
    };
    for member in &schema.all_of {
        collect_fields(spec, member, depth + 1, out);
    }
    for (name, prop) in &schema.properties {
        if out.iter().any(|f| f.name == name) {
            continue;
        }
        out.push(FlatField {
            name,
            schema: prop,
            required: schema.is_required(name),
        });
    }
}

/// zod expression validating `schema`.
pub fn zod_expr(spec: &SpecDocument, schema: &SchemaDefinition) -> String {
    zod_at(spec, schema, 0)
}

fn zod_at(spec: &SpecDocument, schema: &SchemaDefinition, depth: usize) -> String {
    if depth > MAX_DEPTH {
        return "z.unknown()".to_string();
    }
    let base = if let Some(reference) = schema.reference.as_deref() {
        match component_name(spec, reference) {
            Some(name) => format!("z.lazy(() => {name}Schema)"),
            None => "z.unknown()".to_string(),
        }
    } else if !schema.all_of.is_empty() {
        let mut parts: Vec<String> = schema
            .all_of
            .iter()
            .map(|s| zod_at(spec, s, depth + 1))
            .collect();
        if !schema.properties.is_empty() {
            parts.push(zod_object(spec, schema, depth));
        }
        let mut iter = parts.into_iter();
        let first = iter.next().unwrap_or_else(|| "z.unknown()".to_string());
        iter.fold(first, |acc, next| format!("{acc}.and({next})"))
    } else if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
        let members = if schema.one_of.is_empty() {
            &schema.any_of
        } else {
            &schema.one_of
        };
        let parts: Vec<String> = members.iter().map(|m| zod_at(spec, m, depth + 1)).collect();
        match parts.len() {
            1 => parts.into_iter().next().unwrap_or_default(),
            _ => format!("z.union([{}])", parts.join(", ")),
        }
    } else if schema.is_string_enum() {
        let values: Vec<String> = schema.enum_values.iter().map(literal).collect();
        format!("z.enum([{}])", values.join(", "))
    } else if !schema.enum_values.is_empty() {
        let values: Vec<String> = schema
            .enum_values
            .iter()
            .map(|v| format!("z.literal({})", literal(v)))
            .collect();
        match values.len() {
            1 => values.into_iter().next().unwrap_or_default(),
            _ => format!("z.union([{}])", values.join(", ")),
        }
    } else {
        match schema.primary_type() {
            Some("string") => {
                let mut expr = "z.string()".to_string();
                match schema.format.as_deref() {
                    Some("email") => expr.push_str(".email()"),
                    Some("uuid") => expr.push_str(".uuid()"),
                    Some("uri") | Some("url") => expr.push_str(".url()"),
                    Some("date-time") => expr.push_str(".datetime()"),
                    _ => {}
                }
                if let Some(min) = schema.min_length {
                    expr.push_str(&format!(".min({min})"));
                }
                if let Some(max) = schema.max_length {
                    expr.push_str(&format!(".max({max})"));
                }
                expr
            }
            Some(t @ ("integer" | "number")) => {
                let mut expr = "z.number()".to_string();
                if t == "integer" {
                    expr.push_str(".int()");
                }
                if let Some(min) = schema.minimum {
                    expr.push_str(&format!(".min({min})"));
                }
                if let Some(max) = schema.maximum {
                    expr.push_str(&format!(".max({max})"));
                }
                expr
            }
            Some("boolean") => "z.boolean()".to_string(),
            Some("null") => "z.null()".to_string(),
            Some("array") => {
                let inner = schema
                    .items
                    .as_deref()
                    .map(|items| zod_at(spec, items, depth + 1))
                    .unwrap_or_else(|| "z.unknown()".to_string());
                format!("z.array({inner})")
            }
            _ if !schema.properties.is_empty() => zod_object(spec, schema, depth),
            _ => match &schema.additional_properties {
                Some(AdditionalProperties::Schema(inner)) => {
                    format!("z.record({})", zod_at(spec, inner, depth + 1))
                }
                _ if schema.primary_type() == Some("object") => {
                    "z.record(z.unknown())".to_string()
                }
                _ => "z.unknown()".to_string(),
            },
        }
    };
    if schema.is_nullable() {
        format!("{base}.nullable()")
    } else {
        base
    }
}

fn zod_object(spec: &SpecDocument, schema: &SchemaDefinition, depth: usize) -> String {
    let fields: Vec<String> = schema
        .properties
        .iter()
        .map(|(name, prop)| {
            let optional = if schema.is_required(name) {
                ""
            } else {
                ".optional()"
            };
            format!(
                "{}: {}{optional}",
                property_key(name),
                zod_at(spec, prop, depth + 1)
            )
        })
        .collect();
    format!("z.object({{ {} }})", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_spec_value;
    use serde_json::json;

    fn spec() -> SpecDocument {
        parse_spec_value(json!({
            "openapi": "3.1.0",
            "info": {"title": "Ts", "version": "1"},
            "paths": {},
            "components": {"schemas": {
                "Widget": {
                    "type": "object",
                    "description": "A widget",
                    "required": ["id"],
                    "properties": {
                        "id": {"type": "string", "format": "uuid"},
                        "size": {"type": "integer", "minimum": 1},
                        "tags": {"type": "array", "items": {"type": "string"}},
                        "kind": {"type": "string", "enum": ["a", "b"]},
                        "owner": {"$ref": "#/components/schemas/Owner"},
                        "note": {"type": ["string", "null"]},
                        "x-trace": {"type": "string"}
                    }
                },
                "Owner": {"type": "object", "properties": {"name": {"type": "string"}}},
                "Audited": {"allOf": [
                    {"$ref": "#/components/schemas/Owner"},
                    {"type": "object", "properties": {"createdAt": {"type": "string"}}}
                ]},
                "Labels": {"type": "object", "additionalProperties": {"type": "string"}},
                "Status": {"type": "string", "enum": ["open", "closed"]}
            }}
        }))
        .unwrap()
        .0
    }

    fn schema(v: serde_json::Value) -> SchemaDefinition {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_ts_type_mapping() {
        let spec = spec();
        assert_eq!(
            ts_type(&spec, &schema(json!({"$ref": "#/components/schemas/Owner"}))),
            "Owner"
        );
        assert_eq!(
            ts_type(&spec, &schema(json!({"$ref": "#/components/schemas/Missing"}))),
            "unknown"
        );
        assert_eq!(
            ts_type(&spec, &schema(json!({"type": "array", "items": {"$ref": "#/components/schemas/Owner"}}))),
            "Owner[]"
        );
        assert_eq!(
            ts_type(&spec, &schema(json!({"type": "array", "items": {"type": "string", "enum": ["x", "y"]}}))),
            "Array<'x' | 'y'>"
        );
        assert_eq!(
            ts_type(&spec, &schema(json!({"type": ["integer", "null"]}))),
            "number | null"
        );
        assert_eq!(
            ts_type(&spec, &schema(json!({"type": "object", "additionalProperties": {"type": "boolean"}}))),
            "Record<string, boolean>"
        );
    }

    #[test]
    fn test_interface_decl() {
        let spec = spec();
        let decl = type_decl(&spec, "Widget", spec.schema("Widget").unwrap());
        assert!(!decl.is_alias);
        assert_eq!(decl.doc, "/** A widget */");
        let rendered: Vec<String> = decl
            .fields
            .iter()
            .map(|f| format!("{}{}: {}", f.key, if f.optional { "?" } else { "" }, f.ts_type))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "id: string",
                "size?: number",
                "tags?: string[]",
                "kind?: 'a' | 'b'",
                "owner?: Owner",
                "note?: string | null",
                "'x-trace'?: string",
            ]
        );
    }

    #[test]
    fn test_all_of_becomes_extends() {
        let spec = spec();
        let decl = type_decl(&spec, "Audited", spec.schema("Audited").unwrap());
        assert!(!decl.is_alias);
        assert_eq!(decl.extends, " extends Owner");
        assert_eq!(decl.fields[0].key, "createdAt");
    }

    #[test]
    fn test_aliases() {
        let spec = spec();
        let labels = type_decl(&spec, "Labels", spec.schema("Labels").unwrap());
        assert!(labels.is_alias);
        assert_eq!(labels.alias, "Record<string, string>");
        let status = type_decl(&spec, "Status", spec.schema("Status").unwrap());
        assert_eq!(status.alias, "'open' | 'closed'");
    }

    #[test]
    fn test_zod_expr() {
        let spec = spec();
        assert_eq!(
            zod_expr(&spec, &schema(json!({"type": "string", "format": "email", "maxLength": 5}))),
            "z.string().email().max(5)"
        );
        assert_eq!(
            zod_expr(&spec, &schema(json!({"type": "integer", "minimum": 0}))),
            "z.number().int().min(0)"
        );
        assert_eq!(
            zod_expr(&spec, &schema(json!({"$ref": "#/components/schemas/Owner"}))),
            "z.lazy(() => OwnerSchema)"
        );
        assert_eq!(
            zod_expr(&spec, &schema(json!({
                "type": "object",
                "required": ["name"],
                "properties": {"name": {"type": "string"}, "age": {"type": "number", "nullable": true}}
            }))),
            "z.object({ name: z.string(), age: z.number().nullable().optional() })"
        );
        assert_eq!(
            zod_expr(&spec, &schema(json!({"type": "string", "enum": ["a", "b"]}))),
            "z.enum(['a', 'b'])"
        );
    }

    #[test]
    fn test_flattened_fields_follow_refs_and_all_of() {
        let spec = spec();
        let audited = spec.schema("Audited").unwrap();
        let names: Vec<_> = flattened_fields(&spec, audited).iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["name", "createdAt"]);

        let widget = schema(json!({"$ref": "#/components/schemas/Widget"}));
        let fields = flattened_fields(&spec, &widget);
        assert!(fields.iter().any(|f| f.name == "id" && f.required));
        assert!(fields.iter().any(|f| f.name == "size" && !f.required));
    }
}
