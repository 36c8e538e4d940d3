//! askama template data for every emitted file.
//!
//! Templates live in `templates/` and only see plain strings, flags and lists;
//! all decisions are made by the emitters before rendering.

use askama::Template;

use super::fs::GENERATED_HEADER;
use super::typescript::TypeDecl;

/// Render `template` and prefix the generated-file header.
pub fn render_with_header<T: Template>(template: &T) -> anyhow::Result<String> {
    let body = template.render()?;
    Ok(format!("{GENERATED_HEADER}\n{}", body.trim_start_matches('\n')))
}

/// `types.ts`
#[derive(Template)]
#[template(path = "types.ts.txt", escape = "none")]
pub struct TypesTemplate {
    pub decls: Vec<TypeDecl>,
}

/// One `export const <name>Schema = <expr>;` line.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub name: String,
    pub expr: String,
}

/// `schemas.ts`
#[derive(Template)]
#[template(path = "schemas.ts.txt", escape = "none")]
pub struct SchemasTemplate {
    pub entries: Vec<SchemaEntry>,
}

/// `repositories/base.ts`
#[derive(Template)]
#[template(path = "repository_base.ts.txt", escape = "none")]
pub struct RepositoryBaseTemplate;

/// `repositories/<resource>.repository.ts`
#[derive(Template)]
#[template(path = "repository.ts.txt", escape = "none")]
pub struct RepositoryTemplate {
    pub resource: String,
    pub interface_name: String,
    pub base_interface: String,
    pub base_type: String,
    /// Comma separated names imported from `../types`, or empty
    pub type_imports: String,
    pub entity_unknown: bool,
}

/// `handlers/envelope.ts`
#[derive(Template)]
#[template(path = "envelope.ts.txt", escape = "none")]
pub struct EnvelopeTemplate;

/// `handlers/<resource>/<operation>.handler.ts`
#[derive(Template)]
#[template(path = "handler.ts.txt", escape = "none")]
pub struct HandlerTemplate {
    pub imports: Vec<String>,
    pub deps_name: String,
    /// `deps`, or `_deps` when the handler needs no dependencies
    pub deps_param: String,
    pub deps: Vec<String>,
    pub method: String,
    pub path: String,
    pub summary: String,
    pub handler_name: String,
    pub query_type: String,
    pub body_type: String,
    pub body: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ConverterField {
    pub key: String,
    pub quoted: String,
}

/// `converters/<entity>.converter.ts`
#[derive(Template)]
#[template(path = "converter.ts.txt", escape = "none")]
pub struct ConverterTemplate {
    pub entity: String,
    pub fields: Vec<ConverterField>,
}

#[derive(Debug, Clone)]
pub struct PrismaModel {
    pub name: String,
    pub lines: Vec<String>,
}

/// `prisma/schema.prisma`
#[derive(Template)]
#[template(path = "schema.prisma.txt", escape = "none")]
pub struct PrismaTemplate {
    pub models: Vec<PrismaModel>,
}

#[derive(Debug, Clone)]
pub struct FactoryField {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Factory {
    pub entity: String,
    pub fields: Vec<FactoryField>,
}

/// `__tests__/factories.ts`
#[derive(Template)]
#[template(path = "factories.ts.txt", escape = "none")]
pub struct FactoriesTemplate {
    pub type_imports: String,
    pub factories: Vec<Factory>,
}

#[derive(Debug, Clone)]
pub struct RepositoryMock {
    pub resource: String,
    pub interface_name: String,
    pub entity: String,
    pub has_create: bool,
    pub has_update: bool,
    pub has_delete: bool,
    pub create_input: String,
    pub update_input: String,
}

/// `__tests__/repository-mocks.ts`
#[derive(Template)]
#[template(path = "repository_mocks.ts.txt", escape = "none")]
pub struct RepositoryMocksTemplate {
    pub repo_imports: String,
    pub type_imports: String,
    pub mocks: Vec<RepositoryMock>,
}

/// Any `index.ts` made of export lines.
#[derive(Template)]
#[template(path = "barrel.ts.txt", escape = "none")]
pub struct BarrelTemplate {
    pub lines: Vec<String>,
}
