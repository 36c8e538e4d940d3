//! Handler stubs: one `handlers/<resource>/<operation>.handler.ts` per operation.
//!
//! The body of each handler follows from the response shape and the verb. When
//! a repository method covers the operation the handler calls it; otherwise it
//! delegates to an injected `source` or throws until implemented.

use super::fs::GeneratedFile;
use super::repositories::exported_capability;
use super::templates::{render_with_header, BarrelTemplate, EnvelopeTemplate, HandlerTemplate};
use crate::analysis::{DomainModel, OperationPlan, RepositoryCapability, ResponseShape, Verb};
use crate::casing::{is_identifier, to_camel_case};

const DEFAULT_QUERY_TYPE: &str = "Record<string, unknown>";

/// Dependencies and statements of one handler function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerBody {
    pub deps: Vec<String>,
    pub lines: Vec<String>,
}

struct HandlerContext<'a> {
    plan: &'a OperationPlan,
    repo: Option<&'a RepositoryCapability>,
    repo_expr: String,
    id_expr: String,
    query_type: String,
    body_type: String,
    input_line: String,
    status: u16,
}

impl HandlerContext<'_> {
    fn request_signature(&self) -> String {
        format!(
            "source(request: HandlerRequest<{}, {}>): Promise<unknown>",
            self.query_type, self.body_type
        )
    }

    fn find_by_id(&self) -> Vec<String> {
        vec![
            format!("const entity = await {}.findById({});", self.repo_expr, self.id_expr),
            "if (entity === null) {".to_string(),
            "  return { status: 404 };".to_string(),
            "}".to_string(),
        ]
    }

    /// Whether the handler's request body is the input type `method` expects.
    fn input_matches(&self, expected: &Option<String>) -> bool {
        expected.is_some() && expected.as_deref() == Some(self.body_type.as_str())
    }

    /// Repository call performing the operation's mutation, if one fits.
    fn mutation(&self) -> Option<Vec<String>> {
        let repo = self.repo?;
        let r = &self.repo_expr;
        match self.plan.verb {
            Verb::Create if repo.kind.has_create() && self.input_matches(&repo.create_input) => {
                Some(vec![
                    self.input_line.clone(),
                    format!("const entity = await {r}.create(input);"),
                ])
            }
            Verb::Update | Verb::Patch
                if repo.kind.has_update() && self.input_matches(&repo.update_input) =>
            {
                Some(vec![
                    self.input_line.clone(),
                    format!("const entity = await {r}.update({}, input);", self.id_expr),
                ])
            }
            Verb::Delete if repo.kind.has_delete() => {
                let mut lines = self.find_by_id();
                lines.push(format!("await {r}.delete({});", self.id_expr));
                Some(lines)
            }
            _ => None,
        }
    }

    fn not_implemented(&self, reason: &str) -> Vec<String> {
        vec![
            format!("// TODO: {reason}"),
            format!(
                "throw new Error('Not implemented: {}');",
                self.plan.operation_id
            ),
        ]
    }

    fn build(&self, model: &DomainModel) -> HandlerBody {
        let status = self.status;
        let mut body = HandlerBody::default();
        let entity_known = self
            .plan
            .shape
            .entity()
            .is_some_and(|e| model.exports_type(e));
        let list_query = match self.repo.and_then(|r| r.list_params.as_deref()) {
            Some(params) if params == self.query_type => "request.query",
            None if self.query_type == DEFAULT_QUERY_TYPE => "request.query",
            _ => "",
        };
        let r = &self.repo_expr;

        match &self.plan.shape {
            ResponseShape::FullEnvelope => {
                body.deps.push(self.request_signature());
                body.lines.extend([
                    "// The source returns the complete { data, meta } envelope.".to_string(),
                    "const body = await deps.source(request);".to_string(),
                    format!("return {{ status: {status}, body }};"),
                ]);
            }
            ResponseShape::TaskAccepted => {
                body.lines.push(format!(
                    "return {{ status: {status}, body: envelope({{ status: 'accepted' }}) }};"
                ));
            }
            ResponseShape::OperationSuccess | ResponseShape::Empty => {
                match self.mutation() {
                    Some(lines) => body.lines.extend(lines),
                    None if matches!(
                        self.plan.verb,
                        Verb::Create | Verb::Update | Verb::Patch | Verb::Delete
                    ) =>
                    {
                        body.lines.push(format!(
                            "// TODO: perform {} before acknowledging it.",
                            self.plan.operation_id
                        ));
                    }
                    None => {}
                }
                if self.plan.shape == ResponseShape::Empty {
                    body.lines.push(format!("return {{ status: {status} }};"));
                } else {
                    body.lines.push(format!(
                        "return {{ status: {status}, body: envelope({{ success: true }}) }};"
                    ));
                }
            }
            _ if !entity_known => {
                body.deps.push(self.request_signature());
                body.lines.extend([
                    "// TODO: the response entity could not be determined; the payload is passed through untyped."
                        .to_string(),
                    "const payload: unknown = await deps.source(request);".to_string(),
                    format!("return {{ status: {status}, body: envelope(payload) }};"),
                ]);
            }
            ResponseShape::PaginatedItems { .. } if self.repo.is_some() => {
                body.lines.extend([
                    format!("const page = await {r}.findMany({list_query});"),
                    format!(
                        "return {{ status: {status}, body: envelope({{ items: page.items }}, {{ pagination: {{ total: page.total }} }}) }};"
                    ),
                ]);
            }
            ResponseShape::ArrayOfEntity { .. } if self.repo.is_some() => {
                body.lines.extend([
                    format!("const page = await {r}.findMany({list_query});"),
                    format!("return {{ status: {status}, body: envelope(page.items) }};"),
                ]);
            }
            ResponseShape::SingleEntity { .. } if self.repo.is_some() => {
                match (self.plan.verb, self.mutation()) {
                    (_, Some(lines)) => {
                        body.lines.extend(lines);
                        body.lines
                            .push(format!("return {{ status: {status}, body: envelope(entity) }};"));
                    }
                    (Verb::Get, None) => {
                        body.lines.extend(self.find_by_id());
                        body.lines
                            .push(format!("return {{ status: {status}, body: envelope(entity) }};"));
                    }
                    (_, None) if self.plan.needs_data_access => body.lines.extend(
                        self.not_implemented(&format!("compute the response from the entities in {r}.")),
                    ),
                    (verb, None) => body.lines.extend(self.not_implemented(&format!(
                        "no repository method covers this {verb} operation."
                    ))),
                }
            }
            _ => body
                .lines
                .extend(self.not_implemented("no repository backs this operation.")),
        }
        if let Some(repo) = self.repo {
            body.deps
                .insert(0, format!("{}: {}", repo_field(repo), repo.interface_name()));
        }
        // only what the statements use
        body.deps.retain(|d| {
            let name = d.split([':', '(']).next().unwrap_or_default();
            body.lines.iter().any(|l| l.contains(&format!("deps.{name}")))
        });
        body
    }
}

fn repo_field(repo: &RepositoryCapability) -> String {
    format!("{}Repository", to_camel_case(&repo.resource))
}

fn id_expression(plan: &OperationPlan) -> String {
    let name = plan.path_params.first().map_or("id", String::as_str);
    if is_identifier(name) {
        format!("request.params.{name}")
    } else {
        format!("request.params['{name}']")
    }
}

/// Decide dependencies and statements for one operation.
pub fn handler_body(
    model: &DomainModel,
    plan: &OperationPlan,
    repo: Option<&RepositoryCapability>,
) -> HandlerBody {
    let repo = repo.filter(|_| plan.uses_repository);
    let query_type = plan
        .params_type
        .clone()
        .filter(|t| model.exports_type(t))
        .unwrap_or_else(|| DEFAULT_QUERY_TYPE.to_string());
    let request_type = plan.request_type.clone().filter(|t| model.exports_type(t));
    let input_line = match &request_type {
        Some(t) if model.has_validator(t) => format!("const input = {t}Schema.parse(request.body);"),
        _ => "const input = request.body;".to_string(),
    };
    let context = HandlerContext {
        plan,
        repo,
        repo_expr: repo.map(|r| format!("deps.{}", repo_field(r))).unwrap_or_default(),
        id_expr: id_expression(plan),
        query_type,
        body_type: request_type.unwrap_or_else(|| "unknown".to_string()),
        input_line,
        status: plan.status_code(),
    };
    context.build(model)
}

fn render_handler(
    model: &DomainModel,
    plan: &OperationPlan,
    repo: Option<&RepositoryCapability>,
) -> anyhow::Result<String> {
    let body = handler_body(model, plan, repo);
    let query_type = plan
        .params_type
        .clone()
        .filter(|t| model.exports_type(t));
    let body_type = plan.request_type.clone().filter(|t| model.exports_type(t));

    let mut imports =
        vec!["import type { HandlerRequest, HandlerResponse } from '../envelope';".to_string()];
    if body.lines.iter().any(|l| l.contains("envelope(")) {
        imports.push("import { envelope } from '../envelope';".to_string());
    }
    let repo = repo.filter(|r| body.deps.iter().any(|d| d.starts_with(&repo_field(r))));
    if let Some(repo) = repo {
        imports.push(format!(
            "import type {{ {} }} from '../../repositories';",
            repo.interface_name()
        ));
    }
    let mut type_names: Vec<&str> = Vec::new();
    for name in [query_type.as_deref(), body_type.as_deref()].into_iter().flatten() {
        if !type_names.contains(&name) {
            type_names.push(name);
        }
    }
    if !type_names.is_empty() {
        imports.push(format!(
            "import type {{ {} }} from '../../types';",
            type_names.join(", ")
        ));
    }
    if let Some(t) = &body_type {
        if body.lines.iter().any(|l| l.contains(&format!("{t}Schema.parse"))) {
            imports.push(format!("import {{ {t}Schema }} from '../../schemas';"));
        }
    }

    render_with_header(&HandlerTemplate {
        imports,
        deps_name: format!("{}Deps", plan.type_prefix()),
        deps_param: if body.deps.is_empty() { "_deps" } else { "deps" }.to_string(),
        deps: body.deps,
        method: plan.method.as_str().to_string(),
        path: plan.path.clone(),
        summary: plan
            .summary
            .as_deref()
            .map(|s| s.replace("*/", "*\\/").replace('\n', " "))
            .unwrap_or_default(),
        handler_name: plan.handler_name(),
        query_type: query_type.unwrap_or_else(|| DEFAULT_QUERY_TYPE.to_string()),
        body_type: body_type.unwrap_or_else(|| "unknown".to_string()),
        body: body.lines,
    })
}

pub fn emit(model: &DomainModel) -> anyhow::Result<Vec<GeneratedFile>> {
    let mut files = vec![GeneratedFile::new(
        "handlers/envelope.ts",
        render_with_header(&EnvelopeTemplate)?,
    )];
    let mut root_exports = vec!["export * from './envelope';".to_string()];

    for resource in &model.resources {
        if resource.operations.is_empty() {
            continue;
        }
        let repo = resource
            .repository
            .as_ref()
            .map(|r| exported_capability(model, r));
        let mut exports = Vec::new();
        for plan in &resource.operations {
            let stem = format!("{}.handler", plan.file_stem());
            let contents = render_handler(model, plan, repo.as_ref())?;
            files.push(GeneratedFile::new(
                format!("handlers/{}/{stem}.ts", resource.name),
                contents,
            ));
            exports.push(format!("export * from './{stem}';"));
        }
        files.push(GeneratedFile::new(
            format!("handlers/{}/index.ts", resource.name),
            render_with_header(&BarrelTemplate { lines: exports })?,
        ));
        root_exports.push(format!("export * from './{}';", resource.name));
    }

    files.push(GeneratedFile::new(
        "handlers/index.ts",
        render_with_header(&BarrelTemplate { lines: root_exports })?,
    ));
    Ok(files)
}
