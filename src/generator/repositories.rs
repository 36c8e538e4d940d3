//! Repository interfaces: `repositories/base.ts` with the eight generic base
//! interfaces and one `<resource>.repository.ts` per synthesized capability.

use super::fs::GeneratedFile;
use super::templates::{render_with_header, BarrelTemplate, RepositoryBaseTemplate, RepositoryTemplate};
use crate::analysis::{DomainModel, RepositoryCapability};

/// Copy of `capability` where type names the domain does not export are
/// dropped, so emitted code never references an undeclared type.
pub fn exported_capability(model: &DomainModel, capability: &RepositoryCapability) -> RepositoryCapability {
    let keep = |name: &Option<String>| name.clone().filter(|n| model.exports_type(n));
    RepositoryCapability {
        resource: capability.resource.clone(),
        kind: capability.kind,
        entity_type: keep(&capability.entity_type),
        create_input: keep(&capability.create_input),
        update_input: keep(&capability.update_input),
        list_params: keep(&capability.list_params),
    }
}

/// Distinct type names a capability refers to, in generic order.
pub fn referenced_types(capability: &RepositoryCapability) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in [
        &capability.entity_type,
        &capability.create_input,
        &capability.update_input,
        &capability.list_params,
    ]
    .into_iter()
    .flatten()
    {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}

pub fn repository_file_stem(capability: &RepositoryCapability) -> String {
    format!("{}.repository", capability.resource)
}

pub fn emit(model: &DomainModel) -> anyhow::Result<Vec<GeneratedFile>> {
    let mut files = vec![GeneratedFile::new(
        "repositories/base.ts",
        render_with_header(&RepositoryBaseTemplate)?,
    )];
    let mut exports = vec!["export * from './base';".to_string()];

    for capability in model.repositories() {
        let capability = exported_capability(model, capability);
        let stem = repository_file_stem(&capability);
        let contents = render_with_header(&RepositoryTemplate {
            resource: capability.resource.clone(),
            interface_name: capability.interface_name(),
            base_interface: capability.kind.interface_name().to_string(),
            base_type: capability.base_type(),
            type_imports: referenced_types(&capability).join(", "),
            entity_unknown: capability.entity_type.is_none(),
        })?;
        files.push(GeneratedFile::new(format!("repositories/{stem}.ts"), contents));
        exports.push(format!("export * from './{stem}';"));
    }

    files.push(GeneratedFile::new(
        "repositories/index.ts",
        render_with_header(&BarrelTemplate { lines: exports })?,
    ));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{RepositoryKind, ResourcePlan};

    fn model() -> DomainModel {
        let mut model = DomainModel::new("widgets");
        model.exported_types = vec!["Widget".into(), "CreateWidgetBody".into()];
        model.resources = vec![
            ResourcePlan {
                name: "widget".into(),
                operations: Vec::new(),
                repository: Some(RepositoryCapability {
                    resource: "widget".into(),
                    kind: RepositoryKind::CreateRead,
                    entity_type: Some("Widget".into()),
                    create_input: Some("CreateWidgetBody".into()),
                    update_input: None,
                    list_params: Some("Missing".into()),
                }),
            },
            ResourcePlan {
                name: "gadget".into(),
                operations: Vec::new(),
                repository: Some(RepositoryCapability {
                    resource: "gadget".into(),
                    kind: RepositoryKind::Read,
                    entity_type: None,
                    create_input: None,
                    update_input: None,
                    list_params: None,
                }),
            },
        ];
        model
    }

    #[test]
    fn test_emits_base_per_resource_and_index() {
        let files = emit(&model()).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.to_string_lossy().to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "repositories/base.ts",
                "repositories/widget.repository.ts",
                "repositories/gadget.repository.ts",
                "repositories/index.ts",
            ]
        );
        let widget = &files[1].contents;
        assert!(widget.contains("import type { CreateReadRepository } from './base';"));
        assert!(widget.contains("import type { Widget, CreateWidgetBody } from '../types';"));
        // undeclared list params fall back to the default record type
        assert!(widget.contains(
            "export interface WidgetRepository extends CreateReadRepository<Widget, CreateWidgetBody, Record<string, unknown>> {}"
        ));
        assert!(!widget.contains("TODO"));

        let gadget = &files[2].contents;
        assert!(gadget.contains("// TODO: entity type of resource 'gadget'"));
        assert!(!gadget.contains("../types"));
        assert!(files[3].contents.contains("export * from './gadget.repository';"));
    }

    #[test]
    fn test_base_declares_all_kinds() {
        let files = emit(&DomainModel::new("empty")).unwrap();
        for kind in RepositoryKind::ALL {
            assert!(
                files[0].contents.contains(&format!("export interface {}<", kind.interface_name())),
                "{kind}"
            );
        }
    }
}
