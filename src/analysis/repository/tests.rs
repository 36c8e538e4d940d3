#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::analysis::model::{Analyzer, ResourcePlan};
use crate::config::{ClassificationConfig, VerbConfig};
use crate::error::WarningKind;
use crate::spec::parse_spec_str;
use std::collections::HashSet;

#[test]
fn test_capability_table_is_exhaustive_and_one_to_one() {
    let mut seen = HashSet::new();
    for create in [false, true] {
        for update in [false, true] {
            for delete in [false, true] {
                let kind = RepositoryKind::from_capabilities(create, update, delete);
                assert_eq!(kind.has_create(), create, "{kind}");
                assert_eq!(kind.has_update(), update, "{kind}");
                assert_eq!(kind.has_delete(), delete, "{kind}");
                assert_eq!(kind == RepositoryKind::Crud, create && update && delete);
                assert_eq!(kind == RepositoryKind::Read, !create && !update && !delete);
                seen.insert(kind);
            }
        }
    }
    assert_eq!(seen.len(), RepositoryKind::ALL.len());
}

#[test]
fn test_interface_names() {
    assert_eq!(
        RepositoryKind::from_capabilities(false, true, true).interface_name(),
        "UpdateDeleteReadRepository"
    );
    assert_eq!(
        RepositoryKind::from_capabilities(true, false, true).to_string(),
        "CreateDeleteReadRepository"
    );
}

fn plan(yaml: &str, verbs: &VerbConfig) -> (Vec<ResourcePlan>, Vec<Warning>) {
    let (spec, _) = parse_spec_str(yaml, true).unwrap();
    let classification = ClassificationConfig::default();
    let analyzer = Analyzer::new(&spec, &classification, verbs);
    let mut warnings = Vec::new();
    let resources = analyzer.plan_resources(&mut warnings);
    (resources, warnings)
}

const SCHEDULES: &str = r#"
openapi: 3.0.3
info: {title: Schedules, version: '1'}
paths:
  /schedules:
    get:
      operationId: listSchedules
      parameters:
        - {name: page, in: query, schema: {type: integer}}
      responses:
        '200':
          description: page
          content:
            application/json:
              schema:
                type: object
                properties:
                  data:
                    type: object
                    properties:
                      items: {type: array, items: {$ref: '#/components/schemas/Job'}}
  /schedules/{id}:
    get:
      operationId: getSchedule
      responses:
        '200':
          description: one
          content:
            application/json:
              schema:
                type: object
                properties:
                  data: {$ref: '#/components/schemas/Schedule'}
    patch:
      operationId: patchSchedule
      requestBody:
        content:
          application/json:
            schema: {$ref: '#/components/schemas/PatchScheduleRequest'}
      responses:
        '200':
          description: one
          content:
            application/json:
              schema:
                type: object
                properties:
                  data: {$ref: '#/components/schemas/Schedule'}
    delete:
      operationId: deleteSchedule
      responses:
        '204': {description: gone}
components:
  schemas:
    Schedule:
      type: object
      properties: {id: {type: string}, cron: {type: string}}
    Job:
      type: object
      properties: {id: {type: string}}
    PatchScheduleRequest:
      type: object
      properties: {cron: {type: string}}
"#;

#[test]
fn test_get_list_mismatch_warns_and_get_wins() {
    let (resources, warnings) = plan(SCHEDULES, &VerbConfig::default());
    assert_eq!(resources.len(), 1);
    let repo = resources[0].repository.as_ref().unwrap();
    assert_eq!(repo.entity_type.as_deref(), Some("Schedule"));
    assert_eq!(repo.list_params.as_deref(), Some("ListSchedulesParams"));
    let mismatches: Vec<_> = warnings
        .iter()
        .filter(|w| w.kind == WarningKind::SchemaMismatch)
        .collect();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].location, "resource:schedule");
}

#[test]
fn test_patch_counts_as_update_only_when_aliased() {
    let (resources, _) = plan(SCHEDULES, &VerbConfig::default());
    let repo = resources[0].repository.as_ref().unwrap();
    assert_eq!(repo.kind, RepositoryKind::DeleteRead);
    assert_eq!(repo.update_input, None);

    let mut aliased = VerbConfig::default();
    aliased.update.insert("patch".to_string());
    let (resources, _) = plan(SCHEDULES, &aliased);
    let repo = resources[0].repository.as_ref().unwrap();
    assert_eq!(repo.kind, RepositoryKind::UpdateDeleteRead);
    assert_eq!(repo.update_input.as_deref(), Some("PatchScheduleRequest"));
    assert_eq!(
        repo.base_type(),
        "UpdateDeleteReadRepository<Schedule, PatchScheduleRequest, ListSchedulesParams>"
    );
}

const WIDGETS: &str = r#"
openapi: 3.0.3
info: {title: Widgets, version: '1'}
paths:
  /widgets:
    post:
      operationId: createWidgetDraft
      requestBody:
        content:
          application/json:
            schema: {$ref: '#/components/schemas/CreateDraftRequest'}
      responses:
        '201':
          description: draft
          content:
            application/json:
              schema:
                type: object
                properties:
                  data: {$ref: '#/components/schemas/WidgetDraft'}
  /widgets/{id}:
    get:
      operationId: getWidget
      responses:
        '200':
          description: one
          content:
            application/json:
              schema:
                type: object
                properties:
                  data: {$ref: '#/components/schemas/Widget'}
  /widgets/v2:
    post:
      operationId: createWidget
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties: {name: {type: string}}
      responses:
        '201':
          description: created
          content:
            application/json:
              schema:
                type: object
                properties:
                  data: {$ref: '#/components/schemas/Widget'}
components:
  schemas:
    Widget:
      type: object
      properties: {id: {type: string}, name: {type: string}}
    WidgetDraft:
      type: object
      properties: {id: {type: string}}
    CreateDraftRequest:
      type: object
      properties: {name: {type: string}}
"#;

#[test]
fn test_create_input_prefers_canonical_entity() {
    let (resources, warnings) = plan(WIDGETS, &VerbConfig::default());
    let repo = resources[0].repository.as_ref().unwrap();
    assert_eq!(repo.kind, RepositoryKind::CreateRead);
    assert_eq!(repo.entity_type.as_deref(), Some("Widget"));
    // inline body of the operation returning the canonical entity
    assert_eq!(repo.create_input.as_deref(), Some("CreateWidgetBody"));
    assert!(warnings.is_empty());
    assert_eq!(
        repo.base_type(),
        "CreateReadRepository<Widget, CreateWidgetBody, Record<string, unknown>>"
    );
}

#[test]
fn test_action_only_dto_resource_has_no_repository() {
    let yaml = r#"
openapi: 3.0.3
info: {title: Quotas, version: '1'}
paths:
  /quotas/remaining:
    get:
      operationId: getRemainingQuota
      responses:
        '200':
          description: quota
          content:
            application/json:
              schema:
                type: object
                properties:
                  data: {$ref: '#/components/schemas/QuotaStatus'}
components:
  schemas:
    QuotaStatus:
      type: object
      properties: {remaining: {type: integer}, metricKey: {type: string}}
"#;
    let (resources, _) = plan(yaml, &VerbConfig::default());
    assert!(resources[0].repository.is_none());
    assert!(!resources[0].operations[0].uses_repository);
}
