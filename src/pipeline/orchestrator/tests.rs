#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::error::ErrorKind;
use crate::generator::fixtures::WIDGETS;
use std::fs;
use tempfile::TempDir;

const GADGETS: &str = r#"
openapi: 3.0.3
info: {title: Gadgets, version: '1'}
paths:
  /gadgets/{gadgetId}:
    get:
      operationId: getGadget
      parameters:
        - {name: gadgetId, in: path, required: true, schema: {type: string}}
      responses:
        '200':
          description: one
          content:
            application/json:
              schema:
                type: object
                properties:
                  data: {$ref: '#/components/schemas/Gadget'}
components:
  schemas:
    Gadget:
      type: object
      required: [id]
      properties:
        id: {type: string}
        label: {type: string}
    OperationSuccess:
      type: object
      properties:
        success: {type: boolean}
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(specs: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        for (domain, yaml) in specs {
            let spec_dir = dir.path().join("specs").join(domain);
            fs::create_dir_all(&spec_dir).unwrap();
            fs::write(spec_dir.join("openapi.yaml"), yaml).unwrap();
        }
        Workspace { dir }
    }

    fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            specs_dir: self.dir.path().join("specs"),
            output_dir: self.dir.path().join("out"),
            ..GeneratorConfig::default()
        }
    }

    fn out(&self, rel: &str) -> PathBuf {
        self.dir.path().join("out").join(rel)
    }
}

fn domains(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_full_run_reaches_done() {
    let ws = Workspace::new(&[("widgets", WIDGETS)]);
    let report = Orchestrator::new(ws.config(), RunOptions::new(domains(&["widgets"]))).run();

    assert!(report.success(), "{:?}", report.errors().collect::<Vec<_>>());
    let outcome = report.outcome("widgets").unwrap();
    assert_eq!(outcome.state, DomainState::Reached(Stage::Done));
    for rel in [
        "widgets/index.ts",
        "widgets/types.ts",
        "widgets/schemas.ts",
        "widgets/prisma/schema.prisma",
        "widgets/repositories/base.ts",
        "widgets/repositories/widget.repository.ts",
        "widgets/repositories/index.ts",
        "widgets/handlers/envelope.ts",
        "widgets/handlers/widget/create-widget.handler.ts",
        "widgets/handlers/widget/index.ts",
        "widgets/handlers/index.ts",
        "widgets/converters/widget.converter.ts",
        "widgets/__tests__/factories.ts",
        "widgets/__tests__/repository-mocks.ts",
        "shared/types.ts",
        "index.ts",
    ] {
        assert!(ws.out(rel).is_file(), "missing {rel}");
    }
    assert!(outcome.files_written > 10);
    let shared = fs::read_to_string(ws.out("shared/types.ts")).unwrap();
    assert!(shared.contains("Widget"));
}

#[test]
fn test_missing_spec_fails_only_that_domain() {
    let ws = Workspace::new(&[("widgets", WIDGETS)]);
    let report =
        Orchestrator::new(ws.config(), RunOptions::new(domains(&["absent", "widgets"]))).run();

    assert!(!report.success());
    let absent = report.outcome("absent").unwrap();
    assert_eq!(absent.state, DomainState::Failed { stage: Stage::Loaded });
    let error = absent.error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::SpecError);
    assert_eq!(error.domain, "absent");
    assert!(report.outcome("widgets").unwrap().is_done());

    let index = fs::read_to_string(ws.out("index.ts")).unwrap();
    assert!(index.contains("./widgets"));
    assert!(!index.contains("absent"));
}

#[test]
fn test_fail_fast_skips_remaining_domains() {
    let ws = Workspace::new(&[("widgets", WIDGETS)]);
    let mut config = ws.config();
    config.fail_fast = true;
    let report = Orchestrator::new(config, RunOptions::new(domains(&["absent", "widgets"]))).run();

    assert_eq!(report.outcome("widgets").unwrap().state, DomainState::Skipped);
    assert!(!ws.out("widgets").exists());
    assert_eq!(report.errors().count(), 1);
}

#[test]
fn test_unparsable_spec_is_spec_error() {
    let ws = Workspace::new(&[("broken", "openapi: [unclosed\n")]);
    let report = Orchestrator::new(ws.config(), RunOptions::new(domains(&["broken"]))).run();
    let error = report.outcome("broken").unwrap().error.clone().unwrap();
    assert_eq!(error.stage, Stage::Loaded);
    assert_eq!(error.kind, ErrorKind::SpecError);
}

#[test]
fn test_unwritable_output_is_generation_error() {
    let ws = Workspace::new(&[("widgets", WIDGETS)]);
    fs::create_dir_all(ws.out("")).unwrap();
    fs::write(ws.out("widgets"), "not a directory").unwrap();

    let report = Orchestrator::new(ws.config(), RunOptions::new(domains(&["widgets"]))).run();
    let outcome = report.outcome("widgets").unwrap();
    assert_eq!(
        outcome.state,
        DomainState::Failed {
            stage: Stage::SchemaExtracted
        }
    );
    assert_eq!(outcome.error.as_ref().unwrap().kind, ErrorKind::GenerationError);
}

#[test]
fn test_only_selected_parts_are_written() {
    let ws = Workspace::new(&[("widgets", WIDGETS)]);
    let options = RunOptions {
        parts: vec![OutputPart::Types],
        ..RunOptions::new(domains(&["widgets"]))
    };
    let report = Orchestrator::new(ws.config(), options).run();

    let outcome = report.outcome("widgets").unwrap();
    assert!(outcome.is_done());
    assert!(ws.out("widgets/types.ts").is_file());
    assert!(!ws.out("widgets/schemas.ts").exists());
    assert!(!ws.out("widgets/handlers").exists());
    let index = fs::read_to_string(ws.out("widgets/index.ts")).unwrap();
    assert!(index.contains("export * from './types';"));
    assert!(!index.contains("handlers"));
}

#[test]
fn test_clean_removes_stale_files() {
    let ws = Workspace::new(&[("widgets", WIDGETS)]);
    fs::create_dir_all(ws.out("widgets")).unwrap();
    fs::write(ws.out("widgets/stale.ts"), "old").unwrap();

    let options = RunOptions {
        clean: true,
        ..RunOptions::new(domains(&["widgets"]))
    };
    let report = Orchestrator::new(ws.config(), options).run();
    assert!(report.success());
    assert!(!ws.out("widgets/stale.ts").exists());
}

#[test]
fn test_domain_name_must_be_a_single_directory() {
    for name in ["widgets", "user-accounts", "billing_v2"] {
        assert!(check_domain_name(name).is_ok(), "{name}");
    }
    for name in ["", ".", "..", "../specs", "a/b", "a\\b", "/tmp", ".bundled", "widgets/"] {
        let err = check_domain_name(name).unwrap_err();
        assert_eq!(error_kind_of(&err), ErrorKind::SpecError, "{name:?}");
    }
}

#[test]
fn test_clean_never_escapes_the_output_root() {
    let ws = Workspace::new(&[("widgets", WIDGETS)]);
    let first = Orchestrator::new(ws.config(), RunOptions::new(domains(&["widgets"]))).run();
    assert!(first.success());

    let options = RunOptions {
        clean: true,
        ..RunOptions::new(domains(&["..", ".", "../specs"]))
    };
    let report = Orchestrator::new(ws.config(), options).run();

    assert!(!report.success());
    for name in ["..", ".", "../specs"] {
        let outcome = report.outcome(name).unwrap();
        assert_eq!(outcome.state, DomainState::Failed { stage: Stage::Loaded });
        assert_eq!(outcome.error.as_ref().unwrap().kind, ErrorKind::SpecError);
    }
    assert!(ws.dir.path().join("specs/widgets/openapi.yaml").is_file());
    assert!(ws.out("widgets/index.ts").is_file());
}

#[test]
fn test_clean_waits_for_a_spec() {
    let ws = Workspace::new(&[("widgets", WIDGETS)]);
    fs::create_dir_all(ws.out("typo")).unwrap();
    fs::write(ws.out("typo/keep.ts"), "kept").unwrap();

    let options = RunOptions {
        clean: true,
        ..RunOptions::new(domains(&["typo"]))
    };
    let report = Orchestrator::new(ws.config(), options).run();
    assert!(!report.success());
    assert!(ws.out("typo/keep.ts").is_file());
}

#[test]
fn test_warnings_are_attributed_to_domain_and_stage() {
    let ws = Workspace::new(&[("widgets", WIDGETS)]);
    let mut config = ws.config();
    config.parallel = true;
    let report = Orchestrator::new(config, RunOptions::new(domains(&["widgets"]))).run();

    assert_eq!(report.run_warnings.len(), 1);
    for warning in report.warnings() {
        assert_eq!(warning.domain, "widgets");
        assert!(warning.stage <= Stage::SchemaExtracted);
    }
}

#[test]
fn test_shared_type_collision_uses_priority() {
    let ws = Workspace::new(&[("widgets", WIDGETS), ("gadgets", GADGETS)]);
    let mut config = ws.config();
    config.shared_types.owner_priority = vec!["widgets".to_string()];
    let report =
        Orchestrator::new(config, RunOptions::new(domains(&["gadgets", "widgets"]))).run();

    assert!(report.success());
    let post = report.post_process.as_ref().unwrap();
    assert!(post
        .collisions
        .iter()
        .any(|(name, owner, _)| name == "OperationSuccess" && owner == "widgets"));
    let shared = fs::read_to_string(ws.out("shared/types.ts")).unwrap();
    assert!(shared.contains("export type { Gadget } from '../gadgets/types';"));
}

#[test]
fn test_inspect_writes_nothing() {
    let ws = Workspace::new(&[("widgets", WIDGETS)]);
    let orchestrator = Orchestrator::new(ws.config(), RunOptions::new(domains(&["widgets"])));
    let (model, _warnings) = orchestrator.inspect("widgets").unwrap();
    assert_eq!(model.repositories().count(), 1);
    assert!(!ws.out("").exists());
}
