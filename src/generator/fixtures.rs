#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::types::{build_catalog, TypeCatalog};
use crate::analysis::{Analyzer, DomainModel};
use crate::config::{ClassificationConfig, VerbConfig};
use crate::spec::{parse_spec_str, SpecDocument};

pub const WIDGETS: &str = r#"
openapi: 3.0.3
info: {title: Widgets, version: '1'}
paths:
  /widgets:
    get:
      operationId: listWidgets
      summary: List widgets
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
                      items: {type: array, items: {$ref: '#/components/schemas/Widget'}}
                      total: {type: integer}
    post:
      operationId: createWidget
      requestBody:
        content:
          application/json:
            schema: {$ref: '#/components/schemas/CreateWidgetRequest'}
      responses:
        '201':
          description: created
          content:
            application/json:
              schema:
                type: object
                properties:
                  data: {$ref: '#/components/schemas/Widget'}
  /widgets/{widgetId}:
    parameters:
      - {name: widgetId, in: path, required: true, schema: {type: string}}
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
    put:
      operationId: updateWidget
      requestBody:
        content:
          application/json:
            schema: {$ref: '#/components/schemas/UpdateWidgetRequest'}
      responses:
        '200':
          description: updated
          content:
            application/json:
              schema:
                type: object
                properties:
                  data: {$ref: '#/components/schemas/Widget'}
    delete:
      operationId: deleteWidget
      responses:
        '204': {description: gone}
  /widgets/{widgetId}/start:
    post:
      operationId: startWidget
      responses:
        '200':
          description: started
          content:
            application/json:
              schema:
                type: object
                properties:
                  data: {$ref: '#/components/schemas/OperationSuccess'}
  /widgets/{widgetId}/process:
    post:
      operationId: processWidget
      responses:
        '202':
          description: queued
          content:
            application/json:
              schema:
                type: object
                properties:
                  data:
                    type: object
                    properties: {taskId: {type: string}}
  /reports/summary:
    get:
      operationId: getReportSummary
      responses:
        '200':
          description: summary
          content:
            application/json:
              schema:
                type: object
                properties:
                  data:
                    type: object
                    properties: {total: {type: integer}}
                  meta: {type: object}
  /reports/export:
    get:
      operationId: exportReport
      responses:
        '200':
          description: export
          content:
            application/json:
              schema:
                type: object
                properties:
                  data:
                    type: object
                    properties: {url: {type: string}}
components:
  schemas:
    Widget:
      type: object
      required: [id, name]
      properties:
        id: {type: string, format: uuid}
        name: {type: string}
        size: {type: integer}
        weight: {type: number}
        active: {type: boolean}
        createdAt: {type: string, format: date-time}
        tags: {type: array, items: {type: string}}
    CreateWidgetRequest:
      type: object
      required: [name]
      properties: {name: {type: string}, size: {type: integer}}
    UpdateWidgetRequest:
      type: object
      properties: {name: {type: string}, size: {type: integer}}
    OperationSuccess:
      type: object
      properties: {success: {type: boolean}}
"#;

/// Run the analysis stages over `yaml` the way the pipeline does.
pub fn analyze(yaml: &str) -> (SpecDocument, DomainModel, TypeCatalog) {
    let (spec, _) = parse_spec_str(yaml, true).unwrap();
    let classification = ClassificationConfig::default();
    let verbs = VerbConfig::default();
    let mut model = DomainModel::new("widgets");
    let catalog = {
        let analyzer = Analyzer::new(&spec, &classification, &verbs);
        let mut warnings = Vec::new();
        model.schemas = analyzer.classify_schemas();
        model.resources = analyzer.plan_resources(&mut warnings);
        let catalog = build_catalog(&spec, &model, &mut warnings);
        model.warnings = warnings;
        catalog
    };
    model.exported_types = catalog.type_names();
    model.validated_types = catalog.validator_names();
    (spec, model, catalog)
}
