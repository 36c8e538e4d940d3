//! Repository capability synthesis per resource.

use super::classifier::{EntityClassification, SchemaClassifier};
use super::model::OperationPlan;
use super::verbs::{Verb, VerbSets};
use crate::casing::to_pascal_case;
use crate::error::Warning;
use std::fmt;

/// The eight repository base interfaces, one per subset of {create, update, delete}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryKind {
    Read,
    CreateRead,
    UpdateRead,
    DeleteRead,
    CreateUpdateRead,
    CreateDeleteRead,
    UpdateDeleteRead,
    Crud,
}

impl RepositoryKind {
    pub const ALL: [RepositoryKind; 8] = [
        RepositoryKind::Read,
        RepositoryKind::CreateRead,
        RepositoryKind::UpdateRead,
        RepositoryKind::DeleteRead,
        RepositoryKind::CreateUpdateRead,
        RepositoryKind::CreateDeleteRead,
        RepositoryKind::UpdateDeleteRead,
        RepositoryKind::Crud,
    ];

    /// Fixed lookup from the capability triple.
    pub fn from_capabilities(create: bool, update: bool, delete: bool) -> Self {
        match (create, update, delete) {
            (false, false, false) => RepositoryKind::Read,
            (true, false, false) => RepositoryKind::CreateRead,
            (false, true, false) => RepositoryKind::UpdateRead,
            (false, false, true) => RepositoryKind::DeleteRead,
            (true, true, false) => RepositoryKind::CreateUpdateRead,
            (true, false, true) => RepositoryKind::CreateDeleteRead,
            (false, true, true) => RepositoryKind::UpdateDeleteRead,
            (true, true, true) => RepositoryKind::Crud,
        }
    }

    pub fn has_create(&self) -> bool {
        matches!(
            self,
            RepositoryKind::CreateRead
                | RepositoryKind::CreateUpdateRead
                | RepositoryKind::CreateDeleteRead
                | RepositoryKind::Crud
        )
    }

    pub fn has_update(&self) -> bool {
        matches!(
            self,
            RepositoryKind::UpdateRead
                | RepositoryKind::CreateUpdateRead
                | RepositoryKind::UpdateDeleteRead
                | RepositoryKind::Crud
        )
    }

    pub fn has_delete(&self) -> bool {
        matches!(
            self,
            RepositoryKind::DeleteRead
                | RepositoryKind::CreateDeleteRead
                | RepositoryKind::UpdateDeleteRead
                | RepositoryKind::Crud
        )
    }

    /// Name of the generated base interface.
    pub fn interface_name(&self) -> &'static str {
        match self {
            RepositoryKind::Read => "ReadRepository",
            RepositoryKind::CreateRead => "CreateReadRepository",
            RepositoryKind::UpdateRead => "UpdateReadRepository",
            RepositoryKind::DeleteRead => "DeleteReadRepository",
            RepositoryKind::CreateUpdateRead => "CreateUpdateReadRepository",
            RepositoryKind::CreateDeleteRead => "CreateDeleteReadRepository",
            RepositoryKind::UpdateDeleteRead => "UpdateDeleteReadRepository",
            RepositoryKind::Crud => "CrudRepository",
        }
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interface_name())
    }
}

/// Repository shape of one resource plus the concrete types filling its generics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCapability {
    /// Kebab-case resource name
    pub resource: String,
    pub kind: RepositoryKind,
    /// `None` when no entity could be determined
    pub entity_type: Option<String>,
    pub create_input: Option<String>,
    pub update_input: Option<String>,
    pub list_params: Option<String>,
}

impl RepositoryCapability {
    /// `WidgetRepository`
    pub fn interface_name(&self) -> String {
        format!("{}Repository", to_pascal_case(&self.resource))
    }

    /// Entity type as written in generated code.
    pub fn entity_ts(&self) -> String {
        self.entity_type
            .clone()
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Generic arguments of the base interface, in declaration order.
    pub fn generic_args(&self) -> Vec<String> {
        let entity = self.entity_ts();
        let fallback_input = match &self.entity_type {
            Some(e) => format!("Partial<{e}>"),
            None => "unknown".to_string(),
        };
        let mut args = vec![entity];
        if self.kind.has_create() {
            args.push(
                self.create_input
                    .clone()
                    .unwrap_or_else(|| fallback_input.clone()),
            );
        }
        if self.kind.has_update() {
            args.push(self.update_input.clone().unwrap_or(fallback_input));
        }
        args.push(
            self.list_params
                .clone()
                .unwrap_or_else(|| "Record<string, unknown>".to_string()),
        );
        args
    }

    /// `CreateReadRepository<Widget, CreateWidgetRequest, ListWidgetsParams>`
    pub fn base_type(&self) -> String {
        format!("{}<{}>", self.kind.interface_name(), self.generic_args().join(", "))
    }
}

/// Whether a resource's operations call for a repository at all.
pub fn requires_repository(ops: &[OperationPlan], sets: &VerbSets<'_>) -> bool {
    ops.iter().any(|op| {
        sets.is_create(op.verb)
            || sets.is_update(op.verb)
            || sets.is_delete(op.verb)
            || op.classification == Some(EntityClassification::Entity)
            || op.needs_data_access
    })
}

fn first_entity<'o>(ops: &'o [OperationPlan], verb: Verb) -> Option<&'o str> {
    ops.iter()
        .filter(|op| op.verb == verb)
        .find_map(|op| op.shape.entity())
}

/// Among candidate operations, prefer the one whose response entity is `canonical`.
fn pick_input<'o>(
    candidates: &[&'o OperationPlan],
    canonical: Option<&str>,
) -> Option<&'o OperationPlan> {
    let matching = canonical.and_then(|c| {
        candidates
            .iter()
            .copied()
            .find(|op| op.shape.entity() == Some(c) && op.request_type.is_some())
    });
    matching.or_else(|| {
        candidates
            .iter()
            .copied()
            .find(|op| op.request_type.is_some())
    })
}

/// Synthesize the repository capability of `resource` from its planned operations.
pub fn synthesize(
    resource: &str,
    ops: &[OperationPlan],
    sets: &VerbSets<'_>,
    classifier: &SchemaClassifier<'_>,
    warnings: &mut Vec<Warning>,
) -> RepositoryCapability {
    let has_create = ops.iter().any(|op| sets.is_create(op.verb));
    let has_update = ops.iter().any(|op| sets.is_update(op.verb));
    let has_delete = ops.iter().any(|op| sets.is_delete(op.verb));
    let kind = RepositoryKind::from_capabilities(has_create, has_update, has_delete);

    let get_entity = first_entity(ops, Verb::Get);
    let list_entity = first_entity(ops, Verb::List);
    if let (Some(get), Some(list)) = (get_entity, list_entity) {
        if get != list {
            warnings.push(Warning::mismatch(
                format!("resource:{resource}"),
                format!(
                    "get operations return '{get}' but list operations return '{list}'; using '{get}'"
                ),
            ));
        }
    }

    let create_ops: Vec<&OperationPlan> = ops.iter().filter(|op| sets.is_create(op.verb)).collect();
    let update_ops: Vec<&OperationPlan> = ops.iter().filter(|op| sets.is_update(op.verb)).collect();

    let pascal = to_pascal_case(resource);
    let canonical = get_entity
        .or(list_entity)
        .map(String::from)
        .or_else(|| {
            create_ops
                .iter()
                .find_map(|op| op.shape.entity())
                .map(String::from)
        })
        .or_else(|| {
            (classifier.classify_named(&pascal) == Some(EntityClassification::Entity))
                .then(|| pascal.clone())
        });

    let create_input = pick_input(&create_ops, canonical.as_deref()).and_then(|op| op.request_type.clone());
    let update_input = pick_input(&update_ops, canonical.as_deref()).and_then(|op| op.request_type.clone());
    let list_params = ops
        .iter()
        .filter(|op| op.verb == Verb::List)
        .find_map(|op| op.params_type.clone());

    RepositoryCapability {
        resource: resource.to_string(),
        kind,
        entity_type: canonical,
        create_input,
        update_input,
        list_params,
    }
}

#[cfg(test)]
mod tests;
