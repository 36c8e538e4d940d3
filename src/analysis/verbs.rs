//! Operation → CRUD verb mapping.

use super::response_shape::ResponseShape;
use crate::casing::split_words;
use crate::config::VerbConfig;
use crate::spec::{HttpMethod, Operation};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    List,
    Get,
    Create,
    Update,
    Patch,
    Delete,
    /// Anything that is not resource CRUD (`evaluate`, `cancel`, ...)
    Action,
}

impl Verb {
    pub const ALL: [Verb; 7] = [
        Verb::List,
        Verb::Get,
        Verb::Create,
        Verb::Update,
        Verb::Patch,
        Verb::Delete,
        Verb::Action,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::List => "list",
            Verb::Get => "get",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
            Verb::Action => "action",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// POST operation-id prefixes that denote a non-create action.
const ACTION_PREFIXES: [&str; 20] = [
    "evaluate", "search", "query", "validate", "check", "verify", "execute", "run", "trigger",
    "calculate", "compute", "send", "process", "start", "stop", "cancel", "approve", "reject",
    "refresh", "import",
];

fn leading_word(operation_id: &str) -> String {
    split_words(operation_id)
        .into_iter()
        .next()
        .unwrap_or_default()
}

/// Map an operation to its verb.
///
/// The HTTP method decides first. A `GET` whose `200` response is a collection (or whose
/// id starts with `list`) is a `list`; a `POST` is refined by its operation-id prefix.
pub fn map_verb(op: &Operation, shape_at_200: &ResponseShape) -> Verb {
    let prefix = leading_word(&op.operation_id);
    match op.method {
        HttpMethod::Get if shape_at_200.is_collection() || prefix == "list" => Verb::List,
        HttpMethod::Get => Verb::Get,
        HttpMethod::Post => match prefix.as_str() {
            "update" | "replace" => Verb::Update,
            "patch" => Verb::Patch,
            "delete" | "remove" => Verb::Delete,
            "list" => Verb::List,
            "get" | "fetch" | "read" => Verb::Get,
            p if ACTION_PREFIXES.contains(&p) => Verb::Action,
            _ => Verb::Create,
        },
        HttpMethod::Put => Verb::Update,
        HttpMethod::Patch => Verb::Patch,
        HttpMethod::Delete => Verb::Delete,
        HttpMethod::Head | HttpMethod::Options | HttpMethod::Trace => Verb::Action,
    }
}

/// Membership of verbs in the create/update/delete capability sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbSets<'a> {
    config: &'a VerbConfig,
}

impl<'a> VerbSets<'a> {
    pub fn new(config: &'a VerbConfig) -> Self {
        VerbSets { config }
    }

    pub fn is_create(&self, verb: Verb) -> bool {
        self.config.create.contains(verb.as_str())
    }

    pub fn is_update(&self, verb: Verb) -> bool {
        self.config.update.contains(verb.as_str())
    }

    pub fn is_delete(&self, verb: Verb) -> bool {
        self.config.delete.contains(verb.as_str())
    }
}
