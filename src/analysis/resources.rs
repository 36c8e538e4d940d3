//! Grouping of operations into resources.

use crate::casing::{singularize, split_words, to_kebab_case};
use crate::spec::Operation;
use once_cell::sync::Lazy;
use regex::Regex;

/// Vendor extension that pins an operation to a resource.
pub const RESOURCE_EXTENSION: &str = "x-resource";

/// `v1`, `v2`, ... path prefixes
static VERSION_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v\d+$").expect("version segment regex should be valid"));

/// Operation-id prefixes stripped when deriving a resource from the id alone.
const VERB_PREFIXES: [&str; 16] = [
    "list", "get", "create", "update", "patch", "delete", "remove", "add", "fetch", "search",
    "evaluate", "query", "validate", "check", "verify", "replace",
];

fn is_prefix_segment(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("api") || VERSION_SEGMENT.is_match(&segment.to_ascii_lowercase())
}

/// Resource name (kebab-case, singular) for an operation.
pub fn resource_name(op: &Operation) -> String {
    if let Some(explicit) = op.extension_str(RESOURCE_EXTENSION) {
        let name = to_kebab_case(explicit);
        if !name.is_empty() {
            return name;
        }
    }

    let static_segment = op
        .path
        .split('/')
        .filter(|s| !s.is_empty())
        .filter(|s| !s.starts_with('{'))
        .find(|s| !is_prefix_segment(s));
    if let Some(segment) = static_segment {
        let name = singularize(segment);
        if !name.is_empty() {
            return name;
        }
    }

    let mut words = split_words(&op.operation_id);
    if words.len() > 1 && VERB_PREFIXES.contains(&words[0].as_str()) {
        words.remove(0);
    }
    let name = singularize(&words.join("-"));
    if name.is_empty() {
        "default".to_string()
    } else {
        name
    }
}

/// Group operations by resource, in order of each resource's first appearance.
pub fn group_by_resource(operations: &[Operation]) -> Vec<(String, Vec<&Operation>)> {
    let mut groups: Vec<(String, Vec<&Operation>)> = Vec::new();
    for op in operations {
        let name = resource_name(op);
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, ops)) => ops.push(op),
            None => groups.push((name, vec![op])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_spec_value;
    use serde_json::json;

    fn ops() -> Vec<Operation> {
        parse_spec_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "Resources", "version": "1"},
            "paths": {
                "/api/v1/price-alerts": {"get": {"operationId": "listPriceAlerts", "responses": {}}},
                "/api/v1/price-alerts/{id}": {"get": {"operationId": "getPriceAlert", "responses": {}}},
                "/widgets": {"post": {"operationId": "createWidget", "responses": {}}},
                "/entitlements/evaluate": {"post": {
                    "operationId": "evaluateEntitlement",
                    "x-resource": "Entitlement",
                    "responses": {}
                }},
                "/{id}": {"get": {"operationId": "getCategories", "responses": {}}},
                "/v2/categories": {"get": {"operationId": "listCategories", "responses": {}}}
            }
        }))
        .unwrap()
        .0
        .operations
    }

    #[test]
    fn test_resource_name_rules() {
        let ops = ops();
        let names: Vec<_> = ops.iter().map(resource_name).collect();
        assert_eq!(
            names,
            vec![
                "price-alert",
                "price-alert",
                "widget",
                "entitlement",
                "category",
                "category"
            ]
        );
    }

    #[test]
    fn test_group_by_resource_keeps_first_appearance_order() {
        let ops = ops();
        let groups = group_by_resource(&ops);
        let names: Vec<_> = groups.iter().map(|(n, g)| (n.as_str(), g.len())).collect();
        assert_eq!(
            names,
            vec![("price-alert", 2), ("widget", 1), ("entitlement", 1), ("category", 2)]
        );
    }
}
