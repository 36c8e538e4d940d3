use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// HTTP methods an OpenAPI path item may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Parse a path-item key (`get`, `post`, ...). Case-insensitive.
    pub fn parse(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "put" => Some(HttpMethod::Put),
            "post" => Some(HttpMethod::Post),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "patch" => Some(HttpMethod::Patch),
            "trace" => Some(HttpMethod::Trace),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `additionalProperties` is either a flag or a schema for the extra values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Flag(bool),
    Schema(Box<SchemaDefinition>),
}

/// A JSON Schema node as used by OpenAPI 3.x components and media types.
///
/// Only the structure the generator reasons about is modelled; other keywords are
/// ignored on load. `properties` keeps declaration order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SchemaDefinition {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// `type`, normalised to a list (OpenAPI 3.1 allows `[string, "null"]`)
    #[serde(rename = "type", deserialize_with = "de_type_names")]
    pub types: Vec<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
    #[serde(deserialize_with = "de_properties")]
    pub properties: Vec<(String, SchemaDefinition)>,
    #[serde(deserialize_with = "de_required")]
    pub required: Vec<String>,
    #[serde(rename = "enum")]
    pub enum_values: Vec<Value>,
    pub items: Option<Box<SchemaDefinition>>,
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(rename = "allOf")]
    pub all_of: Vec<SchemaDefinition>,
    #[serde(rename = "oneOf")]
    pub one_of: Vec<SchemaDefinition>,
    #[serde(rename = "anyOf")]
    pub any_of: Vec<SchemaDefinition>,
    pub nullable: bool,
    #[serde(rename = "minLength")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength")]
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub pattern: Option<String>,
    pub example: Option<Value>,
    #[serde(rename = "default")]
    pub default_value: Option<Value>,
}

fn de_type_names<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match Option::<OneOrMany>::deserialize(d)? {
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
        None => Vec::new(),
    })
}

fn de_properties<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Vec<(String, SchemaDefinition)>, D::Error> {
    let map = Option::<Map<String, Value>>::deserialize(d)?.unwrap_or_default();
    map.into_iter()
        .map(|(name, value)| {
            SchemaDefinition::deserialize(value)
                .map(|schema| (name.clone(), schema))
                .map_err(|e| D::Error::custom(format!("property '{name}': {e}")))
        })
        .collect()
}

// Some specs write `required: true` on a property; treat anything but a list as empty.
fn de_required<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    })
}

impl SchemaDefinition {
    /// The first declared type that is not `null`.
    pub fn primary_type(&self) -> Option<&str> {
        self.types
            .iter()
            .map(String::as_str)
            .find(|t| *t != "null")
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
            || self.types.iter().any(|t| t == "null")
            || self
                .one_of
                .iter()
                .chain(self.any_of.iter())
                .any(|s| s.types.len() == 1 && s.types[0] == "null")
    }

    pub fn is_ref(&self) -> bool {
        self.reference.is_some()
    }

    pub fn is_array(&self) -> bool {
        self.primary_type() == Some("array")
    }

    /// Declared `type: object`, or untyped with properties.
    pub fn is_object(&self) -> bool {
        self.primary_type() == Some("object")
            || (self.types.is_empty() && !self.properties.is_empty())
    }

    pub fn property(&self, name: &str) -> Option<&SchemaDefinition> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// `type: object` with no properties and no open-ended extra values.
    pub fn is_closed_empty_object(&self) -> bool {
        self.primary_type() == Some("object")
            && self.properties.is_empty()
            && self.all_of.is_empty()
            && self.one_of.is_empty()
            && self.any_of.is_empty()
            && matches!(
                self.additional_properties,
                None | Some(AdditionalProperties::Flag(false))
            )
    }

    pub fn is_string_enum(&self) -> bool {
        !self.enum_values.is_empty() && self.enum_values.iter().all(Value::is_string)
    }
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Cookie => write!(f, "cookie"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub schema: Option<SchemaDefinition>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<SchemaDefinition>,
}

fn is_json_media_type(media_type: &str) -> bool {
    let mt = media_type.to_ascii_lowercase();
    mt.starts_with("application/json") || (mt.starts_with("application/") && mt.ends_with("+json"))
}

fn json_content(content: &BTreeMap<String, MediaType>) -> Option<&MediaType> {
    content
        .get("application/json")
        .or_else(|| {
            content
                .iter()
                .find(|(mt, _)| is_json_media_type(mt))
                .map(|(_, m)| m)
        })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

impl RequestBody {
    pub fn json_schema(&self) -> Option<&SchemaDefinition> {
        json_content(&self.content)?.schema.as_ref()
    }
}

/// One entry of an operation's `responses` map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseSpec {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

impl ResponseSpec {
    pub fn has_json_content(&self) -> bool {
        json_content(&self.content).is_some()
    }

    pub fn json_schema(&self) -> Option<&SchemaDefinition> {
        json_content(&self.content)?.schema.as_ref()
    }
}

/// Either an inline object or a `$ref` to a component.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ObjectOrReference<T> {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Object(T),
}

/// A single (path, method) pair after normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub path: String,
    pub method: HttpMethod,
    /// Unique within the domain (synthesised or suffixed on load when needed)
    pub operation_id: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    /// Path-level parameters merged with operation-level ones, refs resolved
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    /// Status code (`"200"`, `"default"`, ...) to response, refs resolved
    pub responses: BTreeMap<String, ResponseSpec>,
    /// `x-*` vendor extensions
    pub extensions: BTreeMap<String, Value>,
}

impl Operation {
    pub fn response(&self, status: &str) -> Option<&ResponseSpec> {
        self.responses.get(status)
    }

    pub fn request_schema(&self) -> Option<&SchemaDefinition> {
        self.request_body.as_ref()?.json_schema()
    }

    pub fn extension_str(&self, key: &str) -> Option<&str> {
        self.extensions.get(key).and_then(Value::as_str)
    }

    pub fn query_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Query)
    }

    pub fn path_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Path)
    }

    /// Declared 2xx status codes in ascending order.
    pub fn success_statuses(&self) -> Vec<&str> {
        self.responses
            .keys()
            .map(String::as_str)
            .filter(|s| s.len() == 3 && s.starts_with('2') && s.chars().all(|c| c.is_ascii_digit()))
            .collect()
    }
}

/// Named component schemas in declaration order with O(1) lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedSchemas {
    entries: Vec<(String, SchemaDefinition)>,
    index: HashMap<String, usize>,
}

impl NamedSchemas {
    pub fn new(entries: Vec<(String, SchemaDefinition)>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        NamedSchemas { entries, index }
    }

    pub fn get(&self, name: &str) -> Option<&SchemaDefinition> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaDefinition)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `components` after load: refs between components already resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    pub schemas: NamedSchemas,
    pub responses: BTreeMap<String, ResponseSpec>,
    pub request_bodies: BTreeMap<String, RequestBody>,
    pub parameters: BTreeMap<String, Parameter>,
}

/// A parsed, reference-bundled OpenAPI document. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecDocument {
    pub title: String,
    pub version: String,
    /// Operations in document order
    pub operations: Vec<Operation>,
    pub components: Components,
}

impl SpecDocument {
    pub fn schema(&self, name: &str) -> Option<&SchemaDefinition> {
        self.components.schemas.get(name)
    }

    pub fn operation(&self, operation_id: &str) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|op| op.operation_id == operation_id)
    }
}
