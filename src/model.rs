//! Normalized spec model types
//!
//! A [`SpecModel`] is the canonical, reference-resolved representation of one
//! API spec document. It is built once by the normalizer and consumed by the
//! diff and rule engines without mutation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// HTTP method of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
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
    /// Parse a lowercase path-item key (e.g. `"get"`).
    pub fn parse(key: &str) -> Option<Self> {
        match key {
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

    /// Uppercase name used in report locations (e.g. `"GET"`).
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
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a parameter is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    /// Parse the spec document's `in` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scalar type of a schema value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Integer,
    Number,
    Boolean,
}

impl PrimitiveType {
    /// Parse the spec document's `type` value. Unknown names are a parse
    /// error at the caller.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "string" => Some(PrimitiveType::String),
            "integer" => Some(PrimitiveType::Integer),
            "number" => Some(PrimitiveType::Number),
            "boolean" => Some(PrimitiveType::Boolean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named field of an object schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub schema: SchemaNode,
}

/// Any typed value in a schema, after reference resolution.
///
/// Invariant: the tree is acyclic. A reference cycle in the source document
/// is a fatal parse error, so no back-pointers exist here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaNode {
    Scalar {
        primitive: PrimitiveType,
        format: Option<String>,
    },
    Object {
        /// Fields in document order; order is used only for reporting
        /// determinism, never for semantics.
        fields: Vec<FieldDef>,
        required: BTreeSet<String>,
    },
    Array {
        items: Box<SchemaNode>,
    },
}

impl SchemaNode {
    /// An object with no fields; the permissive default for shapeless schemas.
    pub fn empty_object() -> Self {
        SchemaNode::Object {
            fields: Vec::new(),
            required: BTreeSet::new(),
        }
    }

    /// Look up an object field by name. `None` for non-objects.
    pub fn field(&self, name: &str) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Object { fields, .. } => {
                fields.iter().find(|f| f.name == name).map(|f| &f.schema)
            }
            _ => None,
        }
    }

    /// Whether an object field is in the required set. False for non-objects.
    pub fn is_required(&self, name: &str) -> bool {
        match self {
            SchemaNode::Object { required, .. } => required.contains(name),
            _ => false,
        }
    }

    /// Kind label for change messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Scalar { .. } => "scalar",
            SchemaNode::Object { .. } => "object",
            SchemaNode::Array { .. } => "array",
        }
    }
}

/// A single operation parameter. Identity key is (name, location).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: SchemaNode,
}

impl Parameter {
    pub fn identity(&self) -> (&str, ParameterLocation) {
        (&self.name, self.location)
    }
}

/// One method on a path template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub method: HttpMethod,
    pub operation_id: Option<String>,
    pub deprecated: bool,
    /// Unique by (name, location)
    pub parameters: Vec<Parameter>,
    pub request_body: Option<SchemaNode>,
    /// Status code -> response schema, in document order
    pub responses: Vec<(String, SchemaNode)>,
}

impl Operation {
    pub fn parameter(&self, name: &str, location: ParameterLocation) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name == name && p.location == location)
    }

    pub fn response(&self, status: &str) -> Option<&SchemaNode> {
        self.responses
            .iter()
            .find(|(code, _)| code == status)
            .map(|(_, schema)| schema)
    }
}

/// A path template and its operations, unique per method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// Verbatim template, placeholder names retained (e.g. `/orders/{id}`)
    pub template: String,
    pub operations: Vec<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.iter().find(|op| op.method == method)
    }

    /// Template with placeholder names stripped, used for alignment.
    pub fn alignment_key(&self) -> String {
        alignment_key(&self.template)
    }
}

/// Root of one normalized spec document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecModel {
    /// `info.version` if present; absence is a lint concern, not a parse error
    pub version: Option<String>,
    /// Path items in document order, unique by exact template string
    pub paths: Vec<PathItem>,
}

impl SpecModel {
    /// Look up a path item by alignment key (placeholder names stripped).
    pub fn path_by_key(&self, key: &str) -> Option<&PathItem> {
        self.paths.iter().find(|p| p.alignment_key() == key)
    }

    pub fn operation_count(&self) -> usize {
        self.paths.iter().map(|p| p.operations.len()).sum()
    }
}

/// Strip placeholder names from a path template while preserving segment
/// count and literal tokens, so `/orders/{id}` and `/orders/{orderId}` align.
pub fn alignment_key(template: &str) -> String {
    template
        .split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') && segment.len() >= 2 {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
