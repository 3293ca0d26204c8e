//! Diff Engine
//!
//! Aligns two normalized models and produces a classified, ordered list of
//! changes. Operations are matched on placeholder-name-stripped templates,
//! then matched operations are sub-diffed in three passes: parameters,
//! schemas (request body, then responses by status ascending), metadata.
//!
//! Diffing never fails on well-formed models; a malformed model is a
//! contract violation upstream, not a runtime error path here.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::model::{Operation, PrimitiveType, SchemaNode, SpecModel};

/// Compatibility impact of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Breaking,
    Deprecation,
    Compatible,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Breaking => "breaking",
            Severity::Deprecation => "deprecation",
            Severity::Compatible => "compatible",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structural kind of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Added,
    Removed,
    TypeChanged,
    RequirednessChanged,
    Deprecated,
    MetadataChanged,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::TypeChanged => "type-changed",
            ChangeKind::RequirednessChanged => "requiredness-changed",
            ChangeKind::Deprecated => "deprecated",
            ChangeKind::MetadataChanged => "metadata-changed",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected change between two spec versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Location path, e.g. `POST /orders/{id}.requestBody.amount`
    pub location: String,
    pub kind: ChangeKind,
    pub severity: Severity,
    pub message: String,
}

impl ChangeRecord {
    fn new(
        location: impl Into<String>,
        kind: ChangeKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            kind,
            severity,
            message: message.into(),
        }
    }
}

/// True if any record is Breaking.
pub fn has_breaking(changes: &[ChangeRecord]) -> bool {
    changes.iter().any(|c| c.severity == Severity::Breaking)
}

/// Which side of the contract a schema describes. Requiredness flips break
/// in opposite directions on the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Request,
    Response,
}

/// Safe one-directional scalar promotions. The table is symmetric-free:
/// integer -> number widens, number -> integer does not.
const WIDENINGS: &[(PrimitiveType, PrimitiveType)] =
    &[(PrimitiveType::Integer, PrimitiveType::Number)];

fn is_widening(old: PrimitiveType, new: PrimitiveType) -> bool {
    WIDENINGS.contains(&(old, new))
}

/// Compare two normalized models and return the classified change list.
///
/// Output ordering is stable: old-model document order for paths and
/// methods, then new-only paths and methods in new-model order; within a
/// matched operation, parameters, then request body, then responses by
/// status ascending, then metadata.
pub fn diff(old: &SpecModel, new: &SpecModel) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    for old_path in &old.paths {
        let key = old_path.alignment_key();
        match new.path_by_key(&key) {
            None => {
                for op in &old_path.operations {
                    changes.push(operation_removed(&old_path.template, op));
                }
            }
            Some(new_path) => {
                for old_op in &old_path.operations {
                    let location = format!("{} {}", old_op.method, old_path.template);
                    match new_path.operation(old_op.method) {
                        None => changes.push(operation_removed(&old_path.template, old_op)),
                        Some(new_op) => diff_operation(old_op, new_op, &location, &mut changes),
                    }
                }
                for new_op in &new_path.operations {
                    if old_path.operation(new_op.method).is_none() {
                        changes.push(operation_added(&new_path.template, new_op));
                    }
                }
            }
        }
    }

    for new_path in &new.paths {
        if old.path_by_key(&new_path.alignment_key()).is_none() {
            for op in &new_path.operations {
                changes.push(operation_added(&new_path.template, op));
            }
        }
    }

    debug!(changes = changes.len(), "diffed spec models");
    changes
}

fn operation_removed(template: &str, op: &Operation) -> ChangeRecord {
    ChangeRecord::new(
        format!("{} {}", op.method, template),
        ChangeKind::Removed,
        Severity::Breaking,
        "operation removed",
    )
}

fn operation_added(template: &str, op: &Operation) -> ChangeRecord {
    ChangeRecord::new(
        format!("{} {}", op.method, template),
        ChangeKind::Added,
        Severity::Compatible,
        "operation added",
    )
}

fn diff_operation(
    old: &Operation,
    new: &Operation,
    location: &str,
    out: &mut Vec<ChangeRecord>,
) {
    // Pass 1: parameters, aligned by (name, location)
    for old_param in &old.parameters {
        let param_location = format!("{location}.parameters.{}", old_param.name);
        match new.parameter(&old_param.name, old_param.location) {
            None => out.push(ChangeRecord::new(
                param_location,
                ChangeKind::Removed,
                Severity::Breaking,
                format!(
                    "parameter '{}' ({}) removed",
                    old_param.name, old_param.location
                ),
            )),
            Some(new_param) => {
                if !old_param.required && new_param.required {
                    out.push(ChangeRecord::new(
                        param_location.clone(),
                        ChangeKind::RequirednessChanged,
                        Severity::Breaking,
                        format!("parameter '{}' is now required", old_param.name),
                    ));
                } else if old_param.required && !new_param.required {
                    out.push(ChangeRecord::new(
                        param_location.clone(),
                        ChangeKind::RequirednessChanged,
                        Severity::Compatible,
                        format!("parameter '{}' is no longer required", old_param.name),
                    ));
                }
                diff_schema(
                    &old_param.schema,
                    &new_param.schema,
                    &param_location,
                    Direction::Request,
                    out,
                );
            }
        }
    }
    for new_param in &new.parameters {
        if old.parameter(&new_param.name, new_param.location).is_none() {
            let (severity, message) = if new_param.required {
                (
                    Severity::Breaking,
                    format!(
                        "new required parameter '{}' ({})",
                        new_param.name, new_param.location
                    ),
                )
            } else {
                (
                    Severity::Compatible,
                    format!(
                        "new optional parameter '{}' ({})",
                        new_param.name, new_param.location
                    ),
                )
            };
            out.push(ChangeRecord::new(
                format!("{location}.parameters.{}", new_param.name),
                ChangeKind::Added,
                severity,
                message,
            ));
        }
    }

    // Pass 2a: request body
    let body_location = format!("{location}.requestBody");
    match (&old.request_body, &new.request_body) {
        (Some(old_body), Some(new_body)) => {
            diff_schema(old_body, new_body, &body_location, Direction::Request, out);
        }
        (Some(_), None) => out.push(ChangeRecord::new(
            body_location,
            ChangeKind::Removed,
            Severity::Breaking,
            "request body removed",
        )),
        (None, Some(_)) => out.push(ChangeRecord::new(
            body_location,
            ChangeKind::Added,
            Severity::Compatible,
            "request body added",
        )),
        (None, None) => {}
    }

    // Pass 2b: responses, status ascending
    let mut statuses: Vec<&str> = old
        .responses
        .iter()
        .chain(new.responses.iter())
        .map(|(status, _)| status.as_str())
        .collect();
    statuses.sort_unstable();
    statuses.dedup();
    for status in statuses {
        let response_location = format!("{location}.responses.{status}");
        match (old.response(status), new.response(status)) {
            (Some(old_schema), Some(new_schema)) => {
                diff_schema(
                    old_schema,
                    new_schema,
                    &response_location,
                    Direction::Response,
                    out,
                );
            }
            (Some(_), None) => out.push(ChangeRecord::new(
                response_location,
                ChangeKind::Removed,
                Severity::Breaking,
                format!("response {status} removed"),
            )),
            (None, Some(_)) => out.push(ChangeRecord::new(
                response_location,
                ChangeKind::Added,
                Severity::Compatible,
                format!("response {status} added"),
            )),
            (None, None) => {}
        }
    }

    // Pass 3: metadata
    if !old.deprecated && new.deprecated {
        out.push(ChangeRecord::new(
            location,
            ChangeKind::Deprecated,
            Severity::Deprecation,
            "operation marked deprecated",
        ));
    }
    if let (Some(old_id), Some(new_id)) = (&old.operation_id, &new.operation_id) {
        if old_id != new_id {
            out.push(ChangeRecord::new(
                location,
                ChangeKind::MetadataChanged,
                Severity::Compatible,
                format!("operationId changed from '{old_id}' to '{new_id}'"),
            ));
        }
    }
}

/// Recursive field-path diff over two schema trees.
fn diff_schema(
    old: &SchemaNode,
    new: &SchemaNode,
    location: &str,
    direction: Direction,
    out: &mut Vec<ChangeRecord>,
) {
    match (old, new) {
        (
            SchemaNode::Scalar {
                primitive: old_primitive,
                format: old_format,
            },
            SchemaNode::Scalar {
                primitive: new_primitive,
                format: new_format,
            },
        ) => {
            if old_primitive == new_primitive {
                if old_format != new_format {
                    out.push(ChangeRecord::new(
                        location,
                        ChangeKind::TypeChanged,
                        Severity::Breaking,
                        format!(
                            "format changed: {} -> {}",
                            old_format.as_deref().unwrap_or("none"),
                            new_format.as_deref().unwrap_or("none")
                        ),
                    ));
                }
            } else if is_widening(*old_primitive, *new_primitive) {
                out.push(ChangeRecord::new(
                    location,
                    ChangeKind::TypeChanged,
                    Severity::Compatible,
                    format!("type widened: {old_primitive} -> {new_primitive}"),
                ));
            } else {
                out.push(ChangeRecord::new(
                    location,
                    ChangeKind::TypeChanged,
                    Severity::Breaking,
                    format!("type changed: {old_primitive} -> {new_primitive}"),
                ));
            }
        }
        (
            SchemaNode::Object {
                fields: old_fields, ..
            },
            SchemaNode::Object { .. },
        ) => {
            for field in old_fields {
                let field_location = format!("{location}.{}", field.name);
                match new.field(&field.name) {
                    None => out.push(ChangeRecord::new(
                        field_location,
                        ChangeKind::Removed,
                        Severity::Breaking,
                        format!("field '{}' removed", field.name),
                    )),
                    Some(new_schema) => {
                        diff_requiredness(old, new, &field.name, &field_location, direction, out);
                        diff_schema(&field.schema, new_schema, &field_location, direction, out);
                    }
                }
            }
            if let SchemaNode::Object {
                fields: new_fields, ..
            } = new
            {
                for field in new_fields {
                    if old.field(&field.name).is_none() {
                        out.push(ChangeRecord::new(
                            format!("{location}.{}", field.name),
                            ChangeKind::Added,
                            Severity::Compatible,
                            format!("field '{}' added", field.name),
                        ));
                    }
                }
            }
        }
        (SchemaNode::Array { items: old_items }, SchemaNode::Array { items: new_items }) => {
            diff_schema(
                old_items,
                new_items,
                &format!("{location}.items"),
                direction,
                out,
            );
        }
        (old_node, new_node) => out.push(ChangeRecord::new(
            location,
            ChangeKind::TypeChanged,
            Severity::Breaking,
            format!(
                "incompatible kinds: {} -> {}",
                old_node.kind_name(),
                new_node.kind_name()
            ),
        )),
    }
}

/// Requiredness flips are direction-sensitive: optional -> required narrows
/// the request contract, required -> optional narrows the response contract.
fn diff_requiredness(
    old: &SchemaNode,
    new: &SchemaNode,
    name: &str,
    location: &str,
    direction: Direction,
    out: &mut Vec<ChangeRecord>,
) {
    let was_required = old.is_required(name);
    let now_required = new.is_required(name);
    if was_required == now_required {
        return;
    }
    let breaking = match direction {
        Direction::Request => now_required,
        Direction::Response => was_required,
    };
    let message = if now_required {
        format!("field '{name}' is now required")
    } else {
        format!("field '{name}' is no longer required")
    };
    out.push(ChangeRecord::new(
        location,
        ChangeKind::RequirednessChanged,
        if breaking {
            Severity::Breaking
        } else {
            Severity::Compatible
        },
        message,
    ));
}

/// One pair's diff in a multi-spec consistency run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairDiff {
    pub left: String,
    pub right: String,
    pub changes: Vec<ChangeRecord>,
}

impl PairDiff {
    pub fn has_breaking(&self) -> bool {
        has_breaking(&self.changes)
    }
}

/// Diff every unordered pair of specs. Pairs share no mutable state, so
/// they are evaluated across the rayon pool; results keep pair order.
pub fn pairwise(specs: &[(String, SpecModel)]) -> Vec<PairDiff> {
    let mut pairs = Vec::new();
    for i in 0..specs.len() {
        for j in (i + 1)..specs.len() {
            pairs.push((i, j));
        }
    }
    debug!(specs = specs.len(), pairs = pairs.len(), "running pairwise diff");
    pairs
        .par_iter()
        .map(|&(i, j)| PairDiff {
            left: specs[i].0.clone(),
            right: specs[j].0.clone(),
            changes: diff(&specs[i].1, &specs[j].1),
        })
        .collect()
}
