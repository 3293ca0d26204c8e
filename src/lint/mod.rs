//! Rule Engine
//!
//! Evaluates a declarative rule set against one normalized model. A rule
//! pairs a selector (which locations to visit) with a check and a fixed
//! severity; the engine visits every selected location exactly once, never
//! short-circuits, and reports violations sorted by (location, rule id) so
//! output is deterministic regardless of internal evaluation order.

mod ruleset;

pub use ruleset::{Check, Rule, RuleCategory, RuleSet, RuleSeverity, Selector};

use serde::{Deserialize, Serialize};

use crate::model::{SchemaNode, SpecModel};

/// A design-rule violation at one model location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule_id: String,
    pub location: String,
    pub severity: RuleSeverity,
    pub category: RuleCategory,
    pub message: String,
}

/// True if any violation has Error severity.
pub fn has_errors(violations: &[RuleViolation]) -> bool {
    violations.iter().any(|v| v.severity == RuleSeverity::Error)
}

/// Evaluate every rule in the set against the model.
pub fn lint(model: &SpecModel, rules: &RuleSet) -> Vec<RuleViolation> {
    let mut violations = Vec::new();
    for rule in &rules.rules {
        apply_rule(model, rule, &mut violations);
    }
    violations.sort_by(|a, b| {
        a.location
            .cmp(&b.location)
            .then_with(|| a.rule_id.cmp(&b.rule_id))
    });
    violations
}

fn violation(rule: &Rule, location: &str, subject: &str) -> RuleViolation {
    RuleViolation {
        rule_id: rule.id.clone(),
        location: location.to_string(),
        severity: rule.severity,
        category: rule.category,
        message: rule.render_message(subject),
    }
}

fn apply_rule(model: &SpecModel, rule: &Rule, out: &mut Vec<RuleViolation>) {
    match rule.selector {
        Selector::PathTemplates => {
            for path in &model.paths {
                for segment in literal_segments(&path.template) {
                    if !rule.check.passes(segment) {
                        out.push(violation(rule, &path.template, segment));
                    }
                }
            }
        }
        Selector::FieldNames => {
            for path in &model.paths {
                for op in &path.operations {
                    let base = format!("{} {}", op.method, path.template);
                    for param in &op.parameters {
                        visit_fields(
                            &param.schema,
                            &format!("{base}.parameters.{}", param.name),
                            rule,
                            out,
                        );
                    }
                    if let Some(body) = &op.request_body {
                        visit_fields(body, &format!("{base}.requestBody"), rule, out);
                    }
                    for (status, schema) in &op.responses {
                        visit_fields(schema, &format!("{base}.responses.{status}"), rule, out);
                    }
                }
            }
        }
        Selector::Operations => {
            for path in &model.paths {
                for op in &path.operations {
                    let subject = op.operation_id.as_deref().unwrap_or("");
                    if !rule.check.passes(subject) {
                        out.push(violation(
                            rule,
                            &format!("{} {}", op.method, path.template),
                            subject,
                        ));
                    }
                }
            }
        }
        Selector::Document => {
            let subject = model.version.as_deref().unwrap_or("");
            if !rule.check.passes(subject) {
                out.push(violation(rule, "info.version", subject));
            }
        }
    }
}

/// Literal path segments; placeholders are skipped (their names are not
/// subject to naming rules).
fn literal_segments(template: &str) -> impl Iterator<Item = &str> {
    template
        .split('/')
        .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
}

fn visit_fields(node: &SchemaNode, location: &str, rule: &Rule, out: &mut Vec<RuleViolation>) {
    match node {
        SchemaNode::Object { fields, .. } => {
            for field in fields {
                let field_location = format!("{location}.{}", field.name);
                if !rule.check.passes(&field.name) {
                    out.push(violation(rule, &field_location, &field.name));
                }
                visit_fields(&field.schema, &field_location, rule, out);
            }
        }
        SchemaNode::Array { items } => {
            visit_fields(items, &format!("{location}.items"), rule, out);
        }
        SchemaNode::Scalar { .. } => {}
    }
}
