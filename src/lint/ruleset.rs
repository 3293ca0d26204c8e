//! Rules as data
//!
//! A rule set is a first-class immutable value: each rule pairs a selector
//! with a check, a fixed severity, a category, and a message template.
//! Custom rule sets load from a JSON document validated against an embedded
//! meta-schema before any rule is compiled, so a malformed set fails with
//! `RuleConfig` before evaluation starts. There is no global rule registry;
//! the set is passed explicitly into the engine.

use jsonschema::JSONSchema;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{Result, SpecError};

/// Meta-schema every custom rule set must satisfy
const META_SCHEMA: &str = include_str!("ruleset.schema.json");

/// Severity of a rule, fixed per rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Error,
    Warning,
}

impl RuleSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSeverity::Error => "error",
            RuleSeverity::Warning => "warning",
        }
    }
}

/// Category a rule belongs to, used for the score breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Naming,
    Metadata,
    Structure,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Naming => "naming",
            RuleCategory::Metadata => "metadata",
            RuleCategory::Structure => "structure",
        }
    }
}

/// Which model locations a rule visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Selector {
    /// Each literal segment of each path template
    PathTemplates,
    /// Every object field name reachable from any operation schema
    FieldNames,
    /// Every operation's operationId
    Operations,
    /// The document root (`info.version`)
    Document,
}

/// The predicate applied to each selected subject
#[derive(Debug, Clone)]
pub enum Check {
    /// Subject must match the pattern
    Pattern(Regex),
    /// Subject must be one of the listed values
    MemberOf(BTreeSet<String>),
    /// Subject must be present and non-empty
    NonEmpty,
}

impl Check {
    pub fn passes(&self, subject: &str) -> bool {
        match self {
            Check::Pattern(pattern) => pattern.is_match(subject),
            Check::MemberOf(values) => values.contains(subject),
            Check::NonEmpty => !subject.is_empty(),
        }
    }
}

/// One declarative design rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub selector: Selector,
    pub check: Check,
    pub severity: RuleSeverity,
    pub category: RuleCategory,
    /// Message template; `{value}` is replaced with the offending subject
    pub message: String,
}

impl Rule {
    pub fn render_message(&self, subject: &str) -> String {
        self.message.replace("{value}", subject)
    }
}

/// An immutable collection of rules, loaded once per invocation
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

/// Serde-facing rule shape, compiled into [`Rule`] after validation
#[derive(Debug, Deserialize)]
struct RuleSpec {
    id: String,
    selector: Selector,
    check: CheckSpec,
    severity: RuleSeverity,
    category: RuleCategory,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CheckSpec {
    Pattern(String),
    MemberOf(Vec<String>),
    NonEmpty,
}

#[derive(Debug, Deserialize)]
struct RuleSetSpec {
    rules: Vec<RuleSpec>,
}

impl RuleSet {
    /// The built-in design rules.
    pub fn builtin() -> Self {
        let rules = vec![
            Rule {
                id: "path-kebab-case".to_string(),
                selector: Selector::PathTemplates,
                check: Check::Pattern(Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap()),
                severity: RuleSeverity::Warning,
                category: RuleCategory::Naming,
                message: "path segment '{value}' should be kebab-case".to_string(),
            },
            Rule {
                id: "field-snake-case".to_string(),
                selector: Selector::FieldNames,
                check: Check::Pattern(Regex::new(r"^[a-z][a-z0-9_]*$").unwrap()),
                severity: RuleSeverity::Warning,
                category: RuleCategory::Naming,
                message: "field '{value}' should be snake_case".to_string(),
            },
            Rule {
                id: "operation-id-required".to_string(),
                selector: Selector::Operations,
                check: Check::NonEmpty,
                severity: RuleSeverity::Error,
                category: RuleCategory::Metadata,
                message: "operation is missing a non-empty operationId".to_string(),
            },
            Rule {
                id: "version-required".to_string(),
                selector: Selector::Document,
                check: Check::NonEmpty,
                severity: RuleSeverity::Error,
                category: RuleCategory::Metadata,
                message: "info.version must be present and non-empty".to_string(),
            },
        ];
        RuleSet { rules }
    }

    /// Compile a rule set from a raw JSON document. Validates against the
    /// embedded meta-schema first, then compiles patterns; any failure is a
    /// `RuleConfig` error raised before evaluation.
    pub fn from_json(document: &Value) -> Result<Self> {
        let meta: Value = serde_json::from_str(META_SCHEMA)
            .map_err(|e| SpecError::RuleConfig(format!("embedded meta-schema is invalid: {e}")))?;
        let compiled = JSONSchema::compile(&meta)
            .map_err(|e| SpecError::RuleConfig(format!("embedded meta-schema is invalid: {e}")))?;
        if let Err(errors) = compiled.validate(document) {
            let details: Vec<String> = errors
                .map(|error| format!("{} at {}", error, error.instance_path))
                .collect();
            return Err(SpecError::RuleConfig(details.join("; ")));
        }

        let spec: RuleSetSpec = serde_json::from_value(document.clone())
            .map_err(|e| SpecError::RuleConfig(e.to_string()))?;

        let mut rules = Vec::with_capacity(spec.rules.len());
        for rule in spec.rules {
            rules.push(compile_rule(rule)?);
        }
        Ok(RuleSet { rules })
    }

    /// Load a rule set from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let document: Value =
            serde_json::from_str(&content).map_err(|e| SpecError::RuleConfig(e.to_string()))?;
        Self::from_json(&document)
    }
}

fn compile_rule(spec: RuleSpec) -> Result<Rule> {
    let check = match spec.check {
        CheckSpec::Pattern(pattern) => {
            let compiled = Regex::new(&pattern).map_err(|e| {
                SpecError::RuleConfig(format!("rule '{}': invalid pattern: {e}", spec.id))
            })?;
            Check::Pattern(compiled)
        }
        CheckSpec::MemberOf(values) => Check::MemberOf(values.into_iter().collect()),
        CheckSpec::NonEmpty => Check::NonEmpty,
    };
    Ok(Rule {
        id: spec.id,
        selector: spec.selector,
        check,
        severity: spec.severity,
        category: spec.category,
        message: spec.message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_rules_cover_all_selectors() {
        let rules = RuleSet::builtin();
        assert_eq!(rules.rules.len(), 4);
        for selector in [
            Selector::PathTemplates,
            Selector::FieldNames,
            Selector::Operations,
            Selector::Document,
        ] {
            assert!(rules.rules.iter().any(|r| r.selector == selector));
        }
    }

    #[test]
    fn test_kebab_pattern() {
        let rules = RuleSet::builtin();
        let kebab = rules
            .rules
            .iter()
            .find(|r| r.id == "path-kebab-case")
            .unwrap();
        assert!(kebab.check.passes("user-profiles"));
        assert!(kebab.check.passes("v1"));
        assert!(!kebab.check.passes("User_Profiles"));
        assert!(!kebab.check.passes("userProfiles"));
    }

    #[test]
    fn test_snake_pattern() {
        let rules = RuleSet::builtin();
        let snake = rules
            .rules
            .iter()
            .find(|r| r.id == "field-snake-case")
            .unwrap();
        assert!(snake.check.passes("created_at"));
        assert!(snake.check.passes("id"));
        assert!(!snake.check.passes("createdAt"));
        assert!(!snake.check.passes("created-at"));
    }

    #[test]
    fn test_custom_rule_set_compiles() {
        let rules = RuleSet::from_json(&json!({
            "rules": [{
                "id": "no-v-prefix",
                "selector": "path-templates",
                "check": { "pattern": "^(?:[a-u]|[w-z])" },
                "severity": "warning",
                "category": "naming",
                "message": "'{value}' uses a version prefix"
            }]
        }))
        .unwrap();
        assert_eq!(rules.rules.len(), 1);
        assert_eq!(rules.rules[0].severity, RuleSeverity::Warning);
    }

    #[test]
    fn test_invalid_pattern_is_rule_config_error() {
        let err = RuleSet::from_json(&json!({
            "rules": [{
                "id": "broken",
                "selector": "field-names",
                "check": { "pattern": "([" },
                "severity": "error",
                "category": "naming",
                "message": "broken"
            }]
        }))
        .unwrap_err();
        assert!(matches!(err, SpecError::RuleConfig(_)));
    }

    #[test]
    fn test_unknown_selector_fails_meta_schema() {
        let err = RuleSet::from_json(&json!({
            "rules": [{
                "id": "bad",
                "selector": "everything",
                "check": "non_empty",
                "severity": "error",
                "category": "metadata",
                "message": "bad"
            }]
        }))
        .unwrap_err();
        assert!(matches!(err, SpecError::RuleConfig(_)));
    }

    #[test]
    fn test_missing_rules_key_fails_meta_schema() {
        let err = RuleSet::from_json(&json!({ "checks": [] })).unwrap_err();
        assert!(matches!(err, SpecError::RuleConfig(_)));
    }

    #[test]
    fn test_message_template_substitution() {
        let rule = Rule {
            id: "x".to_string(),
            selector: Selector::Document,
            check: Check::NonEmpty,
            severity: RuleSeverity::Error,
            category: RuleCategory::Metadata,
            message: "value '{value}' rejected".to_string(),
        };
        assert_eq!(rule.render_message("abc"), "value 'abc' rejected");
    }
}
