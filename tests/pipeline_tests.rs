//! End-to-end pipeline tests
//!
//! Exercises loader-shaped input through normalize -> diff and
//! normalize -> lint -> score over fixture specs.

use specdrift::lint::has_errors;
use specdrift::report::{render_changes, render_violations, OutputFormat};
use specdrift::{
    diff, has_breaking, lint, normalize, pairwise, score, ChangeKind, RuleSet, Severity, SpecModel,
};

fn model(raw: &str) -> SpecModel {
    let doc: serde_json::Value = serde_json::from_str(raw).unwrap();
    normalize(&doc).unwrap()
}

fn v1() -> SpecModel {
    model(include_str!("fixtures/payments_v1.json"))
}

fn v2() -> SpecModel {
    model(include_str!("fixtures/payments_v2.json"))
}

// =============================================================================
// Diff Pipeline Tests
// =============================================================================

#[test]
fn test_diff_of_identical_fixture_is_empty() {
    assert!(diff(&v1(), &v1()).is_empty());
    assert!(diff(&v2(), &v2()).is_empty());
}

#[test]
fn test_fixture_diff_classification() {
    let changes = diff(&v1(), &v2());
    assert_eq!(changes.len(), 7);

    let breaking = changes
        .iter()
        .filter(|c| c.severity == Severity::Breaking)
        .count();
    let deprecation = changes
        .iter()
        .filter(|c| c.severity == Severity::Deprecation)
        .count();
    let compatible = changes
        .iter()
        .filter(|c| c.severity == Severity::Compatible)
        .count();
    assert_eq!((breaking, deprecation, compatible), (3, 1, 3));
    assert!(has_breaking(&changes));
}

#[test]
fn test_fixture_diff_ordering_is_stable() {
    let changes = diff(&v1(), &v2());
    let locations: Vec<&str> = changes.iter().map(|c| c.location.as_str()).collect();
    assert_eq!(
        locations,
        vec![
            "GET /users.parameters.tenant_id",
            "GET /users",
            "POST /orders.requestBody.currency",
            "POST /orders.responses.201.amount",
            "POST /orders.responses.201.webhook_url",
            "DELETE /orders",
            "GET /health",
        ]
    );
}

#[test]
fn test_removed_operation_record() {
    let changes = diff(&v1(), &v2());
    let removed = changes
        .iter()
        .find(|c| c.location == "DELETE /orders")
        .unwrap();
    assert_eq!(removed.kind, ChangeKind::Removed);
    assert_eq!(removed.severity, Severity::Breaking);
}

#[test]
fn test_widened_response_field_is_compatible() {
    let changes = diff(&v1(), &v2());
    let widened = changes
        .iter()
        .find(|c| c.location == "POST /orders.responses.201.amount")
        .unwrap();
    assert_eq!(widened.kind, ChangeKind::TypeChanged);
    assert_eq!(widened.severity, Severity::Compatible);
}

#[test]
fn test_request_side_requiredness_tightening_is_breaking() {
    let changes = diff(&v1(), &v2());
    let tightened = changes
        .iter()
        .find(|c| c.location == "POST /orders.requestBody.currency")
        .unwrap();
    assert_eq!(tightened.kind, ChangeKind::RequirednessChanged);
    assert_eq!(tightened.severity, Severity::Breaking);
}

#[test]
fn test_deprecation_record() {
    let changes = diff(&v1(), &v2());
    let deprecated: Vec<_> = changes
        .iter()
        .filter(|c| c.kind == ChangeKind::Deprecated)
        .collect();
    assert_eq!(deprecated.len(), 1);
    assert_eq!(deprecated[0].location, "GET /users");
    assert_eq!(deprecated[0].severity, Severity::Deprecation);
}

#[test]
fn test_add_remove_symmetry_on_fixtures() {
    let forward = diff(&v1(), &v2());
    let backward = diff(&v2(), &v1());

    let mut removed: Vec<&str> = forward
        .iter()
        .filter(|c| c.kind == ChangeKind::Removed && !c.location.contains('.'))
        .map(|c| c.location.as_str())
        .collect();
    let mut added: Vec<&str> = backward
        .iter()
        .filter(|c| c.kind == ChangeKind::Added && !c.location.contains('.'))
        .map(|c| c.location.as_str())
        .collect();
    removed.sort_unstable();
    added.sort_unstable();
    assert_eq!(removed, added);
}

#[test]
fn test_yaml_fixture_normalizes_to_same_model_as_json() {
    let yaml_doc: serde_json::Value =
        serde_yaml::from_str(include_str!("fixtures/payments_v1.yaml")).unwrap();
    let from_yaml = normalize(&yaml_doc).unwrap();
    assert_eq!(from_yaml, v1());
    assert!(diff(&from_yaml, &v1()).is_empty());
}

#[test]
fn test_pairwise_over_fixture_versions() {
    let specs = vec![
        ("v1".to_string(), v1()),
        ("v2".to_string(), v2()),
        ("v1-copy".to_string(), v1()),
    ];
    let pairs = pairwise(&specs);
    assert_eq!(pairs.len(), 3);

    let v1_v2 = pairs
        .iter()
        .find(|p| p.left == "v1" && p.right == "v2")
        .unwrap();
    assert!(v1_v2.has_breaking());

    let v1_copy = pairs
        .iter()
        .find(|p| p.left == "v1" && p.right == "v1-copy")
        .unwrap();
    assert!(v1_copy.changes.is_empty());
}

// =============================================================================
// Lint + Score Pipeline Tests
// =============================================================================

#[test]
fn test_clean_fixture_scores_100() {
    let violations = lint(&v1(), &RuleSet::builtin());
    assert!(violations.is_empty(), "unexpected: {violations:?}");
    let report = score(&violations);
    assert_eq!(report.score, 100);
    assert!(report.breakdown.is_empty());
}

#[test]
fn test_messy_fixture_violations_and_score() {
    let spec = model(include_str!("fixtures/messy.json"));
    let violations = lint(&spec, &RuleSet::builtin());

    let rule_ids: Vec<&str> = violations.iter().map(|v| v.rule_id.as_str()).collect();
    assert!(rule_ids.contains(&"path-kebab-case"));
    assert!(rule_ids.contains(&"field-snake-case"));
    assert!(rule_ids.contains(&"operation-id-required"));
    assert!(rule_ids.contains(&"version-required"));
    assert_eq!(violations.len(), 4);
    assert!(has_errors(&violations));

    // Two errors (10 each) and two warnings (3 each)
    let report = score(&violations);
    assert_eq!(report.score, 74);
}

#[test]
fn test_lint_is_deterministic_across_runs() {
    let spec = model(include_str!("fixtures/messy.json"));
    let rules = RuleSet::builtin();
    assert_eq!(lint(&spec, &rules), lint(&spec, &rules));
}

#[test]
fn test_custom_rule_set_fixture() {
    let rules_doc: serde_json::Value =
        serde_json::from_str(include_str!("fixtures/design_rules.json")).unwrap();
    let rules = RuleSet::from_json(&rules_doc).unwrap();

    // v1 declares a published version and lowercase paths
    assert!(lint(&v1(), &rules).is_empty());

    // messy has an uppercase path segment and no version at all
    let spec = model(include_str!("fixtures/messy.json"));
    let violations = lint(&spec, &rules);
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().any(|v| v.rule_id == "lowercase-paths"));
    assert!(violations.iter().any(|v| v.rule_id == "published-version"));
}

#[test]
fn test_malformed_rule_set_fails_before_evaluation() {
    let bad = serde_json::json!({
        "rules": [{
            "id": "broken",
            "selector": "field-names",
            "check": { "pattern": "([" },
            "severity": "error",
            "category": "naming",
            "message": "never evaluated"
        }]
    });
    let err = RuleSet::from_json(&bad).unwrap_err();
    assert!(matches!(err, specdrift::SpecError::RuleConfig(_)));
}

// =============================================================================
// Reporter Tests
// =============================================================================

#[test]
fn test_diff_json_report_round_trips() {
    let changes = diff(&v1(), &v2());
    let rendered = render_changes(&changes, OutputFormat::Json);
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(parsed["summary"]["breaking"], 3);
    assert_eq!(parsed["summary"]["deprecation"], 1);
    assert_eq!(parsed["summary"]["compatible"], 3);
    assert_eq!(parsed["changes"].as_array().unwrap().len(), 7);
}

#[test]
fn test_lint_github_report_emits_annotations() {
    let spec = model(include_str!("fixtures/messy.json"));
    let violations = lint(&spec, &RuleSet::builtin());
    let rendered = render_violations(&violations, OutputFormat::Github);
    assert!(rendered.lines().any(|l| l.starts_with("::error file=")));
    assert!(rendered.lines().any(|l| l.starts_with("::warning file=")));
    assert!(rendered.contains("2 errors, 2 warnings"));
}
