//! Score Calculator
//!
//! Pure, total reduction of a violation list to a 0-100 consistency score.
//! Structurally significant rules (Error severity) cost more than cosmetic
//! naming rules (Warning severity).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::lint::{RuleCategory, RuleSeverity, RuleViolation};

/// Penalty per Error-severity violation
const ERROR_PENALTY: u32 = 10;
/// Penalty per Warning-severity violation
const WARNING_PENALTY: u32 = 3;

/// Consistency score with a per-category penalty breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// 0-100; an empty violation list scores exactly 100
    pub score: u32,
    /// Penalty accumulated per rule category
    pub breakdown: BTreeMap<RuleCategory, u32>,
}

impl ScoreReport {
    pub fn is_perfect(&self) -> bool {
        self.score == 100
    }
}

fn penalty(severity: RuleSeverity) -> u32 {
    match severity {
        RuleSeverity::Error => ERROR_PENALTY,
        RuleSeverity::Warning => WARNING_PENALTY,
    }
}

/// Reduce violations to a score. Starts at 100, subtracts a fixed
/// severity-weighted penalty per violation, clamps to [0, 100].
pub fn score(violations: &[RuleViolation]) -> ScoreReport {
    let mut breakdown: BTreeMap<RuleCategory, u32> = BTreeMap::new();
    let mut total: u32 = 0;
    for violation in violations {
        let cost = penalty(violation.severity);
        *breakdown.entry(violation.category).or_insert(0) += cost;
        total = total.saturating_add(cost);
    }
    ScoreReport {
        score: 100 - total.min(100),
        breakdown,
    }
}
