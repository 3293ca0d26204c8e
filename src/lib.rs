//! specdrift
//!
//! Breaking-change detection and design-rule linting for API spec documents.
//!
//! ## Features
//!
//! - **Structural Diffing**: Two spec versions are normalized into canonical
//!   models and compared field by field, with every change classified as
//!   breaking, deprecation, or compatible
//! - **Design Rules**: Declarative naming/metadata rules (built-in or custom
//!   JSON rule sets) evaluated against one spec, with a 0-100 consistency
//!   score
//! - **Reference Resolution**: Internal `$ref`s are inlined eagerly; cycles
//!   and dangling targets fail fast
//! - **Multi-Spec Consistency**: N specs are diffed pairwise across a
//!   parallel worker pool
//!
//! ## Pipeline
//!
//! ```text
//! loader ──> normalizer ──┬──> diff engine ───────────────┐
//!                         │                               ├──> reporter
//!                         └──> rule engine ──> scorer ────┘
//! ```
//!
//! Normalization errors stop the pipeline before any diff or lint work
//! begins; no partial output is ever produced.

pub mod config;
pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod lint;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod report;
pub mod score;

pub use diff::{diff, has_breaking, pairwise, ChangeKind, ChangeRecord, PairDiff, Severity};
pub use error::{Result, SpecError};
pub use fingerprint::Fingerprint;
pub use lint::{lint, Rule, RuleCategory, RuleSet, RuleSeverity, RuleViolation, Selector};
pub use model::{SchemaNode, SpecModel};
pub use normalize::normalize;
pub use score::{score, ScoreReport};
