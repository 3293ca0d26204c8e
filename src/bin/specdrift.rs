//! specdrift CLI
//!
//! Detect breaking changes between API spec versions and enforce design
//! rules.
//!
//! Usage:
//!   specdrift diff old.yaml new.yaml
//!   specdrift lint spec.yaml --rules design-rules.json
//!   specdrift score spec.yaml --fail-under 80
//!   specdrift check specs/
//!
//! Exit codes: 0 clean, 1 should block (breaking changes, lint errors, or a
//! score under the threshold), 2 fatal (unreadable input, parse failure, bad
//! rule set).

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use specdrift::config::SpecdriftConfig;
use specdrift::lint::has_errors;
use specdrift::loader::{discover_specs, load_document};
use specdrift::report::{self, OutputFormat};
use specdrift::{diff, has_breaking, lint, normalize, pairwise, score, Fingerprint, RuleSet};

#[derive(Parser)]
#[command(name = "specdrift")]
#[command(about = "Detect breaking API changes and enforce design rules")]
struct Cli {
    /// Path to a config file (defaults to specdrift.toml discovery)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect breaking changes between two spec versions
    Diff {
        /// Old spec path
        old: PathBuf,
        /// New spec path
        new: PathBuf,
        /// Output format (text, json, markdown, github, auto)
        #[arg(short, long)]
        format: Option<String>,
        /// Do not exit non-zero on breaking changes
        #[arg(long)]
        no_block: bool,
    },
    /// Enforce design rules against one spec
    Lint {
        /// Spec path
        spec: PathBuf,
        /// Output format (text, json, markdown, github, auto)
        #[arg(short, long)]
        format: Option<String>,
        /// Custom rule set (JSON)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Calculate the design consistency score (0-100)
    Score {
        /// Spec path
        spec: PathBuf,
        /// Output format (text, json, markdown, github, auto)
        #[arg(short, long)]
        format: Option<String>,
        /// Fail when the score is below this threshold
        #[arg(long)]
        fail_under: Option<u32>,
    },
    /// Pairwise-diff every spec under a directory
    Check {
        /// Directory containing spec files
        dir: PathBuf,
        /// Output format (text, json, markdown, github, auto)
        #[arg(short, long)]
        format: Option<String>,
    },
}

/// Whether the invocation should block the caller (CI) without being fatal.
enum Outcome {
    Clean,
    Block,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(Outcome::Clean) => {}
        Ok(Outcome::Block) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {e:#}");
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = SpecdriftConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Diff {
            old,
            new,
            format,
            no_block,
        } => {
            let format = resolve_format(format.as_deref(), &config)?;
            let old_model = normalize(&load_document(&old)?)
                .with_context(|| format!("failed to normalize {}", old.display()))?;
            let new_model = normalize(&load_document(&new)?)
                .with_context(|| format!("failed to normalize {}", new.display()))?;

            let changes = diff(&old_model, &new_model);
            println!("{}", report::render_changes(&changes, format));

            if !no_block && config.diff.block_on_breaking && has_breaking(&changes) {
                eprintln!("BLOCKED: breaking changes detected");
                return Ok(Outcome::Block);
            }
            Ok(Outcome::Clean)
        }

        Commands::Lint {
            spec,
            format,
            rules,
        } => {
            let format = resolve_format(format.as_deref(), &config)?;
            let ruleset = load_ruleset(rules.or(config.lint.ruleset))?;
            let model = normalize(&load_document(&spec)?)
                .with_context(|| format!("failed to normalize {}", spec.display()))?;

            let violations = lint(&model, &ruleset);
            println!("{}", report::render_violations(&violations, format));

            if has_errors(&violations) {
                Ok(Outcome::Block)
            } else {
                Ok(Outcome::Clean)
            }
        }

        Commands::Score {
            spec,
            format,
            fail_under,
        } => {
            let format = resolve_format(format.as_deref(), &config)?;
            let ruleset = load_ruleset(config.lint.ruleset.clone())?;
            let model = normalize(&load_document(&spec)?)
                .with_context(|| format!("failed to normalize {}", spec.display()))?;

            let report_card = score(&lint(&model, &ruleset));
            println!("{}", report::render_score(&report_card, format));

            let threshold = fail_under.unwrap_or(config.score.fail_under);
            if report_card.score < threshold {
                eprintln!("score {} is below threshold {}", report_card.score, threshold);
                Ok(Outcome::Block)
            } else {
                Ok(Outcome::Clean)
            }
        }

        Commands::Check { dir, format } => {
            let format = resolve_format(format.as_deref(), &config)?;
            let paths = discover_specs(&dir)?;
            anyhow::ensure!(!paths.is_empty(), "no spec files found under {}", dir.display());

            // Identical documents would only produce empty diffs; skip them.
            let mut seen: HashMap<Fingerprint, String> = HashMap::new();
            let mut specs = Vec::new();
            let mut skipped = 0usize;
            for path in &paths {
                let document = load_document(path)?;
                let name = path
                    .strip_prefix(&dir)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .into_owned();
                let fingerprint = Fingerprint::of(&document);
                if let Some(first) = seen.get(&fingerprint) {
                    tracing::debug!(spec = %name, same_as = %first, "skipping identical document");
                    skipped += 1;
                    continue;
                }
                seen.insert(fingerprint, name.clone());
                let model = normalize(&document)
                    .with_context(|| format!("failed to normalize {}", path.display()))?;
                specs.push((name, model));
            }

            let pairs = pairwise(&specs);
            println!("{}", report::render_pairwise(&pairs, format));
            if skipped > 0 {
                eprintln!("{skipped} identical documents skipped");
            }

            if pairs.iter().any(|pair| pair.has_breaking()) {
                eprintln!("BLOCKED: breaking differences between specs");
                return Ok(Outcome::Block);
            }
            Ok(Outcome::Clean)
        }
    }
}

fn resolve_format(flag: Option<&str>, config: &SpecdriftConfig) -> anyhow::Result<OutputFormat> {
    let name = flag.unwrap_or(&config.output.format);
    OutputFormat::detect(name)
        .ok_or_else(|| anyhow::anyhow!("unknown output format '{name}' (expected text, json, markdown, github, or auto)"))
}

fn load_ruleset(path: Option<PathBuf>) -> anyhow::Result<RuleSet> {
    match path {
        Some(path) => RuleSet::load(&path)
            .with_context(|| format!("failed to load rule set {}", path.display())),
        None => Ok(RuleSet::builtin()),
    }
}
