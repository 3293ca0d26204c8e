//! Configuration management
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (specdrift.toml)
//! - Environment variables (SPECDRIFT_*)
//!
//! ## Example config file (specdrift.toml):
//! ```toml
//! [diff]
//! block_on_breaking = true
//!
//! [lint]
//! ruleset = "design-rules.json"
//!
//! [score]
//! fail_under = 60
//!
//! [output]
//! format = "auto"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpecdriftConfig {
    /// Diff settings
    #[serde(default)]
    pub diff: DiffConfig,

    /// Lint settings
    #[serde(default)]
    pub lint: LintConfig,

    /// Score settings
    #[serde(default)]
    pub score: ScoreConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Diff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Whether breaking changes should block (exit non-zero)
    #[serde(default = "default_true")]
    pub block_on_breaking: bool,
}

/// Lint configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LintConfig {
    /// Path to a custom rule set (JSON); built-in rules when absent
    #[serde(default)]
    pub ruleset: Option<PathBuf>,
}

/// Score configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Scores below this threshold fail the invocation
    #[serde(default = "default_fail_under")]
    pub fail_under: u32,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format (text, json, markdown, github, auto)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_true() -> bool {
    true
}

fn default_fail_under() -> u32 {
    60
}

fn default_format() -> String {
    "auto".to_string()
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            block_on_breaking: true,
        }
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            fail_under: default_fail_under(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

impl SpecdriftConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["specdrift.toml", ".specdrift.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "specdrift") {
            let xdg_config = config_dir.config_dir().join("specdrift.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (SPECDRIFT_*)
        builder = builder.add_source(
            Environment::with_prefix("SPECDRIFT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpecdriftConfig::default();
        assert!(config.diff.block_on_breaking);
        assert!(config.lint.ruleset.is_none());
        assert_eq!(config.score.fail_under, 60);
        assert_eq!(config.output.format, "auto");
    }

    #[test]
    fn test_serialize_config() {
        let config = SpecdriftConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[diff]"));
        assert!(toml_str.contains("[score]"));
    }
}
