//! Spec document loading
//!
//! Reads raw documents from disk into the generic `serde_json::Value` tree
//! the normalizer consumes. YAML and JSON are supported; the format is
//! chosen by file extension. Also discovers spec files under a directory
//! for the multi-spec consistency runner.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;

const SPEC_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Read and parse one spec document.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    let document = if is_yaml(path) {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    debug!(path = %path.display(), "loaded spec document");
    Ok(document)
}

/// Collect every spec file under a directory, sorted for determinism.
pub fn discover_specs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut specs = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SPEC_EXTENSIONS.contains(&ext))
            .unwrap_or(false);
        if matches {
            specs.push(path.to_path_buf());
        }
    }
    specs.sort();
    debug!(dir = %dir.display(), count = specs.len(), "discovered spec files");
    Ok(specs)
}
