//! Generator settings file for `natives --config`.
//!
//! # Example
//!
//! ```toml
//! definition_suffix = "macros.py"
//! data_suffix = ".gypi"
//! deps_segment = "deps"
//! internal_prefix = "internal"
//! deprecated_packages = ["node-inspect", "v8"]
//! max_depth = 64
//! template = "templates/node_javascript.cc.in"
//! ```
//!
//! Every key is optional. A relative `template` path is resolved against
//! the directory holding the settings file.

use std::path::{Path, PathBuf};

use natives_codegen::{AssemblerConfig, OutputTemplate};
use serde::Deserialize;

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub definition_suffix: Option<String>,
    pub data_suffix: Option<String>,
    pub deps_segment: Option<String>,
    pub internal_prefix: Option<String>,
    pub deprecated_packages: Option<Vec<String>>,
    pub max_depth: Option<usize>,
    pub template: Option<PathBuf>,
}

/// Values given on the command line. These win over the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_depth: Option<usize>,
    pub template: Option<PathBuf>,
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read and parse a settings file.
pub fn read_settings(path: &Path) -> Result<Settings, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    let mut settings: Settings = toml::from_str(&content)
        .map_err(|e| format!("could not parse '{}': {}", path.display(), e))?;

    if let Some(template) = settings.template.take() {
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        settings.template = Some(base.join(template));
    }
    Ok(settings)
}

/// Read a template file and check its placeholders.
pub fn read_template(path: &Path) -> Result<OutputTemplate, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read template '{}': {}", path.display(), e))?;
    OutputTemplate::from_text(&text).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Merge defaults, the settings file and command-line overrides.
pub fn resolve(settings: Settings, overrides: Overrides) -> Result<AssemblerConfig, String> {
    let mut config = AssemblerConfig::default();
    if let Some(suffix) = settings.definition_suffix {
        config.definition_suffix = suffix;
    }
    if let Some(suffix) = settings.data_suffix {
        config.data_suffix = suffix;
    }
    if let Some(segment) = settings.deps_segment {
        config.naming.deps_segment = segment;
    }
    if let Some(prefix) = settings.internal_prefix {
        config.naming.internal_prefix = prefix;
    }
    if let Some(packages) = settings.deprecated_packages {
        config.naming.deprecated_packages = packages;
    }

    if let Some(depth) = overrides.max_depth.or(settings.max_depth) {
        if depth == 0 {
            return Err("max_depth must be at least 1".to_string());
        }
        config.max_depth = depth;
    }
    if let Some(path) = overrides.template.or(settings.template) {
        config.template = read_template(&path)?;
    }
    Ok(config)
}
