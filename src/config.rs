use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::aggregate::DEFAULT_TOP_N;
use crate::data::clean::MalformedRowPolicy;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Runtime settings, read from an optional TOML file:
///
/// ```toml
/// top_n = 5
/// malformed_rows = "skip"   # or "fail"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Length of the ranked category lists.
    pub top_n: usize,
    /// How rows with unparsable prices or discounts are handled.
    pub malformed_rows: MalformedRowPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            malformed_rows: MalformedRowPolicy::default(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing settings TOML")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings = Self::from_toml_str(&text)?;
        log::debug!("Settings from {}: {settings:?}", path.display());
        Ok(settings)
    }
}
