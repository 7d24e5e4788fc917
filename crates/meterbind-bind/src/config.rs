//! Binding config loader (strict parsing).
//!
//! Instrumentation is off by default; hosts opt in with `enabled: true`.
//! Parsing is strict (`deny_unknown_fields`) so a typo in a tag option
//! fails loudly at startup instead of silently dropping the option.

use std::collections::BTreeMap;
use std::fs;

use serde::Deserialize;

use meterbind_core::{MeterBindError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindConfig {
    /// Master switch. When false, `dispatch_all` registers nothing.
    #[serde(default)]
    pub enabled: bool,

    /// Static tags applied to every registered metric.
    #[serde(default)]
    pub extra_tags: BTreeMap<String, String>,

    /// Whether to add a host-identifying tag to every metric.
    #[serde(default)]
    pub include_host_tag: bool,

    /// Per-call attributes promoted to tags on request-scoped timers.
    #[serde(default)]
    pub request_tag_keys: Vec<String>,

    /// Whether platform-internal resources (reserved display names) are
    /// bound as well.
    #[serde(default)]
    pub include_internal: bool,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            extra_tags: BTreeMap::new(),
            include_host_tag: false,
            request_tag_keys: Vec::new(),
            include_internal: false,
        }
    }
}

impl BindConfig {
    /// Convenience for tests and embedded hosts: defaults with the master
    /// switch on.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for key in self.extra_tags.keys() {
            validate_tag_key(key)?;
        }
        let mut seen = std::collections::BTreeSet::new();
        for key in &self.request_tag_keys {
            validate_tag_key(key)?;
            if !seen.insert(key.as_str()) {
                return Err(MeterBindError::InvalidConfig(format!(
                    "duplicate request_tag_keys entry: {key}"
                )));
            }
        }
        Ok(())
    }
}

/// Tag keys must be lower-case dotted identifiers so rendered label names
/// stay compatible across exporters.
fn validate_tag_key(key: &str) -> Result<()> {
    let ok = !key.is_empty()
        && key.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(MeterBindError::InvalidConfig(format!(
            "tag key must be a lower-case dotted identifier: {key:?}"
        )))
    }
}

pub fn load_from_file(path: &str) -> Result<BindConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MeterBindError::InvalidConfig(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BindConfig> {
    let cfg: BindConfig = serde_yaml::from_str(s)
        .map_err(|e| MeterBindError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
