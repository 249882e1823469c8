//! Runtime settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use varray_core::ScalarKind;

/// Runtime settings, read from a JSON file when one is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeSettings {
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub report_lattice: bool,
    pub smoke: SmokeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmokeSettings {
    pub kinds: Vec<ScalarKind>,
    pub length: usize,
    pub extents: Vec<isize>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            report_lattice: true,
            smoke: SmokeSettings::default(),
        }
    }
}

impl Default for SmokeSettings {
    fn default() -> Self {
        Self {
            kinds: ScalarKind::ALL.to_vec(),
            length: 4,
            extents: vec![2, 3],
        }
    }
}

impl RuntimeSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing settings in {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = RuntimeSettings::from_json(r#"{ "smoke": { "kinds": ["char", "f32"] } }"#)
            .unwrap();
        assert_eq!(settings.log_filter, "info");
        assert!(settings.report_lattice);
        assert_eq!(settings.smoke.kinds, vec![ScalarKind::Char, ScalarKind::F32]);
        assert_eq!(settings.smoke.length, 4);
        assert_eq!(settings.smoke.extents, vec![2, 3]);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(RuntimeSettings::from_json(r#"{ "verbose": true }"#).is_err());
        assert!(RuntimeSettings::from_json(r#"{ "smoke": { "kinds": ["u8"] } }"#).is_err());
    }
}
