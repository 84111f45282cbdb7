//! Validation policy for [`crate::Case::validate_into`].
//!
//! Integrity errors (dangling references, duplicate bus ids) are always
//! reported. Everything else is a policy warning a consumer may not care
//! about, so it can be switched off from a TOML file:
//!
//! ```toml
//! warn_self_loops = false
//! require_single_slack = true
//! ```
//!
//! Unspecified keys keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CaseResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Warn when a case has no buses or when it has several buses and no branches.
    pub warn_empty: bool,

    /// Warn when `base_mva` is not strictly positive.
    pub warn_base_mva: bool,

    /// Warn about branches whose two ends are the same bus.
    pub warn_self_loops: bool,

    /// Warn about buses with no in-service branch.
    pub warn_isolated_buses: bool,

    /// Warn when several buses share a name.
    pub warn_duplicate_names: bool,

    /// Warn unless exactly one bus is a reference bus.
    pub require_single_slack: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            warn_empty: true,
            warn_base_mva: true,
            warn_self_loops: true,
            warn_isolated_buses: true,
            warn_duplicate_names: false,
            require_single_slack: false,
        }
    }
}

impl ValidationConfig {
    /// Only integrity errors, no policy warnings.
    pub fn integrity_only() -> Self {
        Self {
            warn_empty: false,
            warn_base_mva: false,
            warn_self_loops: false,
            warn_isolated_buses: false,
            warn_duplicate_names: false,
            require_single_slack: false,
        }
    }

    pub fn from_toml_str(text: &str) -> CaseResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a policy file; a missing file is an error, not a default.
    pub fn load(path: impl AsRef<Path>) -> CaseResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded validation config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CaseError;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = ValidationConfig::from_toml_str("warn_self_loops = false").unwrap();
        assert!(!config.warn_self_loops);
        assert!(config.warn_isolated_buses);
        assert!(!config.require_single_slack);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = ValidationConfig::from_toml_str("").unwrap();
        assert_eq!(config, ValidationConfig::default());
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = ValidationConfig::from_toml_str("warn_self_loops = \"sometimes\"").unwrap_err();
        assert!(matches!(err, CaseError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "require_single_slack = true").unwrap();
        writeln!(file, "warn_duplicate_names = true").unwrap();

        let config = ValidationConfig::load(file.path()).unwrap();
        assert!(config.require_single_slack);
        assert!(config.warn_duplicate_names);
        assert!(config.warn_empty);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ValidationConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CaseError::Io(_)));
    }
}
