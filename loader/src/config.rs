//! Validator configuration file.
//!
//! Selects how the validator treats undeclared fields and how many
//! violations it reports per document. Both keys are optional.
//!
//! # Example YAML
//!
//! ```yaml
//! unknown_fields: strict   # or permissive (default)
//! report: first            # or all (default)
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use docschema_core::{ReportMode, UnknownFieldPolicy, Validator};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// YAML-serializable validator settings.
///
/// # Examples
///
/// ```
/// use docschema_core::{ReportMode, UnknownFieldPolicy};
/// use docschema_loader::ValidatorConfig;
///
/// let config: ValidatorConfig = serde_yaml::from_str("unknown_fields: strict").unwrap();
/// assert_eq!(config.unknown_fields, UnknownFieldPolicy::Strict);
/// assert_eq!(config.report, ReportMode::All);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Treatment of fields the schema does not declare.
    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,
    /// Whether to report every violation or stop at the first.
    #[serde(default)]
    pub report: ReportMode,
}

impl ValidatorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::LoadError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::LoadError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        // An empty file deserializes to unit, not to an empty map.
        let config: Option<Self> = serde_yaml::from_reader(reader)?;
        let config = config.unwrap_or_default();
        info!(
            path = %path.display(),
            unknown_fields = ?config.unknown_fields,
            report = ?config.report,
            "loaded validator config"
        );
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::LoadError::IoError) if the file cannot be
    /// written, or [`YamlError`](crate::LoadError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Builds a [`Validator`] with these settings.
    pub fn validator(&self) -> Validator {
        Validator::new()
            .with_unknown_fields(self.unknown_fields)
            .with_report_mode(self.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_complete() {
        let config: ValidatorConfig =
            serde_yaml::from_str("unknown_fields: strict\nreport: first\n").unwrap();
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Strict);
        assert_eq!(config.report, ReportMode::First);
    }

    #[test]
    fn test_defaults_are_permissive_all() {
        let config: ValidatorConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ValidatorConfig::default());
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Permissive);
        assert_eq!(config.report, ReportMode::All);
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let result: std::result::Result<ValidatorConfig, _> =
            serde_yaml::from_str("unknown_fields: lenient");
        assert!(result.is_err());
    }

    #[test]
    fn test_validator_carries_settings() {
        let config = ValidatorConfig {
            unknown_fields: UnknownFieldPolicy::Strict,
            report: ReportMode::First,
        };
        let validator = config.validator();
        assert_eq!(validator.unknown_fields(), UnknownFieldPolicy::Strict);
        assert_eq!(validator.report_mode(), ReportMode::First);
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validator.yml");

        let original = ValidatorConfig {
            unknown_fields: UnknownFieldPolicy::Strict,
            report: ReportMode::All,
        };
        original.save(&path).unwrap();
        assert_eq!(ValidatorConfig::load(&path).unwrap(), original);
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(
            ValidatorConfig::load(&path).unwrap(),
            ValidatorConfig::default()
        );
    }
}
