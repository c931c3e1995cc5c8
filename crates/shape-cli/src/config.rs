//! # Configuration
//!
//! Optional YAML configuration file for the `shape` binary:
//!
//! ```yaml
//! max_depth: 128
//! max_steps: 100000
//! lenient: false
//! format: text
//! ```
//!
//! Every key is optional. Command-line flags override file values, and
//! file values override the library defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use shape_schema::{DecodeOptions, ValidationOptions};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// A single pretty-printed JSON document.
    Json,
}

/// Contents of a `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub max_depth: Option<usize>,
    pub max_steps: Option<usize>,
    pub lenient: Option<bool>,
    pub format: Option<OutputFormat>,
}

impl CliConfig {
    /// Read a configuration file. An empty file is the default configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Load `path` if given, otherwise the defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides and fill the remaining gaps with defaults.
    pub fn resolve(&self, overrides: &Overrides) -> Settings {
        let defaults = ValidationOptions::default();
        Settings {
            validation: ValidationOptions {
                max_depth: overrides
                    .max_depth
                    .or(self.max_depth)
                    .unwrap_or(defaults.max_depth),
                max_steps: overrides
                    .max_steps
                    .or(self.max_steps)
                    .unwrap_or(defaults.max_steps),
            },
            decode: DecodeOptions {
                lenient: overrides.lenient || self.lenient.unwrap_or(false),
            },
            format: overrides.format.or(self.format).unwrap_or_default(),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_depth: Option<usize>,
    pub max_steps: Option<usize>,
    /// `--lenient` can only switch leniency on.
    pub lenient: bool,
    pub format: Option<OutputFormat>,
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub validation: ValidationOptions,
    pub decode: DecodeOptions,
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        CliConfig::default().resolve(&Overrides::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = CliConfig::load_optional(None).unwrap();
        let settings = config.resolve(&Overrides::default());
        assert_eq!(settings.validation, ValidationOptions::default());
        assert!(!settings.decode.lenient);
        assert_eq!(settings.format, OutputFormat::Text);
    }

    #[test]
    fn test_file_values_apply() {
        let file = write("max_depth: 12\nlenient: true\nformat: json\n");
        let settings = CliConfig::load(file.path())
            .unwrap()
            .resolve(&Overrides::default());
        assert_eq!(settings.validation.max_depth, 12);
        assert_eq!(
            settings.validation.max_steps,
            ValidationOptions::default().max_steps
        );
        assert!(settings.decode.lenient);
        assert_eq!(settings.format, OutputFormat::Json);
    }

    #[test]
    fn test_flags_override_file() {
        let file = write("max_depth: 12\nmax_steps: 50\nformat: json\n");
        let overrides = Overrides {
            max_depth: Some(99),
            format: Some(OutputFormat::Text),
            ..Overrides::default()
        };
        let settings = CliConfig::load(file.path()).unwrap().resolve(&overrides);
        assert_eq!(settings.validation.max_depth, 99);
        assert_eq!(settings.validation.max_steps, 50);
        assert_eq!(settings.format, OutputFormat::Text);
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = write("\n");
        assert_eq!(CliConfig::load(file.path()).unwrap(), CliConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let file = write("max_dpeth: 3\n");
        let err = CliConfig::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("max_dpeth"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = CliConfig::load(Path::new("/nonexistent/shape.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
