//! Shared configuration loader for the mlmd generator.
//!
//! `defaults/mlmd.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MlmdConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
pub use config::ConfigError;
use mlmd_gen::{GeneratorOptions, OutputMode};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/mlmd.default.toml");

/// Top-level configuration consumed by mlmd applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MlmdConfig {
    pub generate: GenerateConfig,
}

/// Mirrors the knobs exposed by the generator.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateConfig {
    /// One of `md`, `mdpure`, `html`, `htmlold`.
    pub output_mode: String,
    /// Default numbering scheme; empty disables default numbering.
    pub numbering: String,
}

impl GenerateConfig {
    /// Resolves the configured mode name, picking the numbered variant
    /// when a default numbering scheme is set.
    pub fn output_mode(&self) -> Option<OutputMode> {
        OutputMode::from_name(&self.output_mode, !self.numbering.is_empty())
    }
}

impl From<&GenerateConfig> for GeneratorOptions {
    fn from(config: &GenerateConfig) -> Self {
        GeneratorOptions {
            output_mode: config.output_mode().unwrap_or_default(),
            numbering: if config.numbering.is_empty() {
                None
            } else {
                Some(config.numbering.clone())
            },
            ..GeneratorOptions::default()
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MlmdConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MlmdConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.generate.output_mode, "md");
        assert!(config.generate.numbering.is_empty());
        assert_eq!(config.generate.output_mode(), Some(OutputMode::Md));
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("generate.output_mode", "htmlold")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.generate.output_mode(), Some(OutputMode::HtmlOld));
    }

    #[test]
    fn numbering_selects_the_numbered_variant() {
        let config = Loader::new()
            .set_override("generate.numbering", "1::1:.")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.generate.output_mode(), Some(OutputMode::MdNum));
        let options: GeneratorOptions = (&config.generate).into();
        assert_eq!(options.numbering.as_deref(), Some("1::1:."));
    }

    #[test]
    fn generate_config_converts_to_options() {
        let config = load_defaults().expect("defaults to deserialize");
        let options: GeneratorOptions = (&config.generate).into();
        assert_eq!(options.output_mode, OutputMode::Md);
        assert!(options.numbering.is_none());
        assert!(options.main_file.is_none());
    }
}
