//! Shared configuration loader for the mml codec.
//!
//! `defaults/mml.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MmlConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use mml_babel::{ParseOptions, RenderOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/mml.default.toml");

/// Top-level configuration consumed by mml applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MmlConfig {
    pub render: RenderConfig,
    pub parse: ParseConfig,
}

/// Mirrors [`RenderOptions`].
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub list_indent: String,
    pub mention_user_type: String,
    pub form_banner: String,
}

impl From<RenderConfig> for RenderOptions {
    fn from(config: RenderConfig) -> Self {
        RenderOptions {
            indent: config.list_indent,
            user_type: config.mention_user_type,
            form_banner: config.form_banner,
        }
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        config.clone().into()
    }
}

/// Mirrors [`ParseOptions`].
#[derive(Debug, Clone, Deserialize)]
pub struct ParseConfig {
    pub normalize_nbsp: bool,
    pub pad_out_of_range: bool,
    pub allowed_link_schemes: Vec<String>,
}

impl From<ParseConfig> for ParseOptions {
    fn from(config: ParseConfig) -> Self {
        ParseOptions {
            normalize_nbsp: config.normalize_nbsp,
            pad_out_of_range: config.pad_out_of_range,
            allowed_link_schemes: config.allowed_link_schemes,
        }
    }
}

impl From<&ParseConfig> for ParseOptions {
    fn from(config: &ParseConfig) -> Self {
        config.clone().into()
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

    pub fn build(self) -> Result<MmlConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MmlConfig, ConfigError> {
    Loader::new().build()
}
