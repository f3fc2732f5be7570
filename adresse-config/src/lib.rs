//! Configuration for the `adresse` binary: regex engine budget, commune table layout,
//! and output format.
//!
//! The defaults live in `defaults/adresse.default.toml`, compiled in. A user file and
//! command-line flags are layered on top with [`Loader`].

use adresse::GrammarOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/adresse.default.toml");

/// Top-level configuration consumed by adresse applications.
#[derive(Debug, Clone, Deserialize)]
pub struct AdresseConfig {
    pub engine: EngineConfig,
    pub vocabulary: VocabularyConfig,
    pub output: OutputConfig,
}

/// Regex engine budget for grammar construction.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EngineConfig {
    pub size_limit: usize,
    pub dfa_size_limit: usize,
    pub nest_limit: u32,
    pub max_repeat: u32,
}

impl EngineConfig {
    pub fn grammar_options(&self) -> GrammarOptions {
        GrammarOptions {
            size_limit: self.size_limit,
            dfa_size_limit: self.dfa_size_limit,
            nest_limit: self.nest_limit,
            max_repeat: self.max_repeat,
        }
    }
}

/// Layout of the commune reference table.
#[derive(Debug, Clone, Deserialize)]
pub struct VocabularyConfig {
    pub delimiter: char,
    pub has_headers: bool,
    pub commune_column: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub streets: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Json,
    Text,
}

/// Builds an [`AdresseConfig`] from the embedded defaults.
///
/// Layers apply in call order, so a `--config` file overrides the defaults and flags
/// applied after it override the file.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let defaults = File::from_str(DEFAULT_TOML, FileFormat::Toml);
        Self {
            builder: Config::builder().add_source(defaults),
        }
    }

    /// Layer a TOML file. It must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let file = File::from(path.as_ref()).format(FileFormat::Toml);
        self.builder = self.builder.add_source(file.required(true));
        self
    }

    /// `json` or `text`; anything else fails in [`Loader::build`].
    pub fn with_output_format(self, format: &str) -> Result<Self, ConfigError> {
        self.set("output.format", format)
    }

    /// Report street-level matches instead of full addresses.
    pub fn with_streets(self, streets: bool) -> Result<Self, ConfigError> {
        self.set("output.streets", streets)
    }

    /// Override a single dotted key such as `engine.max_repeat`.
    pub fn set<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Deserialize the layered sources. Zero engine limits are rejected here; limits too
    /// small for the grammar fail later, when it is compiled.
    pub fn build(self) -> Result<AdresseConfig, ConfigError> {
        let config: AdresseConfig = self.builder.build()?.try_deserialize()?;
        let engine = &config.engine;
        let zero = [
            ("size_limit", engine.size_limit == 0),
            ("dfa_size_limit", engine.dfa_size_limit == 0),
            ("nest_limit", engine.nest_limit == 0),
            ("max_repeat", engine.max_repeat == 0),
        ];
        if let Some((key, _)) = zero.iter().find(|(_, is_zero)| *is_zero) {
            return Err(ConfigError::Message(format!(
                "engine.{key} must be greater than zero"
            )));
        }
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<AdresseConfig, ConfigError> {
    Loader::new().build()
}
