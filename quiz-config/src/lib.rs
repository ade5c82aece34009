//! Shared configuration loader for the quiz converter.
//!
//! `defaults/quiz.default.toml` is embedded into every binary so that the documented defaults
//! and runtime behavior stay in sync. Applications layer user files and single-key overrides on
//! top of those defaults via [`Loader`] before deserializing into [`QuizConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use quiz_babel::{ExportOptions, FillBlankExportMode, ImportOptions};
use quiz_parser::labels::Language;
use quiz_parser::markup::{BuildOptions, ParseOptions};
use serde::Deserialize;
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/quiz.default.toml");

/// Top-level configuration consumed by quiz applications.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizConfig {
    pub markup: MarkupConfig,
    pub exchange: ExchangeConfig,
    pub labels: LabelsConfig,
}

/// Source markup knobs: uid parts and builder output.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkupConfig {
    pub subject: String,
    pub course_code: String,
    pub include_solutions: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    pub fill_blank_mode: FillBlankExportMode,
    pub combined_delimiter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelsConfig {
    pub language: Language,
}

impl QuizConfig {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::new(&self.markup.subject, &self.markup.course_code)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            include_solutions: self.markup.include_solutions,
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            fill_blank_mode: self.exchange.fill_blank_mode,
            combined_delimiter: self.exchange.combined_delimiter.clone(),
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            combined_delimiter: self.exchange.combined_delimiter.clone(),
        }
    }

    pub fn language(&self) -> Language {
        self.labels.language
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

    /// Apply a single key/value override (CLI flags end up here).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<QuizConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<QuizConfig, ConfigError> {
    Loader::new().build()
}
