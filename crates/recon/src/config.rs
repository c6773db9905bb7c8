use serde::Deserialize;

use crate::error::ReconError;
use crate::locator::PrefixRule;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    pub name: String,
    /// Semantic version stamped into output file names and the report.
    pub version: String,
    #[serde(default = "default_key_column")]
    pub key_column: String,
    /// Columns dropped on load, matched case-insensitively.
    #[serde(default = "default_exclude_columns")]
    pub exclude_columns: Vec<String>,
    /// Path to the special-case JSON, relative to the config file.
    #[serde(default)]
    pub special_cases: Option<String>,
    #[serde(default)]
    pub prefix_rule: PrefixRule,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_key_column() -> String {
    "דפוס".into()
}

fn default_exclude_columns() -> Vec<String> {
    vec!["פתיחה וחתימה".into()]
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Glob relative to the config file, e.g. `"csv_formatted/*.csv"`.
    pub pattern: String,
}

// ---------------------------------------------------------------------------
// Merge + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_placeholder() -> String {
    "--".into()
}

fn default_separator() -> String {
    "; ".into()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            separator: default_separator(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_output_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub summary_format: SummaryFormat,
}

fn default_output_dir() -> String {
    "outputs".into()
}

fn default_output_prefix() -> String {
    "responsa_index".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            prefix: default_output_prefix(),
            summary_format: SummaryFormat::default(),
        }
    }
}

/// Format of the handler-count summary file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryFormat {
    #[default]
    Json,
    Csv,
}

impl SummaryFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl IndexConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: IndexConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        semver::Version::parse(&self.version).map_err(|e| {
            ReconError::ConfigValidation(format!("version '{}' is not semver: {e}", self.version))
        })?;

        if self.key_column.trim().is_empty() {
            return Err(ReconError::ConfigValidation("key_column must not be empty".into()));
        }

        let key_lower = self.key_column.to_lowercase();
        if self.exclude_columns.iter().any(|c| c.to_lowercase() == key_lower) {
            return Err(ReconError::ConfigValidation(format!(
                "key column '{}' is listed in exclude_columns",
                self.key_column
            )));
        }

        if self.sources.pattern.trim().is_empty() {
            return Err(ReconError::ConfigValidation("sources.pattern must not be empty".into()));
        }

        if self.merge.separator.is_empty() {
            return Err(ReconError::ConfigValidation("merge.separator must not be empty".into()));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
