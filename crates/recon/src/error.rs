use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad version, empty key column, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Special-case table could not be loaded. Always fatal.
    #[error("special cases error: {0}")]
    SpecialCases(String),
    /// Missing required column in a source table.
    #[error("source '{source_id}': missing column '{column}'")]
    MissingColumn { source_id: String, column: String },
    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<csv::Error> for ReconError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

/// Failures converting numerals and locators to sort keys.
///
/// These are recovered at the call site: the caller logs and keeps the
/// original text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumeralError {
    #[error("invalid character '{ch}' in Hebrew numeral '{input}'")]
    InvalidNumeralCharacter { ch: char, input: String },
    #[error("Hebrew numeral '{0}' is too large")]
    NumeralOverflow(String),
    #[error("locator '{0}' is not in chapter:paragraph form")]
    MalformedLocator(String),
    #[error("'{0}' is not in range notation (A-B:C)")]
    MalformedRangeNotation(String),
}
