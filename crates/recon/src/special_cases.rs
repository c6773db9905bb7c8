use std::collections::HashMap;

use crate::error::ReconError;
use crate::locator::Locator;

/// Curated overrides: an exact raw string mapped to the locators it stands for.
///
/// Entries are trusted as-is and take precedence over pattern matching.
#[derive(Debug, Clone, Default)]
pub struct SpecialCases {
    entries: HashMap<String, Vec<Locator>>,
}

impl SpecialCases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of `"raw": ["locator", ...]`.
    pub fn from_json(input: &str) -> Result<Self, ReconError> {
        let raw: HashMap<String, Vec<String>> =
            serde_json::from_str(input).map_err(|e| ReconError::SpecialCases(e.to_string()))?;

        let mut entries = HashMap::with_capacity(raw.len());
        for (key, locators) in raw {
            if key.trim().is_empty() {
                return Err(ReconError::SpecialCases(
                    "special case keys must not be empty".into(),
                ));
            }
            entries.insert(key, locators.into_iter().map(Locator::trusted).collect());
        }

        Ok(Self { entries })
    }

    pub fn insert<I, S>(&mut self, raw: impl Into<String>, locators: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(
            raw.into(),
            locators.into_iter().map(Locator::trusted).collect(),
        );
    }

    pub fn get(&self, raw: &str) -> Option<&[Locator]> {
        self.entries.get(raw).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
