//! Canonical `chapter:paragraph` citation keys.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `^[Hebrew]+:[Hebrew]+`
static PLAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\x{0590}-\x{05FF}]+:[\x{0590}-\x{05FF}]+").expect("plain locator pattern")
});

/// `^[Hebrew]-[Hebrew]+:[Hebrew]+` (aleph-minus range prefix)
static PREFIXED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\x{0590}-\x{05FF}]-[\x{0590}-\x{05FF}]+:[\x{0590}-\x{05FF}]+")
        .expect("prefixed locator pattern")
});

/// A validated join key. Only produced by the normalizer or by a trusted
/// special-case entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    /// Wrap a string that is trusted without validation (special cases).
    pub(crate) fn trusted(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Validate `text` as a plain or prefixed-range locator.
    pub fn parse(text: &str, rule: PrefixRule) -> Option<Self> {
        if is_plain(text) || rule.matches(text) {
            Some(Self(text.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn is_plain(text: &str) -> bool {
    PLAIN.is_match(text)
}

/// How a locator with an aleph-minus prefix (`א-א:ג`) is validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixRule {
    /// The whole text must match `^[Hebrew]-[Hebrew]+:[Hebrew]+`.
    #[default]
    Whole,
    /// A hyphen must follow the first character, and the text after it must
    /// match the plain pattern.
    Suffix,
}

impl PrefixRule {
    pub fn matches(self, text: &str) -> bool {
        match self {
            Self::Whole => PREFIXED.is_match(text),
            Self::Suffix => {
                let mut chars = text.chars();
                chars.next().is_some() && chars.next() == Some('-') && is_plain(chars.as_str())
            }
        }
    }
}

impl std::fmt::Display for PrefixRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Whole => write!(f, "whole"),
            Self::Suffix => write!(f, "suffix"),
        }
    }
}

impl std::str::FromStr for PrefixRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whole" => Ok(Self::Whole),
            "suffix" => Ok(Self::Suffix),
            other => Err(format!("unknown prefix rule \"{other}\" (expected \"whole\" or \"suffix\")")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_pattern() {
        assert!(is_plain("א:צז"));
        assert!(is_plain("קכה:רמט"));
        assert!(!is_plain("א-א:ג"));
        assert!(!is_plain(":א"));
        assert!(!is_plain("1:2"));
        assert!(!is_plain("בסוף"));
    }

    #[test]
    fn parse_accepts_both_shapes() {
        assert_eq!(Locator::parse("ב:ג", PrefixRule::Whole).unwrap().as_str(), "ב:ג");
        assert_eq!(
            Locator::parse("א-א:רמט", PrefixRule::Whole).unwrap().as_str(),
            "א-א:רמט"
        );
        assert!(Locator::parse("א-", PrefixRule::Whole).is_none());
        assert!(Locator::parse("abc", PrefixRule::Whole).is_none());
    }

    #[test]
    fn suffix_rule_only_checks_after_prefix() {
        assert!(PrefixRule::Suffix.matches("א-א:ג"));
        assert!(!PrefixRule::Suffix.matches("אב-א:ג"));
        assert!(!PrefixRule::Suffix.matches("א-"));
        // The suffix rule accepts a non-Hebrew prefix letter; the whole rule does not.
        assert!(PrefixRule::Suffix.matches("x-א:ג"));
        assert!(!PrefixRule::Whole.matches("x-א:ג"));
    }

    #[test]
    fn prefix_rule_from_str() {
        assert_eq!("whole".parse::<PrefixRule>().unwrap(), PrefixRule::Whole);
        assert_eq!("suffix".parse::<PrefixRule>().unwrap(), PrefixRule::Suffix);
        assert!("other".parse::<PrefixRule>().is_err());
    }
}
