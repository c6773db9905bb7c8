//! Hebrew alphabetic numerals and the numeric sort key derived from a locator.

use serde::Serialize;

use crate::error::NumeralError;

/// Multiplies the running total by 1000 (the accumulated prefix is thousands).
const THOUSANDS_SEPARATOR: char = '\'';

/// Editorial marker some catalogs append to a key; never part of the locator.
const TRAILING_MARKER: &str = ".ץץ";

fn letter_value(ch: char) -> Option<u32> {
    let value = match ch {
        'א' => 1,
        'ב' => 2,
        'ג' => 3,
        'ד' => 4,
        'ה' => 5,
        'ו' => 6,
        'ז' => 7,
        'ח' => 8,
        'ט' => 9,
        'י' => 10,
        'כ' => 20,
        'ל' => 30,
        'מ' => 40,
        'נ' => 50,
        'ס' => 60,
        'ע' => 70,
        'פ' => 80,
        'צ' => 90,
        'ק' => 100,
        'ר' => 200,
        'ש' => 300,
        'ת' => 400,
        _ => return None,
    };
    Some(value)
}

fn is_ignored(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '.' | '?' | '-' | ',' | 'ץ')
}

/// Convert a Hebrew numeral to its integer value.
///
/// `"תתמד"` is 844, `"א' קכה"` is 1125.
pub fn hebrew_to_integer(numeral: &str) -> Result<u64, NumeralError> {
    let mut total: u64 = 0;
    for ch in numeral.chars() {
        let overflow = || NumeralError::NumeralOverflow(numeral.to_string());
        if let Some(value) = letter_value(ch) {
            total = total.checked_add(u64::from(value)).ok_or_else(overflow)?;
        } else if ch == THOUSANDS_SEPARATOR {
            total = total.checked_mul(1000).ok_or_else(overflow)?;
        } else if is_ignored(ch) {
            continue;
        } else {
            return Err(NumeralError::InvalidNumeralCharacter {
                ch,
                input: numeral.to_string(),
            });
        }
    }
    Ok(total)
}

/// Sort key for a locator: either a resolved number or the text that
/// could not be converted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NumericKey {
    Numeric(f64),
    Unparsed(String),
}

impl NumericKey {
    /// Unparsed keys sort after every resolved key.
    pub fn sort_value(&self) -> f64 {
        match self {
            Self::Numeric(v) => *v,
            Self::Unparsed(_) => f64::INFINITY,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }
}

impl std::fmt::Display for NumericKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Unparsed(_) => write!(f, "inf"),
        }
    }
}

/// `chapter + paragraph / 10000`, rounded to four places.
pub fn try_locator_to_numeric(locator: &str) -> Result<f64, NumeralError> {
    let parts: Vec<&str> = locator.split(':').collect();
    if parts.len() != 2 {
        return Err(NumeralError::MalformedLocator(locator.to_string()));
    }
    let chapter = hebrew_to_integer(parts[0])? as f64;
    let paragraph = hebrew_to_integer(parts[1])? as f64;
    Ok(((chapter + paragraph / 10000.0) * 10000.0).round() / 10000.0)
}

/// Like [`try_locator_to_numeric`], but conversion failures are logged and
/// the original text is kept.
pub fn locator_to_numeric(locator: &str) -> NumericKey {
    match try_locator_to_numeric(locator) {
        Ok(value) => NumericKey::Numeric(value),
        Err(e) => {
            log::warn!("{e} Input was: {locator}");
            NumericKey::Unparsed(locator.to_string())
        }
    }
}

/// Rewrite `A-B:C` as `A:B' C`, reading the range prefix as the chapter and
/// the middle group as the thousands of the paragraph.
pub fn rewrite_range_notation(text: &str) -> Result<String, NumeralError> {
    let malformed = || NumeralError::MalformedRangeNotation(text.to_string());
    if !text.contains('-') || !text.contains(':') {
        return Err(malformed());
    }
    let (first, remaining) = text.split_once('-').ok_or_else(malformed)?;
    let (second, third) = remaining.split_once(':').ok_or_else(malformed)?;
    Ok(format!("{first}:{second}{THOUSANDS_SEPARATOR} {third}"))
}

/// The form a locator is shown and sorted under in the exported index:
/// `.ץץ` markers removed, range notation rewritten.
pub fn display_key(locator: &str) -> String {
    let key = locator.replace(TRAILING_MARKER, "");
    if !(key.contains('-') && key.contains(':')) {
        return key;
    }
    match rewrite_range_notation(&key) {
        Ok(rewritten) => rewritten,
        Err(e) => {
            log::warn!("{e} Input was: {key}");
            key
        }
    }
}
