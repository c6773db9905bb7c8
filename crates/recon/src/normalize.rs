//! Raw key cell → zero or more canonical locators.
//!
//! A cell is run through [`CELL_RULES`] and each of its fragments through
//! [`FRAGMENT_RULES`]; in both lists the first rule that applies wins.
//! Special cases precede structural matches, which precede rejection.

use std::ops::AddAssign;

use serde::Serialize;

use crate::locator::{is_plain, Locator, PrefixRule};
use crate::special_cases::SpecialCases;

// ---------------------------------------------------------------------------
// Key log
// ---------------------------------------------------------------------------

/// Per-category event counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HandlerCounts {
    pub nan_key: usize,
    pub special_key: usize,
    pub paren_key: usize,
    pub repeated_key: usize,
    pub minus_key: usize,
    pub invalid_key: usize,
}

impl HandlerCounts {
    pub fn entries(&self) -> [(&'static str, usize); 6] {
        [
            ("nan_key", self.nan_key),
            ("special_key", self.special_key),
            ("paren_key", self.paren_key),
            ("repeated_key", self.repeated_key),
            ("minus_key", self.minus_key),
            ("invalid_key", self.invalid_key),
        ]
    }
}

impl AddAssign for HandlerCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.nan_key += rhs.nan_key;
        self.special_key += rhs.special_key;
        self.paren_key += rhs.paren_key;
        self.repeated_key += rhs.repeated_key;
        self.minus_key += rhs.minus_key;
        self.invalid_key += rhs.invalid_key;
    }
}

/// Accumulates the unmatched fragments and handler counts of a normalization
/// pass. One log per source; merged into the run log afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyLog {
    pub unmatched: Vec<String>,
    pub counts: HandlerCounts,
}

impl KeyLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append another log, keeping its fragments after ours.
    pub fn merge(&mut self, other: KeyLog) {
        self.unmatched.extend(other.unmatched);
        self.counts += other.counts;
    }

    fn reject(&mut self, source: &str, fragment: &str, reason: Rejection) {
        match reason {
            Rejection::AmbiguousRange => {
                log::warn!("Ambiguous range key found in source '{source}': {fragment}");
                self.counts.minus_key += 1;
            }
            Rejection::Invalid => {
                log::warn!("Invalid key found in source '{source}': {fragment}");
                self.counts.invalid_key += 1;
            }
        }
        self.unmatched.push(fragment.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    AmbiguousRange,
    Invalid,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Whole-cell rules, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRule {
    /// Missing or blank → nothing.
    Empty,
    /// Exact special-case match → its mapped locators, unvalidated.
    SpecialCase,
    /// After bracket stripping, a hyphen joins locators on both sides.
    AmbiguousRange,
    /// Split into fragments and classify each one.
    Fragments,
}

pub const CELL_RULES: [CellRule; 4] = [
    CellRule::Empty,
    CellRule::SpecialCase,
    CellRule::AmbiguousRange,
    CellRule::Fragments,
];

/// Per-fragment rules, in precedence order. A fragment no rule accepts is
/// rejected as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentRule {
    SpecialCase,
    AmbiguousRange,
    PlainLocator,
    PrefixedRange,
}

pub const FRAGMENT_RULES: [FragmentRule; 4] = [
    FragmentRule::SpecialCase,
    FragmentRule::AmbiguousRange,
    FragmentRule::PlainLocator,
    FragmentRule::PrefixedRange,
];

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == '+'
}

fn is_bracket(ch: char) -> bool {
    matches!(ch, '(' | ')' | '[' | ']')
}

/// Every hyphen-delimited part is, on its own, a single plain locator.
fn is_ambiguous_range(text: &str) -> bool {
    text.contains('-')
        && text.split('-').all(|part| {
            let part = part.trim();
            !part.is_empty() && !part.contains(is_separator) && is_plain(part)
        })
}

/// A cell as seen by [`CELL_RULES`]. Bracket stripping happens on first use.
struct Cell<'r> {
    raw: &'r str,
    stripped: Option<String>,
}

impl Cell<'_> {
    fn stripped(&mut self, source: &str, log: &mut KeyLog) -> &str {
        let raw = self.raw;
        self.stripped.get_or_insert_with(|| {
            if raw.contains(is_bracket) {
                log::debug!("Paren key found in source '{source}': {raw}");
                log.counts.paren_key += 1;
                raw.replace(is_bracket, "")
            } else {
                raw.to_string()
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

pub struct Normalizer<'a> {
    special_cases: &'a SpecialCases,
    prefix_rule: PrefixRule,
}

impl<'a> Normalizer<'a> {
    pub fn new(special_cases: &'a SpecialCases, prefix_rule: PrefixRule) -> Self {
        Self {
            special_cases,
            prefix_rule,
        }
    }

    /// Normalize one raw key cell. `source` only labels log output.
    pub fn normalize(&self, source: &str, raw: Option<&str>, log: &mut KeyLog) -> Vec<Locator> {
        let mut cell = Cell {
            raw: raw.unwrap_or(""),
            stripped: None,
        };
        for rule in CELL_RULES {
            if let Some(locators) = self.apply_cell_rule(rule, source, &mut cell, log) {
                return locators;
            }
        }
        Vec::new()
    }

    /// The rule that decides `fragment`, or `None` if it would be rejected
    /// as invalid.
    pub fn fragment_rule_for(&self, fragment: &str) -> Option<FragmentRule> {
        FRAGMENT_RULES
            .into_iter()
            .find(|rule| self.fragment_rule_applies(*rule, fragment))
    }

    fn apply_cell_rule(
        &self,
        rule: CellRule,
        source: &str,
        cell: &mut Cell<'_>,
        log: &mut KeyLog,
    ) -> Option<Vec<Locator>> {
        match rule {
            CellRule::Empty => {
                if !cell.raw.trim().is_empty() {
                    return None;
                }
                log.counts.nan_key += 1;
                Some(Vec::new())
            }
            CellRule::SpecialCase => {
                let locators = self.special_cases.get(cell.raw)?;
                log::debug!("Special case key in source '{source}': {}", cell.raw);
                log.counts.special_key += 1;
                Some(locators.to_vec())
            }
            CellRule::AmbiguousRange => {
                let text = cell.stripped(source, log).trim();
                if !is_ambiguous_range(text) {
                    return None;
                }
                let text = text.to_string();
                log.reject(source, &text, Rejection::AmbiguousRange);
                Some(Vec::new())
            }
            CellRule::Fragments => {
                let text = cell.stripped(source, log).to_string();
                Some(self.normalize_fragments(source, &text, log))
            }
        }
    }

    fn normalize_fragments(&self, source: &str, text: &str, log: &mut KeyLog) -> Vec<Locator> {
        let fragments: Vec<&str> = text
            .split(is_separator)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();

        if fragments.len() > 1 {
            log::debug!("Repeated key found in source '{source}': {text}");
            log.counts.repeated_key += 1;
        }

        let mut locators = Vec::new();
        for fragment in fragments {
            match self.fragment_rule_for(fragment) {
                Some(FragmentRule::SpecialCase) => {
                    log.counts.special_key += 1;
                    if let Some(mapped) = self.special_cases.get(fragment) {
                        locators.extend_from_slice(mapped);
                    }
                }
                Some(FragmentRule::AmbiguousRange) => {
                    log.reject(source, fragment, Rejection::AmbiguousRange);
                }
                Some(FragmentRule::PlainLocator | FragmentRule::PrefixedRange) => {
                    locators.push(Locator::trusted(fragment));
                }
                None => log.reject(source, fragment, Rejection::Invalid),
            }
        }
        locators
    }

    fn fragment_rule_applies(&self, rule: FragmentRule, fragment: &str) -> bool {
        match rule {
            FragmentRule::SpecialCase => self.special_cases.get(fragment).is_some(),
            FragmentRule::AmbiguousRange => is_ambiguous_range(fragment),
            FragmentRule::PlainLocator => is_plain(fragment),
            FragmentRule::PrefixedRange => self.prefix_rule.matches(fragment),
        }
    }
}
