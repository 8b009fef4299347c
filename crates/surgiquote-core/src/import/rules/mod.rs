//! Rule-based field extractors for surgical quote documents.
//!
//! Each field owns an ordered list of patterns. Patterns are tried strictly
//! in list order against the whole text; the first structural match whose
//! value passes the field's constraint wins.

pub mod costs;
pub mod keywords;
pub mod patient;
pub mod patterns;
pub mod procedure;
pub mod stay;

pub use costs::{CostExtractor, CostField, ExtractedCosts, extract_costs, parse_amount};
pub use keywords::{KeywordVocabulary, match_keywords, title_case};
pub use patient::{extract_patient_age, extract_patient_email, extract_patient_id, extract_patient_phone};
pub use procedure::{
    DurationExtractor, ProcedureExtractor, SurgeonExtractor, extract_anesthesia_type,
};
pub use stay::{HospitalStay, detect_hospital_stay};

use regex::{Captures, Regex};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Name of the draft field this extractor fills.
    fn field(&self) -> &'static str;

    /// Extract the field from normalized text.
    fn extract(&self, text: &str) -> Option<ExtractionMatch<Self::Output>>;
}

/// An accepted value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Index of the winning pattern in the field's catalog.
    pub pattern: usize,
    /// Source text that was matched.
    pub source: String,
    /// Byte span of the match in the searched text.
    pub position: Option<(usize, usize)>,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, pattern: usize, source: impl Into<String>) -> Self {
        Self {
            value,
            pattern,
            source: source.into(),
            position: None,
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    /// Keep the provenance, replace the value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            pattern: self.pattern,
            source: self.source,
            position: self.position,
        }
    }
}

/// Try `patterns` in order and return the first match `accept` keeps.
///
/// Only the first occurrence of each pattern is considered. A rejected
/// match moves on to the next pattern, never to a later occurrence of the
/// same one.
pub fn first_match<T>(
    patterns: &[Regex],
    text: &str,
    mut accept: impl FnMut(&Captures<'_>) -> Option<T>,
) -> Option<ExtractionMatch<T>> {
    for (index, pattern) in patterns.iter().enumerate() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };

        if let Some(value) = accept(&caps) {
            let whole = caps.get(0)?;
            return Some(
                ExtractionMatch::new(value, index, whole.as_str())
                    .with_position(whole.start(), whole.end()),
            );
        }
    }

    None
}

/// Group 1 when the pattern captured it, otherwise the whole match.
pub(crate) fn value_or_whole<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

/// Cut `value` to at most `max` characters.
pub(crate) fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_match_falls_through_rejected_pattern() {
        let patterns = vec![
            Regex::new(r"a(\d+)").unwrap(),
            Regex::new(r"b(\d+)").unwrap(),
        ];

        let found = first_match(&patterns, "a99 b7", |caps| {
            caps[1].parse::<u32>().ok().filter(|n| *n < 10)
        })
        .unwrap();

        assert_eq!(found.value, 7);
        assert_eq!(found.pattern, 1);
        assert_eq!(found.source, "b7");
        assert_eq!(found.position, Some((4, 6)));
    }

    #[test]
    fn test_first_match_does_not_retry_later_occurrence() {
        let patterns = vec![Regex::new(r"a(\d+)").unwrap()];

        let found = first_match(&patterns, "a99 a7", |caps| {
            caps[1].parse::<u32>().ok().filter(|n| *n < 10)
        });

        assert!(found.is_none());
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("áéíóú", 3), "áéí");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }
}
