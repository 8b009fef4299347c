//! Keyword-presence fields.

use crate::models::config::ExtractionConfig;

/// Medication terms recognized out of the box.
pub const DEFAULT_MEDICATION_TERMS: &[&str] = &[
    "antibiótico",
    "analgésico",
    "antiinflamatorio",
    "medicamento",
    "fármaco",
];

/// Equipment terms recognized out of the box.
pub const DEFAULT_EQUIPMENT_TERMS: &[&str] = &[
    "prótesis",
    "implante",
    "stent",
    "marcapasos",
    "dispositivo",
    "laparoscopia",
    "artroscopia",
];

/// Term lists searched for by presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordVocabulary {
    pub medications: Vec<String>,
    pub equipment: Vec<String>,
}

impl KeywordVocabulary {
    pub fn new(medications: Vec<String>, equipment: Vec<String>) -> Self {
        Self {
            medications,
            equipment,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.medication_terms.clone(), config.equipment_terms.clone())
    }
}

impl Default for KeywordVocabulary {
    fn default() -> Self {
        Self::new(
            DEFAULT_MEDICATION_TERMS.iter().map(|t| t.to_string()).collect(),
            DEFAULT_EQUIPMENT_TERMS.iter().map(|t| t.to_string()).collect(),
        )
    }
}

/// Title-cased form of every term present in `text`.
///
/// Results follow vocabulary order, not text order, and each term is
/// reported at most once.
pub fn match_keywords<S: AsRef<str>>(text: &str, terms: &[S]) -> Vec<String> {
    let haystack = text.to_lowercase();
    let mut found: Vec<String> = Vec::new();

    for term in terms {
        let needle = term.as_ref().trim().to_lowercase();
        if needle.is_empty() || !haystack.contains(&needle) {
            continue;
        }

        let item = title_case(&needle);
        if !found.contains(&item) {
            found.push(item);
        }
    }

    found
}

/// Uppercase the first letter of every word, lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;

    for c in s.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }

    out
}
