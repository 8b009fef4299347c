//! Hospital stay detection.

use serde::{Deserialize, Serialize};

use super::patterns::HOSPITAL_STAY;
use super::{ExtractionMatch, first_match};

/// Outcome of hospital stay detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "nights")]
pub enum HospitalStay {
    /// Explicitly marked ambulatory/outpatient.
    Ambulatory,
    /// A nights count was stated.
    Nights(u32),
    /// Nothing in the text says either way.
    #[default]
    Undetermined,
}

impl HospitalStay {
    pub fn is_ambulatory(&self) -> bool {
        match self {
            HospitalStay::Ambulatory | HospitalStay::Undetermined => true,
            HospitalStay::Nights(n) => *n == 0,
        }
    }

    pub fn nights(&self) -> u32 {
        match self {
            HospitalStay::Nights(n) => *n,
            _ => 0,
        }
    }
}

/// Detect the hospital stay described in `text`.
///
/// The ambulatory marker comes first in the catalog, so it wins over any
/// nights count found in the same text.
pub fn detect_hospital_stay(text: &str) -> Option<ExtractionMatch<HospitalStay>> {
    first_match(&HOSPITAL_STAY, text, |caps| match caps.get(1) {
        None => Some(HospitalStay::Ambulatory),
        Some(nights) => nights.as_str().parse().ok().map(HospitalStay::Nights),
    })
}
