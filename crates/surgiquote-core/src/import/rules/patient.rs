//! Patient contact and identification fields.

use super::patterns::{PATIENT_AGE, PATIENT_EMAIL, PATIENT_ID, PATIENT_PHONE};
use super::{ExtractionMatch, first_match};

/// Minimum digits for a value to count as a phone number.
const MIN_PHONE_DIGITS: usize = 10;

/// Extract a patient identifier.
///
/// Label words such as "Paciente" are often followed by a name instead of
/// an identifier, so a candidate without any digit is rejected.
pub fn extract_patient_id(text: &str) -> Option<ExtractionMatch<String>> {
    first_match(&PATIENT_ID, text, |caps| {
        let id = caps.get(1)?.as_str().trim();
        id.chars()
            .any(|c| c.is_ascii_digit())
            .then(|| id.to_string())
    })
}

/// Extract the patient's age in years.
pub fn extract_patient_age(text: &str) -> Option<ExtractionMatch<u32>> {
    first_match(&PATIENT_AGE, text, |caps| caps.get(1)?.as_str().parse().ok())
}

/// Extract a phone number, kept as written.
pub fn extract_patient_phone(text: &str) -> Option<ExtractionMatch<String>> {
    first_match(&PATIENT_PHONE, text, |caps| {
        let phone = caps.get(1)?.as_str();
        let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
        (digits >= MIN_PHONE_DIGITS).then(|| phone.trim().to_string())
    })
}

/// Extract an email address.
pub fn extract_patient_email(text: &str) -> Option<ExtractionMatch<String>> {
    first_match(&PATIENT_EMAIL, text, |caps| {
        Some(caps.get(1)?.as_str().trim().to_string())
    })
}
