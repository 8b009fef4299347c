//! Procedure, surgeon and surgery detail fields.

use super::patterns::{ANESTHESIA_TYPE, PROCEDURE_NAME, SURGEON_NAME, SURGERY_DURATION};
use super::{ExtractionMatch, FieldExtractor, first_match, truncate_chars, value_or_whole};

/// Procedure name extractor.
pub struct ProcedureExtractor {
    min_len: usize,
    max_len: usize,
}

impl ProcedureExtractor {
    pub fn new() -> Self {
        Self {
            min_len: 5,
            max_len: 80,
        }
    }
}

impl Default for ProcedureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ProcedureExtractor {
    type Output = String;

    fn field(&self) -> &'static str {
        "procedure_name"
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<String>> {
        first_match(&PROCEDURE_NAME, text, |caps| {
            // A labeled capture runs on into the next sentence.
            let raw = value_or_whole(caps);
            let name = raw.split(['.', ';']).next().unwrap_or_default().trim();

            (name.chars().count() > self.min_len).then(|| truncate_chars(name, self.max_len))
        })
    }
}

/// Surgeon name extractor.
pub struct SurgeonExtractor {
    min_len: usize,
    max_len: usize,
}

impl SurgeonExtractor {
    pub fn new() -> Self {
        Self {
            min_len: 3,
            max_len: 40,
        }
    }
}

impl Default for SurgeonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for SurgeonExtractor {
    type Output = String;

    fn field(&self) -> &'static str {
        "surgeon_name"
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<String>> {
        first_match(&SURGEON_NAME, text, |caps| {
            let name = caps.get(1)?.as_str().trim();
            (name.chars().count() > self.min_len).then(|| truncate_chars(name, self.max_len))
        })
    }
}

/// Surgery duration extractor, in whole hours.
pub struct DurationExtractor {
    min_hours: u32,
    max_hours: u32,
}

impl DurationExtractor {
    pub fn new() -> Self {
        Self {
            min_hours: 1,
            max_hours: 24,
        }
    }
}

impl Default for DurationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DurationExtractor {
    type Output = u32;

    fn field(&self) -> &'static str {
        "surgery_duration_hours"
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<u32>> {
        first_match(&SURGERY_DURATION, text, |caps| {
            let hours: u32 = caps.get(1)?.as_str().parse().ok()?;
            (self.min_hours..=self.max_hours)
                .contains(&hours)
                .then_some(hours)
        })
    }
}

/// Extract the anesthesia type phrase verbatim.
pub fn extract_anesthesia_type(text: &str) -> Option<ExtractionMatch<String>> {
    first_match(&ANESTHESIA_TYPE, text, |caps| {
        Some(caps.get(0)?.as_str().trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labeled_procedure_is_cut_at_sentence_end() {
        let text = "Procedimiento: Apendicectomía laparoscópica. Duración: 2 horas.";
        let found = ProcedureExtractor::new().extract(text).unwrap();
        assert_eq!(found.value, "Apendicectomía laparoscópica");
        assert_eq!(found.pattern, 0);
    }

    #[test]
    fn test_keyword_procedure() {
        let found = ProcedureExtractor::new()
            .extract("Se programa reemplazo total de cadera izquierda")
            .unwrap();
        assert_eq!(found.value, "reemplazo total de cadera izquierda");
        assert_eq!(found.pattern, 1);
    }

    #[test]
    fn test_procedure_is_capped() {
        let text = format!("Artroscopia {}", "x".repeat(120));
        let found = ProcedureExtractor::new().extract(&text).unwrap();
        assert_eq!(found.value.chars().count(), 80);
    }

    #[test]
    fn test_extract_surgeon() {
        let found = SurgeonExtractor::new()
            .extract("Cirujano: Dra. María Fernández, Cardiología 5")
            .unwrap();
        assert_eq!(found.value, "María Fernández");
    }

    #[test]
    fn test_duration_labeled() {
        let found = DurationExtractor::new().extract("Duración: 3 horas").unwrap();
        assert_eq!(found.value, 3);
    }

    #[test]
    fn test_duration_out_of_range_is_rejected() {
        assert!(DurationExtractor::new().extract("duración: 30 horas").is_none());
    }

    #[test]
    fn test_duration_falls_through_to_later_pattern() {
        let text = "Tiempo: 48 hrs de preparación, 4 horas de cirugía";
        let found = DurationExtractor::new().extract(text).unwrap();
        assert_eq!(found.value, 4);
        assert_eq!(found.pattern, 1);
    }

    #[test]
    fn test_extract_anesthesia_type() {
        assert_eq!(
            extract_anesthesia_type("bajo anestesia general balanceada").unwrap().value,
            "anestesia general"
        );
        assert_eq!(
            extract_anesthesia_type("Bloqueo epidural lumbar").unwrap().value,
            "Bloqueo epidural"
        );
        assert!(extract_anesthesia_type("sin datos").is_none());
    }
}
