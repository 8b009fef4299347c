//! Pattern catalogs for surgical quote extraction.
//!
//! The order inside each list is part of the contract: patterns are tried
//! top to bottom and the first acceptable match wins.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Patient identification
    pub static ref PATIENT_ID: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:paciente|patient|id|expediente|número)[\s:]*([A-Z0-9\-]+)").unwrap(),
        Regex::new(r"(?i)ID[\s:]*([A-Z0-9\-]+)").unwrap(),
        Regex::new(r"(?i)No\.?\s*([A-Z0-9\-]+)").unwrap(),
    ];

    pub static ref PATIENT_AGE: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:edad|age|años)[\s:]*(\d{1,3})").unwrap(),
        Regex::new(r"(?i)(\d{1,3})\s*(?:años|years old)").unwrap(),
    ];

    pub static ref PATIENT_PHONE: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:teléfono|telefono|phone|tel)[\s:]*([0-9\-\s()]+)").unwrap(),
        Regex::new(r"(\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4})").unwrap(),
    ];

    pub static ref PATIENT_EMAIL: Vec<Regex> = vec![
        Regex::new(r"([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})").unwrap(),
    ];

    // Procedure and surgeon
    pub static ref PROCEDURE_NAME: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:procedimiento|procedure|cirugía|surgery|operación)[\s:]*([^$\d\n]{10,80})").unwrap(),
        Regex::new(r"(?i)(?:reemplazo|replacement|bypass|apendicectomía|appendectomy)[\s\w]*").unwrap(),
        Regex::new(r"(?i)(?:artroscopia|laparoscopia|endoscopia)[\s\w]*").unwrap(),
    ];

    pub static ref SURGEON_NAME: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:dr\.?|doctor|dra\.?|doctora|cirujano|surgeon)\s*([A-Za-záéíóúñÁÉÍÓÚÑ\s]{5,40})").unwrap(),
        Regex::new(r"(?i)médico[\s:]*([A-Za-záéíóúñÁÉÍÓÚÑ\s]{5,40})").unwrap(),
    ];

    // Surgery details
    pub static ref SURGERY_DURATION: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:duración|duration|tiempo)[\s:]*(\d+)\s*(?:horas?|hours?|hrs?)").unwrap(),
        Regex::new(r"(?i)(\d+)\s*(?:horas?|hours?|hrs?)\s*(?:de\s*)?(?:cirugía|surgery|operación)").unwrap(),
        Regex::new(r"(?i)(?:cirugía|surgery)\s*(?:de\s*)?(\d+)\s*(?:horas?|hours?|hrs?)").unwrap(),
    ];

    pub static ref ANESTHESIA_TYPE: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:anestesia|anesthesia)\s*(?:general|epidural|regional|local|sedación)").unwrap(),
        Regex::new(r"(?i)(?:bloqueo|block)\s*(?:epidural|regional)").unwrap(),
        Regex::new(r"(?i)(?:sedación|sedation)\s*(?:básica|basic)?").unwrap(),
    ];

    // Cost components (amounts in pesos, `$` and thousands `,` allowed)
    pub static ref FACILITY_FEE: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:instalaciones|facilities|hospital)[\s:$]*(\$?[\d,]+\.?\d*)").unwrap(),
        Regex::new(r"(?i)(?:costo.*hospital)[\s:$]*(\$?[\d,]+\.?\d*)").unwrap(),
    ];

    pub static ref EQUIPMENT_COSTS: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:equipos|equipment|instrumental)[\s:$]*(\$?[\d,]+\.?\d*)").unwrap(),
        Regex::new(r"(?i)(?:materiales|supplies)[\s:$]*(\$?[\d,]+\.?\d*)").unwrap(),
    ];

    pub static ref ANESTHESIA_FEE: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:anestesia|anesthesia)[\s:$]*(\$?[\d,]+\.?\d*)").unwrap(),
    ];

    pub static ref TOTAL_COST: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:total|costo total|total cost)[\s:$]*(\$?[\d,]+\.?\d*)").unwrap(),
        Regex::new(r"(?i)(?:suma|amount)[\s:$]*(\$?[\d,]+\.?\d*)").unwrap(),
    ];

    // Hospital stay: the ambulatory marker is listed first so it overrides
    // any nights count in the same text.
    pub static ref HOSPITAL_STAY: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:ambulatori[ao]|outpatient)").unwrap(),
        Regex::new(r"(?i)(\d+)\s*(?:noches?|nights?|días?|days?)\s*(?:hospitalización|hospital)").unwrap(),
        Regex::new(r"(?i)(?:hospitalización|hospital)[\s:]*(\d+)\s*(?:noches?|días?)").unwrap(),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(PATIENT_ID.len(), 3);
        assert_eq!(PROCEDURE_NAME.len(), 3);
        assert_eq!(SURGERY_DURATION.len(), 3);
        assert_eq!(HOSPITAL_STAY.len(), 3);
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        assert!(ANESTHESIA_TYPE[0].is_match("ANESTESIA GENERAL"));
        assert!(SURGERY_DURATION[0].is_match("DURACIÓN: 3 HORAS"));
        assert!(TOTAL_COST[0].is_match("TOTAL: $1,000"));
    }
}
