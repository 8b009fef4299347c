use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use surgiquote_core::pdf::fixtures::single_page_pdf;
use tempfile::TempDir;

const QUOTE_TEXT: &str = "Paciente: EXP-2024-001\nEdad: 34 años\n\
Procedimiento: Apendicectomía laparoscópica. Duración: 2 horas\n\
Cirujano: Dr. Esteban Ríos\nTotal: $10,000\n";

fn surgiquote(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("surgiquote").unwrap();
    cmd.env_remove("SURGIQUOTE_DB").arg("--database").arg(db);
    cmd
}

fn quote_payload(dir: &TempDir, procedure: &str) -> std::path::PathBuf {
    let path = dir.path().join(format!("{}.json", procedure.replace(' ', "_")));
    let payload = serde_json::json!({
        "procedure_name": procedure,
        "surgeon_name": "Dra. Ana Pérez",
        "surgery_duration_hours": 3,
        "anesthesia_type": "Anestesia General",
        "facility_fee": 9000,
        "equipment_costs": 3000,
        "created_by": "Recepción"
    });
    fs::write(&path, payload.to_string()).unwrap();
    path
}

#[test]
fn test_extract_text_file_as_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("cotizacion.txt");
    fs::write(&input, QUOTE_TEXT).unwrap();

    surgiquote(&dir.path().join("quotes.db"))
        .arg("extract")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\"procedure_name\": \"Apendicectomía laparoscópica\"",
        ))
        .stdout(predicate::str::contains("\"surgery_duration_hours\": 2"))
        .stdout(predicate::str::contains("\"patient_age\": 34"));
}

#[test]
fn test_extract_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("cotizacion.docx");
    fs::write(&input, QUOTE_TEXT).unwrap();

    surgiquote(&dir.path().join("quotes.db"))
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn test_quotes_list_empty_database() {
    let dir = TempDir::new().unwrap();

    surgiquote(&dir.path().join("quotes.db"))
        .args(["quotes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No quotes found."));
}

#[test]
fn test_quotes_create_then_list_and_procedures() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("quotes.db");
    let payload = quote_payload(&dir, "Rinoplastia");

    surgiquote(&db)
        .args(["quotes", "create"])
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quote"));

    surgiquote(&db)
        .args(["quotes", "list", "--procedure", "rino"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rinoplastia"))
        .stdout(predicate::str::contains("12000"));

    surgiquote(&db)
        .args(["quotes", "list", "--surgeon", "luis"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No quotes found."));

    surgiquote(&db)
        .args(["quotes", "procedures"])
        .assert()
        .success()
        .stdout("Rinoplastia\n");

    surgiquote(&db)
        .args(["quotes", "surgeons"])
        .assert()
        .success()
        .stdout("Dra. Ana Pérez\n");
}

#[test]
fn test_quotes_show_unknown_id_fails() {
    let dir = TempDir::new().unwrap();

    surgiquote(&dir.path().join("quotes.db"))
        .args(["quotes", "show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Quote not found: missing"));
}

#[test]
fn test_report_pricing_and_dashboard() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("quotes.db");
    let payload = quote_payload(&dir, "Bypass gástrico");

    surgiquote(&db)
        .args(["quotes", "create"])
        .arg(&payload)
        .assert()
        .success();

    surgiquote(&db)
        .args(["report", "pricing", "bypass"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pricing for \"bypass\" (1 quotes)"));

    surgiquote(&db)
        .args(["report", "dashboard", "--format", "csv"])
        .assert()
        .success()
        .stdout("procedure_name,count\nBypass gástrico,1\n");
}

#[test]
fn test_import_rejects_non_pdf() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("cotizacion.txt");
    fs::write(&input, QUOTE_TEXT).unwrap();

    surgiquote(&dir.path().join("quotes.db"))
        .arg("import")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Only PDF files can be imported"));
}

#[test]
fn test_import_unreadable_pdf_reports_no_text() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("quotes.db");
    let input = dir.path().join("escaneo.pdf");
    fs::write(&input, b"%PDF-1.4 not really").unwrap();

    surgiquote(&db)
        .arg("import")
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("PDF vacío o no se pudo procesar"))
        .stderr(predicate::str::contains("No se pudo extraer texto del PDF"));

    surgiquote(&db)
        .args(["quotes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No quotes found."));
}

fn write_batch_inputs(dir: &TempDir) -> String {
    let pdf = single_page_pdf(
        "Procedimiento: Hernioplastia inguinal. Duration: 2 hours. Total: $9,000",
    );
    fs::write(dir.path().join("hernioplastia.pdf"), pdf).unwrap();
    fs::write(dir.path().join("broken.pdf"), b"%PDF-1.4 not really").unwrap();
    dir.path().join("*.pdf").to_str().unwrap().to_string()
}

#[test]
fn test_batch_continue_on_error_writes_summary() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("quotes.db");
    let pattern = write_batch_inputs(&dir);
    let summary = dir.path().join("summary.csv");

    surgiquote(&db)
        .args(["batch", &pattern, "--continue-on-error", "--summary"])
        .arg(&summary)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files to import"));

    let csv = fs::read_to_string(&summary).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("filename,status,quote_id,procedure_name"));
    assert!(lines[1].starts_with("broken.pdf,error,,"));
    assert!(lines[1].ends_with("PDF vacío o no se pudo procesar"));
    assert!(lines[2].starts_with("hernioplastia.pdf,success,"));
    assert!(lines[2].contains(",Hernioplastia inguinal,"));

    surgiquote(&db)
        .args(["quotes", "procedures"])
        .assert()
        .success()
        .stdout("Hernioplastia inguinal\n");
}

#[test]
fn test_batch_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("quotes.db");
    let pattern = write_batch_inputs(&dir);

    surgiquote(&db)
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Import failed for"));

    surgiquote(&db)
        .args(["quotes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No quotes found."));
}

#[test]
fn test_config_init_get_set_and_path() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("quotes.db");
    let config = dir.path().join("config.json");
    let config_arg = config.to_str().unwrap();

    surgiquote(&db)
        .args(["config", "path", "-c", config_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));

    surgiquote(&db)
        .args(["config", "init", "-c", config_arg])
        .assert()
        .success();
    assert!(config.exists());

    surgiquote(&db)
        .args(["config", "init", "-c", config_arg])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    surgiquote(&db)
        .args(["config", "set", "extraction.default_anesthesia_type", "Sedación", "-c", config_arg])
        .assert()
        .success();

    surgiquote(&db)
        .args(["config", "get", "extraction.default_anesthesia_type", "-c", config_arg])
        .assert()
        .success()
        .stdout("\"Sedación\"\n");

    surgiquote(&db)
        .args(["config", "get", "pdf.min_text_length", "-c", config_arg])
        .assert()
        .success()
        .stdout("1\n");
}
