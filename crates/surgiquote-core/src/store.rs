//! SQLite-backed quote storage.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::models::quote::{Quote, QuoteInput, QuoteStatus, SurgicalPackage};
use crate::models::report::ProcedureCount;

/// Maximum number of quotes returned by a listing.
pub const LIST_LIMIT: usize = 1000;

const QUOTE_COLUMNS: &str = "id, patient_id, patient_age, patient_phone, patient_email,
    procedure_name, procedure_code, procedure_description,
    surgeon_name, surgeon_specialty,
    surgery_duration_hours, anesthesia_type, additional_equipment, additional_materials,
    is_ambulatory, hospital_nights,
    facility_fee, equipment_costs, anesthesia_fee, other_costs, total_cost,
    surgical_package, created_at, created_by, status, notes";

/// Listing filter. Both terms are case-insensitive substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteFilter {
    pub procedure_name: Option<String>,
    pub surgeon_name: Option<String>,
    pub limit: Option<usize>,
}

impl Default for QuoteFilter {
    fn default() -> Self {
        Self {
            procedure_name: None,
            surgeon_name: None,
            limit: Some(LIST_LIMIT),
        }
    }
}

impl QuoteFilter {
    /// Every quote whose procedure contains `term`, without a cap.
    pub fn procedure(term: &str) -> Self {
        Self {
            procedure_name: Some(term.to_string()),
            surgeon_name: None,
            limit: None,
        }
    }

    fn matches(&self, quote: &Quote) -> bool {
        contains_ci(Some(quote.procedure_name.as_str()), self.procedure_name.as_deref())
            && contains_ci(quote.surgeon_name.as_deref(), self.surgeon_name.as_deref())
    }
}

/// Case-insensitive substring test; an absent or empty term matches anything.
fn contains_ci(value: Option<&str>, term: Option<&str>) -> bool {
    match term.map(str::trim).filter(|t| !t.is_empty()) {
        None => true,
        Some(term) => value
            .map(|v| v.to_lowercase().contains(&term.to_lowercase()))
            .unwrap_or(false),
    }
}

/// Quote store over a single SQLite connection.
pub struct QuoteStore {
    conn: Connection,
}

impl QuoteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> std::result::Result<Self, StoreError> {
        debug!("Opening quote database at {}", path.display());
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> std::result::Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> std::result::Result<Self, StoreError> {
        setup_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Validate and persist a new quote.
    pub fn create(&self, input: QuoteInput) -> Result<Quote> {
        input.validate()?;

        let created_at = Utc::now().trunc_subsecs(6);
        let quote = Quote::from_input(Uuid::new_v4().to_string(), created_at, input);

        let row = QuoteRow::encode(&quote)?;
        self.conn.execute(
            &format!(
                "INSERT INTO quotes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                 ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)",
                QUOTE_COLUMNS
            ),
            params![
                row.id,
                row.patient_id,
                row.patient_age,
                row.patient_phone,
                row.patient_email,
                row.procedure_name,
                row.procedure_code,
                row.procedure_description,
                row.surgeon_name,
                row.surgeon_specialty,
                row.surgery_duration_hours,
                row.anesthesia_type,
                row.additional_equipment,
                row.additional_materials,
                row.is_ambulatory,
                row.hospital_nights,
                row.facility_fee,
                row.equipment_costs,
                row.anesthesia_fee,
                row.other_costs,
                row.total_cost,
                row.surgical_package,
                row.created_at,
                row.created_by,
                row.status,
                row.notes,
            ],
        )
        .map_err(StoreError::from)?;

        info!("Created quote {} ({})", quote.id, quote.procedure_name);
        Ok(quote)
    }

    /// Fetch one quote by id.
    pub fn get(&self, id: &str) -> std::result::Result<Option<Quote>, StoreError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM quotes WHERE id = ?1", QUOTE_COLUMNS),
                params![id],
                QuoteRow::read,
            )
            .optional()?;

        row.map(QuoteRow::decode).transpose()
    }

    /// Replace a stored quote.
    ///
    /// The id and creation time are kept; a payload without a status keeps
    /// the stored one. Returns `None` when no quote has this id.
    pub fn update(&self, id: &str, input: QuoteInput) -> Result<Option<Quote>> {
        input.validate()?;

        let Some(existing) = self.get(id)? else {
            return Ok(None);
        };

        let status = input.status.unwrap_or(existing.status);
        let mut quote = Quote::from_input(existing.id, existing.created_at, input);
        quote.status = status;

        let row = QuoteRow::encode(&quote)?;
        self.conn
            .execute(
                "UPDATE quotes SET
                    patient_id = ?2, patient_age = ?3, patient_phone = ?4, patient_email = ?5,
                    procedure_name = ?6, procedure_code = ?7, procedure_description = ?8,
                    surgeon_name = ?9, surgeon_specialty = ?10,
                    surgery_duration_hours = ?11, anesthesia_type = ?12,
                    additional_equipment = ?13, additional_materials = ?14,
                    is_ambulatory = ?15, hospital_nights = ?16,
                    facility_fee = ?17, equipment_costs = ?18, anesthesia_fee = ?19,
                    other_costs = ?20, total_cost = ?21, surgical_package = ?22,
                    created_by = ?23, status = ?24, notes = ?25
                 WHERE id = ?1",
                params![
                    row.id,
                    row.patient_id,
                    row.patient_age,
                    row.patient_phone,
                    row.patient_email,
                    row.procedure_name,
                    row.procedure_code,
                    row.procedure_description,
                    row.surgeon_name,
                    row.surgeon_specialty,
                    row.surgery_duration_hours,
                    row.anesthesia_type,
                    row.additional_equipment,
                    row.additional_materials,
                    row.is_ambulatory,
                    row.hospital_nights,
                    row.facility_fee,
                    row.equipment_costs,
                    row.anesthesia_fee,
                    row.other_costs,
                    row.total_cost,
                    row.surgical_package,
                    row.created_by,
                    row.status,
                    row.notes,
                ],
            )
            .map_err(StoreError::from)?;

        info!("Updated quote {}", quote.id);
        Ok(Some(quote))
    }

    /// Delete a quote. Returns whether it existed.
    pub fn delete(&self, id: &str) -> std::result::Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM quotes WHERE id = ?1", params![id])?;
        if removed > 0 {
            info!("Deleted quote {}", id);
        }
        Ok(removed > 0)
    }

    /// Quotes matching `filter`, newest first.
    pub fn list(&self, filter: &QuoteFilter) -> std::result::Result<Vec<Quote>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM quotes ORDER BY created_at DESC, rowid DESC",
            QUOTE_COLUMNS
        ))?;
        let rows = stmt.query_map([], QuoteRow::read)?;

        let limit = filter.limit.unwrap_or(usize::MAX);
        let mut quotes = Vec::new();
        for row in rows {
            if quotes.len() >= limit {
                break;
            }
            let quote = row?.decode()?;
            if filter.matches(&quote) {
                quotes.push(quote);
            }
        }

        debug!("Listed {} quotes", quotes.len());
        Ok(quotes)
    }

    /// Distinct procedure names, alphabetically.
    pub fn procedures(&self) -> std::result::Result<Vec<String>, StoreError> {
        self.distinct("SELECT DISTINCT procedure_name FROM quotes ORDER BY procedure_name")
    }

    /// Distinct non-empty surgeon names, alphabetically.
    pub fn surgeons(&self) -> std::result::Result<Vec<String>, StoreError> {
        self.distinct(
            "SELECT DISTINCT surgeon_name FROM quotes
             WHERE surgeon_name IS NOT NULL AND surgeon_name != ''
             ORDER BY surgeon_name",
        )
    }

    fn distinct(&self, sql: &str) -> std::result::Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Number of stored quotes.
    pub fn count(&self) -> std::result::Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// The `limit` most recently created quotes.
    pub fn recent(&self, limit: usize) -> std::result::Result<Vec<Quote>, StoreError> {
        self.list(&QuoteFilter {
            limit: Some(limit),
            ..QuoteFilter::default()
        })
    }

    /// Most quoted procedures, by count then name.
    pub fn top_procedures(
        &self,
        limit: usize,
    ) -> std::result::Result<Vec<ProcedureCount>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT procedure_name, COUNT(*) AS n FROM quotes
             GROUP BY procedure_name
             ORDER BY n DESC, procedure_name ASC
             LIMIT ?1",
        )?;

        let counts = stmt
            .query_map(params![limit as i64], |row| {
                let count: i64 = row.get(1)?;
                Ok(ProcedureCount {
                    name: row.get(0)?,
                    count: count as usize,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(counts)
    }
}

fn setup_schema(conn: &Connection) -> std::result::Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS quotes (
            id TEXT PRIMARY KEY,
            patient_id TEXT,
            patient_age INTEGER,
            patient_phone TEXT,
            patient_email TEXT,
            procedure_name TEXT NOT NULL,
            procedure_code TEXT,
            procedure_description TEXT,
            surgeon_name TEXT,
            surgeon_specialty TEXT,
            surgery_duration_hours INTEGER NOT NULL,
            anesthesia_type TEXT NOT NULL,
            additional_equipment TEXT NOT NULL,
            additional_materials TEXT NOT NULL,
            is_ambulatory INTEGER NOT NULL,
            hospital_nights INTEGER NOT NULL,
            facility_fee TEXT NOT NULL,
            equipment_costs TEXT NOT NULL,
            anesthesia_fee TEXT NOT NULL,
            other_costs TEXT NOT NULL,
            total_cost TEXT NOT NULL,
            surgical_package TEXT,
            created_at TEXT NOT NULL,
            created_by TEXT NOT NULL,
            status TEXT NOT NULL,
            notes TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_quotes_created_at ON quotes(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_quotes_procedure ON quotes(procedure_name)",
        [],
    )?;

    Ok(())
}

/// A quote as stored: money as decimal text, lists as JSON text.
struct QuoteRow {
    id: String,
    patient_id: Option<String>,
    patient_age: Option<u32>,
    patient_phone: Option<String>,
    patient_email: Option<String>,
    procedure_name: String,
    procedure_code: Option<String>,
    procedure_description: Option<String>,
    surgeon_name: Option<String>,
    surgeon_specialty: Option<String>,
    surgery_duration_hours: u32,
    anesthesia_type: String,
    additional_equipment: String,
    additional_materials: String,
    is_ambulatory: bool,
    hospital_nights: u32,
    facility_fee: String,
    equipment_costs: String,
    anesthesia_fee: String,
    other_costs: String,
    total_cost: String,
    surgical_package: Option<String>,
    created_at: String,
    created_by: String,
    status: String,
    notes: Option<String>,
}

impl QuoteRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            patient_age: row.get(2)?,
            patient_phone: row.get(3)?,
            patient_email: row.get(4)?,
            procedure_name: row.get(5)?,
            procedure_code: row.get(6)?,
            procedure_description: row.get(7)?,
            surgeon_name: row.get(8)?,
            surgeon_specialty: row.get(9)?,
            surgery_duration_hours: row.get(10)?,
            anesthesia_type: row.get(11)?,
            additional_equipment: row.get(12)?,
            additional_materials: row.get(13)?,
            is_ambulatory: row.get(14)?,
            hospital_nights: row.get(15)?,
            facility_fee: row.get(16)?,
            equipment_costs: row.get(17)?,
            anesthesia_fee: row.get(18)?,
            other_costs: row.get(19)?,
            total_cost: row.get(20)?,
            surgical_package: row.get(21)?,
            created_at: row.get(22)?,
            created_by: row.get(23)?,
            status: row.get(24)?,
            notes: row.get(25)?,
        })
    }

    fn encode(quote: &Quote) -> std::result::Result<Self, StoreError> {
        Ok(Self {
            id: quote.id.clone(),
            patient_id: quote.patient_id.clone(),
            patient_age: quote.patient_age,
            patient_phone: quote.patient_phone.clone(),
            patient_email: quote.patient_email.clone(),
            procedure_name: quote.procedure_name.clone(),
            procedure_code: quote.procedure_code.clone(),
            procedure_description: quote.procedure_description.clone(),
            surgeon_name: quote.surgeon_name.clone(),
            surgeon_specialty: quote.surgeon_specialty.clone(),
            surgery_duration_hours: quote.surgery_duration_hours,
            anesthesia_type: quote.anesthesia_type.clone(),
            additional_equipment: serde_json::to_string(&quote.additional_equipment)?,
            additional_materials: serde_json::to_string(&quote.additional_materials)?,
            is_ambulatory: quote.is_ambulatory,
            hospital_nights: quote.hospital_nights,
            facility_fee: quote.facility_fee.to_string(),
            equipment_costs: quote.equipment_costs.to_string(),
            anesthesia_fee: quote.anesthesia_fee.to_string(),
            other_costs: quote.other_costs.to_string(),
            total_cost: quote.total_cost.to_string(),
            surgical_package: quote
                .surgical_package
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            created_at: quote.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            created_by: quote.created_by.clone(),
            status: quote.status.as_str().to_string(),
            notes: quote.notes.clone(),
        })
    }

    fn decode(self) -> std::result::Result<Quote, StoreError> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| corrupt("created_at", &self.created_at))?;
        let status =
            QuoteStatus::parse(&self.status).ok_or_else(|| corrupt("status", &self.status))?;
        let surgical_package: Option<SurgicalPackage> = self
            .surgical_package
            .as_deref()
            .map(|json| decode_json("surgical_package", json))
            .transpose()?;

        Ok(Quote {
            patient_id: self.patient_id,
            patient_age: self.patient_age,
            patient_phone: self.patient_phone,
            patient_email: self.patient_email,
            procedure_name: self.procedure_name,
            procedure_code: self.procedure_code,
            procedure_description: self.procedure_description,
            surgeon_name: self.surgeon_name,
            surgeon_specialty: self.surgeon_specialty,
            surgery_duration_hours: self.surgery_duration_hours,
            anesthesia_type: self.anesthesia_type,
            additional_equipment: decode_json("additional_equipment", &self.additional_equipment)?,
            additional_materials: decode_json("additional_materials", &self.additional_materials)?,
            is_ambulatory: self.is_ambulatory,
            hospital_nights: self.hospital_nights,
            facility_fee: decode_decimal("facility_fee", &self.facility_fee)?,
            equipment_costs: decode_decimal("equipment_costs", &self.equipment_costs)?,
            anesthesia_fee: decode_decimal("anesthesia_fee", &self.anesthesia_fee)?,
            other_costs: decode_decimal("other_costs", &self.other_costs)?,
            total_cost: decode_decimal("total_cost", &self.total_cost)?,
            surgical_package,
            created_at,
            created_by: self.created_by,
            status,
            notes: self.notes,
            id: self.id,
        })
    }
}

fn corrupt(column: &str, value: &str) -> StoreError {
    StoreError::Corrupt {
        column: column.to_string(),
        value: value.to_string(),
    }
}

fn decode_decimal(column: &str, value: &str) -> std::result::Result<Decimal, StoreError> {
    Decimal::from_str(value).map_err(|_| corrupt(column, value))
}

fn decode_json<T: DeserializeOwned>(column: &str, value: &str) -> std::result::Result<T, StoreError> {
    serde_json::from_str(value).map_err(|_| corrupt(column, value))
}
