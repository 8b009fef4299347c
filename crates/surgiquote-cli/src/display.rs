//! Output formatting shared by the subcommands.

use surgiquote_core::{DashboardStats, ImportOutcome, PricingSuggestion, Quote, QuoteDraft};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used when writing to an output directory.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

const QUOTE_COLUMNS: [&str; 16] = [
    "id",
    "created_at",
    "status",
    "patient_id",
    "procedure_name",
    "surgeon_name",
    "surgery_duration_hours",
    "anesthesia_type",
    "is_ambulatory",
    "hospital_nights",
    "facility_fee",
    "equipment_costs",
    "anesthesia_fee",
    "other_costs",
    "total_cost",
    "created_by",
];

fn quote_record(quote: &Quote) -> Vec<String> {
    vec![
        quote.id.clone(),
        quote.created_at.to_rfc3339(),
        quote.status.as_str().to_string(),
        quote.patient_id.clone().unwrap_or_default(),
        quote.procedure_name.clone(),
        quote.surgeon_name.clone().unwrap_or_default(),
        quote.surgery_duration_hours.to_string(),
        quote.anesthesia_type.clone(),
        quote.is_ambulatory.to_string(),
        quote.hospital_nights.to_string(),
        quote.facility_fee.to_string(),
        quote.equipment_costs.to_string(),
        quote.anesthesia_fee.to_string(),
        quote.other_costs.to_string(),
        quote.total_cost.to_string(),
        quote.created_by.clone(),
    ]
}

fn write_csv(header: &[&str], rows: impl IntoIterator<Item = Vec<String>>) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

pub fn format_quote(quote: &Quote, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(quote)?),
        OutputFormat::Csv => write_csv(&QUOTE_COLUMNS, [quote_record(quote)]),
        OutputFormat::Text => Ok(quote_text(quote)),
    }
}

pub fn format_quotes(quotes: &[Quote], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(quotes)?),
        OutputFormat::Csv => write_csv(&QUOTE_COLUMNS, quotes.iter().map(quote_record)),
        OutputFormat::Text => {
            if quotes.is_empty() {
                return Ok("No quotes found.\n".to_string());
            }
            let mut output = String::new();
            for quote in quotes {
                output.push_str(&format!(
                    "{}  {}  {:<40}  {:>12}  {}\n",
                    quote.id,
                    quote.created_at.format("%Y-%m-%d"),
                    quote.procedure_name,
                    quote.total_cost,
                    quote.status.as_str()
                ));
            }
            Ok(output)
        }
    }
}

fn quote_text(quote: &Quote) -> String {
    let mut output = String::new();

    output.push_str(&format!("Quote: {}\n", quote.id));
    output.push_str(&format!("Created: {} by {}\n", quote.created_at.to_rfc3339(), quote.created_by));
    output.push_str(&format!("Status: {}\n", quote.status.as_str()));
    output.push('\n');

    output.push_str("Procedure:\n");
    output.push_str(&format!("  {}\n", quote.procedure_name));
    if let Some(surgeon) = &quote.surgeon_name {
        output.push_str(&format!("  Surgeon: {}\n", surgeon));
    }
    output.push_str(&format!("  Duration: {} h\n", quote.surgery_duration_hours));
    output.push_str(&format!("  Anesthesia: {}\n", quote.anesthesia_type));
    output.push_str(&format!("  Stay: {}\n", stay_text(quote.is_ambulatory, quote.hospital_nights)));
    output.push('\n');

    push_costs(
        &mut output,
        [
            quote.facility_fee,
            quote.equipment_costs,
            quote.anesthesia_fee,
            quote.other_costs,
            quote.total_cost,
        ],
    );

    if let Some(notes) = &quote.notes {
        output.push_str(&format!("\nNotes: {}\n", notes));
    }

    output
}

fn stay_text(is_ambulatory: bool, nights: u32) -> String {
    if is_ambulatory {
        "ambulatory".to_string()
    } else {
        format!("{} night(s)", nights)
    }
}

fn push_costs(output: &mut String, costs: [rust_decimal::Decimal; 5]) {
    let [facility, equipment, anesthesia, other, total] = costs;
    output.push_str("Costs:\n");
    output.push_str(&format!("  Facility:   {}\n", facility));
    output.push_str(&format!("  Equipment:  {}\n", equipment));
    output.push_str(&format!("  Anesthesia: {}\n", anesthesia));
    output.push_str(&format!("  Other:      {}\n", other));
    output.push_str(&format!("  Total:      {}\n", total));
}

const DRAFT_COLUMNS: [&str; 16] = [
    "patient_id",
    "patient_age",
    "patient_phone",
    "patient_email",
    "procedure_name",
    "surgeon_name",
    "surgery_duration_hours",
    "anesthesia_type",
    "is_ambulatory",
    "hospital_nights",
    "facility_fee",
    "equipment_costs",
    "anesthesia_fee",
    "other_costs",
    "total_cost",
    "additional_equipment",
];

fn draft_record(draft: &QuoteDraft) -> Vec<String> {
    vec![
        draft.patient_id.clone().unwrap_or_default(),
        draft.patient_age.map(|a| a.to_string()).unwrap_or_default(),
        draft.patient_phone.clone().unwrap_or_default(),
        draft.patient_email.clone().unwrap_or_default(),
        draft.procedure_name.clone(),
        draft.surgeon_name.clone(),
        draft.surgery_duration_hours.to_string(),
        draft.anesthesia_type.clone(),
        draft.is_ambulatory.to_string(),
        draft.hospital_nights.to_string(),
        draft.facility_fee.to_string(),
        draft.equipment_costs.to_string(),
        draft.anesthesia_fee.to_string(),
        draft.other_costs.to_string(),
        draft.total_cost.to_string(),
        draft.additional_equipment.join("; "),
    ]
}

pub fn format_draft(draft: &QuoteDraft, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(draft)?),
        OutputFormat::Csv => write_csv(&DRAFT_COLUMNS, [draft_record(draft)]),
        OutputFormat::Text => Ok(draft_text(draft)),
    }
}

fn draft_text(draft: &QuoteDraft) -> String {
    let mut output = String::new();

    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    output.push_str("Patient:\n");
    output.push_str(&format!("  ID:    {}\n", or_dash(draft.patient_id.clone())));
    output.push_str(&format!("  Age:   {}\n", or_dash(draft.patient_age.map(|a| a.to_string()))));
    output.push_str(&format!("  Phone: {}\n", or_dash(draft.patient_phone.clone())));
    output.push_str(&format!("  Email: {}\n", or_dash(draft.patient_email.clone())));
    output.push('\n');

    output.push_str("Procedure:\n");
    output.push_str(&format!("  Name:       {}\n", non_empty(&draft.procedure_name)));
    output.push_str(&format!("  Surgeon:    {}\n", non_empty(&draft.surgeon_name)));
    output.push_str(&format!("  Duration:   {} h\n", draft.surgery_duration_hours));
    output.push_str(&format!("  Anesthesia: {}\n", non_empty(&draft.anesthesia_type)));
    output.push_str(&format!("  Stay:       {}\n", stay_text(draft.is_ambulatory, draft.hospital_nights)));
    if !draft.additional_equipment.is_empty() {
        output.push_str(&format!("  Equipment:  {}\n", draft.additional_equipment.join(", ")));
    }
    let medications = &draft.surgical_package.medications_included;
    if !medications.is_empty() {
        output.push_str(&format!("  Medication: {}\n", medications.join(", ")));
    }
    output.push('\n');

    push_costs(
        &mut output,
        [
            draft.facility_fee,
            draft.equipment_costs,
            draft.anesthesia_fee,
            draft.other_costs,
            draft.total_cost,
        ],
    );

    output
}

fn non_empty(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

pub fn format_outcome(outcome: &ImportOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Csv => write_csv(
            &["success", "message", "quotes_created", "quote_id", "procedure_name", "total_cost", "errors"],
            [vec![
                outcome.success.to_string(),
                outcome.message.clone(),
                outcome.quotes_created.to_string(),
                outcome.quote.as_ref().map(|q| q.id.clone()).unwrap_or_default(),
                outcome
                    .extracted_data
                    .as_ref()
                    .map(|d| d.procedure_name.clone())
                    .unwrap_or_default(),
                outcome
                    .extracted_data
                    .as_ref()
                    .map(|d| d.total_cost.to_string())
                    .unwrap_or_default(),
                outcome.errors.join("; "),
            ]],
        ),
        OutputFormat::Text => {
            let mut output = format!("{}\n", outcome.message);
            for error in &outcome.errors {
                output.push_str(&format!("  - {}\n", error));
            }
            if let Some(quote) = &outcome.quote {
                output.push('\n');
                output.push_str(&quote_text(quote));
            } else if let Some(draft) = &outcome.extracted_data {
                output.push('\n');
                output.push_str(&draft_text(draft));
            }
            Ok(output)
        }
    }
}

pub fn format_pricing(suggestion: &PricingSuggestion, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(suggestion)?),
        OutputFormat::Csv => write_csv(
            &[
                "procedure_name",
                "quote_count",
                "avg_facility_fee",
                "avg_equipment_costs",
                "avg_total_cost",
                "suggested_total",
            ],
            [vec![
                suggestion.procedure_name.clone(),
                suggestion.quote_count.to_string(),
                suggestion.avg_facility_fee.to_string(),
                suggestion.avg_equipment_costs.to_string(),
                suggestion.avg_total_cost.to_string(),
                suggestion.suggested_total.to_string(),
            ]],
        ),
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&format!(
                "Pricing for \"{}\" ({} quotes)\n",
                suggestion.procedure_name, suggestion.quote_count
            ));
            output.push_str(&format!("  Avg facility:  {}\n", suggestion.avg_facility_fee));
            output.push_str(&format!("  Avg equipment: {}\n", suggestion.avg_equipment_costs));
            output.push_str(&format!("  Avg total:     {}\n", suggestion.avg_total_cost));
            output.push_str(&format!("  Suggested:     {}\n", suggestion.suggested_total));
            Ok(output)
        }
    }
}

pub fn format_dashboard(stats: &DashboardStats, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
        OutputFormat::Csv => write_csv(
            &["procedure_name", "count"],
            stats
                .top_procedures
                .iter()
                .map(|p| vec![p.name.clone(), p.count.to_string()]),
        ),
        OutputFormat::Text => {
            let mut output = format!("Total quotes: {}\n", stats.total_quotes);

            if !stats.top_procedures.is_empty() {
                output.push_str("\nTop procedures:\n");
                for procedure in &stats.top_procedures {
                    output.push_str(&format!("  {:>4}  {}\n", procedure.count, procedure.name));
                }
            }

            if !stats.recent_quotes.is_empty() {
                output.push_str("\nRecent quotes:\n");
                output.push_str(&format_quotes(&stats.recent_quotes, OutputFormat::Text)?);
            }

            Ok(output)
        }
    }
}
