//! HTTP handlers for the quote API.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info};

use surgiquote_core::{
    DashboardStats, ImportOutcome, PricingSuggestion, Quote, QuoteFilter, QuoteInput,
    extract_document_text,
};

use super::AppState;
use super::error::ApiError;

/// GET /api - Service banner
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Sistema de Gestión de Cotizaciones Quirúrgicas" }))
}

/// GET /api/health - Health check
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let total = state.store()?.count()?;
    Ok(Json(json!({ "status": "ok", "quotes": total })))
}

/// POST /api/upload-pdf - Build a quote from an uploaded PDF
pub async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportOutcome>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(ApiError::BadRequest("Solo se permiten archivos PDF".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError::BadRequest("No se recibió ningún archivo".to_string()))?;
    debug!("Received {} ({} bytes)", filename, data.len());

    let text = tokio::task::spawn_blocking(move || extract_document_text(&data))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let store = state.store()?;
    let outcome = match state.importer.import_text(&text, &store) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Import of {} failed: {}", filename, e);
            ImportOutcome::failed(&e)
        }
    };

    info!("Processed upload {}: {}", filename, outcome.message);
    Ok(Json(outcome))
}

/// Filters accepted by GET /api/quotes.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteQuery {
    pub procedure_name: Option<String>,
    pub surgeon_name: Option<String>,
}

/// GET /api/quotes - List quotes, newest first
pub async fn list_quotes(
    State(state): State<AppState>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    let filter = QuoteFilter {
        procedure_name: query.procedure_name,
        surgeon_name: query.surgeon_name,
        ..QuoteFilter::default()
    };
    Ok(Json(state.store()?.list(&filter)?))
}

/// POST /api/quotes - Create a quote
pub async fn create_quote(
    State(state): State<AppState>,
    Json(input): Json<QuoteInput>,
) -> Result<Json<Quote>, ApiError> {
    Ok(Json(state.store()?.create(input)?))
}

/// GET /api/quotes/:id - Fetch one quote
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Quote>, ApiError> {
    state
        .store()?
        .get(&id)?
        .map(Json)
        .ok_or_else(ApiError::quote_not_found)
}

/// PUT /api/quotes/:id - Replace a quote
pub async fn update_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<QuoteInput>,
) -> Result<Json<Quote>, ApiError> {
    state
        .store()?
        .update(&id, input)?
        .map(Json)
        .ok_or_else(ApiError::quote_not_found)
}

/// DELETE /api/quotes/:id - Delete a quote
pub async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.store()?.delete(&id)? {
        return Err(ApiError::quote_not_found());
    }
    Ok(Json(json!({ "message": "Cotización eliminada exitosamente" })))
}

/// GET /api/pricing-suggestions/:procedure - Historical averages
pub async fn pricing_suggestions(
    State(state): State<AppState>,
    Path(procedure): Path<String>,
) -> Result<Json<PricingSuggestion>, ApiError> {
    let store = state.store()?;
    Ok(Json(surgiquote_core::pricing_suggestion(&store, &procedure)?))
}

/// GET /api/procedures - Distinct procedure names
pub async fn procedures(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let procedures = state.store()?.procedures()?;
    Ok(Json(json!({ "procedures": procedures })))
}

/// GET /api/surgeons - Distinct surgeon names
pub async fn surgeons(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let surgeons = state.store()?.surgeons()?;
    Ok(Json(json!({ "surgeons": surgeons })))
}

/// GET /api/dashboard - Dashboard statistics
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    let store = state.store()?;
    Ok(Json(surgiquote_core::dashboard(&store)?))
}
