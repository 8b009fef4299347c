//! HTTP API over the quote store.

mod error;
mod handlers;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use surgiquote_core::models::config::ServerConfig;
use surgiquote_core::{QuoteImporter, QuoteStore, SurgiquoteConfig};

use error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<QuoteStore>>,
    importer: Arc<QuoteImporter>,
}

impl AppState {
    pub fn new(store: QuoteStore, config: &SurgiquoteConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            importer: Arc::new(QuoteImporter::from_config(config)),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, QuoteStore>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::Internal("quote store lock poisoned".to_string()))
    }
}

/// Build the API router, mounted under `/api`.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/upload-pdf", post(handlers::upload_pdf))
        .route(
            "/quotes",
            get(handlers::list_quotes).post(handlers::create_quote),
        )
        .route(
            "/quotes/:id",
            get(handlers::get_quote)
                .put(handlers::update_quote)
                .delete(handlers::delete_quote),
        )
        .route(
            "/pricing-suggestions/:procedure",
            get(handlers::pricing_suggestions),
        )
        .route("/procedures", get(handlers::procedures))
        .route("/surgeons", get(handlers::surgeons))
        .route("/dashboard", get(handlers::dashboard))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// `*` anywhere in the list allows every origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o.trim() == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use surgiquote_core::pdf::fixtures::single_page_pdf;
    use surgiquote_core::{ImportOutcome, Quote};
    use tower::ServiceExt;

    fn test_app() -> (Router, AppState) {
        let config = SurgiquoteConfig::default();
        let state = AppState::new(QuoteStore::open_in_memory().unwrap(), &config);
        (router(state.clone(), &config.server), state)
    }

    fn json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(b"--BOUNDARY\r\n");
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n--BOUNDARY--\r\n");

        Request::builder()
            .method("POST")
            .uri("/api/upload-pdf")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 1 << 20).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn payload(procedure: &str, surgeon: &str) -> Value {
        json!({
            "procedure_name": procedure,
            "surgeon_name": surgeon,
            "surgery_duration_hours": 2,
            "anesthesia_type": "Anestesia General",
            "is_ambulatory": false,
            "hospital_nights": 1,
            "facility_fee": "12000",
            "equipment_costs": "4500.50",
            "anesthesia_fee": "2000",
            "created_by": "Recepción"
        })
    }

    async fn create(app: &Router, procedure: &str, surgeon: &str) -> Quote {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/quotes", Some(payload(procedure, surgeon))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_value(body_json(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_root_banner() {
        let (app, _) = test_app();
        let response = app.oneshot(json_request("GET", "/api", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Sistema de Gestión de Cotizaciones Quirúrgicas" })
        );
    }

    #[tokio::test]
    async fn test_create_and_get_quote() {
        let (app, _) = test_app();
        let created = create(&app, "Colecistectomía laparoscópica", "Dra. Ana Pérez").await;

        assert_eq!(created.total_cost, Decimal::new(1_850_050, 2));

        let response = app
            .oneshot(json_request("GET", &format!("/api/quotes/{}", created.id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let fetched: Quote = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_procedure() {
        let (app, state) = test_app();
        let response = app
            .oneshot(json_request("POST", "/api/quotes", Some(payload("  ", "Dr. Ruiz"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store().unwrap().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_quote_is_404() {
        let (app, _) = test_app();

        for (method, body) in [
            ("GET", None),
            ("PUT", Some(payload("Rinoplastia", "Dr. Ruiz"))),
            ("DELETE", None),
        ] {
            let response = app
                .clone()
                .oneshot(json_request(method, "/api/quotes/no-such-id", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", method);
            assert_eq!(
                body_json(response).await,
                json!({ "detail": "Cotización no encontrada" })
            );
        }
    }

    #[tokio::test]
    async fn test_update_and_delete_quote() {
        let (app, state) = test_app();
        let created = create(&app, "Rinoplastia", "Dr. Ruiz").await;

        let mut changed = payload("Rinoplastia estética", "Dr. Ruiz");
        changed["other_costs"] = json!("500");
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/quotes/{}", created.id),
                Some(changed),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let updated: Quote = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.procedure_name, "Rinoplastia estética");
        assert_eq!(updated.total_cost, created.total_cost + Decimal::new(500, 0));

        let response = app
            .oneshot(json_request(
                "DELETE",
                &format!("/api/quotes/{}", created.id),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Cotización eliminada exitosamente" })
        );
        assert_eq!(state.store().unwrap().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_quotes_with_filters() {
        let (app, _) = test_app();
        create(&app, "Artroscopia de rodilla", "Dr. Esteban Ríos").await;
        create(&app, "Bypass gástrico", "Dra. Ana Pérez").await;
        create(&app, "Artroscopia de hombro", "Dra. Ana Pérez").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "GET",
                "/api/quotes?procedure_name=artroscopia&surgeon_name=ana",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let quotes: Vec<Quote> = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].procedure_name, "Artroscopia de hombro");

        let response = app
            .oneshot(json_request("GET", "/api/quotes", None))
            .await
            .unwrap();
        let quotes: Vec<Quote> = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[0].procedure_name, "Artroscopia de hombro");
    }

    #[tokio::test]
    async fn test_procedures_and_surgeons() {
        let (app, _) = test_app();
        create(&app, "Bypass gástrico", "Dra. Ana Pérez").await;
        create(&app, "Bypass gástrico", "Dr. Luis Mora").await;

        let response = app
            .clone()
            .oneshot(json_request("GET", "/api/procedures", None))
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({ "procedures": ["Bypass gástrico"] })
        );

        let response = app
            .oneshot(json_request("GET", "/api/surgeons", None))
            .await
            .unwrap();
        let surgeons = body_json(response).await;
        assert_eq!(surgeons["surgeons"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_pricing_suggestion_endpoint() {
        let (app, _) = test_app();
        create(&app, "Rinoplastia", "Dr. Ruiz").await;

        let response = app
            .oneshot(json_request("GET", "/api/pricing-suggestions/rinoplastia", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let suggestion: surgiquote_core::PricingSuggestion =
            serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(suggestion.quote_count, 1);
        assert_eq!(suggestion.avg_facility_fee, Decimal::new(12_000, 0));
        assert_eq!(suggestion.suggested_total, Decimal::new(1_850_050, 2));
    }

    #[tokio::test]
    async fn test_dashboard_endpoint() {
        let (app, _) = test_app();
        create(&app, "Rinoplastia", "Dr. Ruiz").await;

        let response = app
            .oneshot(json_request("GET", "/api/dashboard", None))
            .await
            .unwrap();
        let stats = body_json(response).await;
        assert_eq!(stats["total_quotes"], 1);
        assert_eq!(stats["top_procedures"], json!([{ "name": "Rinoplastia", "count": 1 }]));
        assert_eq!(stats["recent_quotes"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let (app, _) = test_app();
        let response = app
            .oneshot(upload_request("notas.txt", b"Procedimiento: Rinoplastia"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "Solo se permiten archivos PDF" })
        );
    }

    #[tokio::test]
    async fn test_upload_pdf_creates_quote() {
        let (app, state) = test_app();
        let pdf = single_page_pdf(
            "Procedimiento: Hernioplastia inguinal. Duration: 2 hours. Total: $9,000",
        );
        let response = app
            .oneshot(upload_request("hernioplastia.pdf", &pdf))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let outcome: ImportOutcome = serde_json::from_value(body_json(response).await).unwrap();
        assert!(outcome.success, "{:?}", outcome.errors);
        assert_eq!(outcome.quotes_created, 1);
        assert_eq!(outcome.message, "Cotización creada exitosamente desde PDF");

        let quote = outcome.quote.unwrap();
        assert_eq!(quote.procedure_name, "Hernioplastia inguinal");
        assert_eq!(quote.total_cost, Decimal::new(9_000, 0));
        assert_eq!(state.store().unwrap().count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upload_unreadable_pdf() {
        let (app, state) = test_app();
        let response = app
            .oneshot(upload_request("cotizacion.PDF", b"%PDF-1.4 truncated"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let outcome: ImportOutcome = serde_json::from_value(body_json(response).await).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.quotes_created, 0);
        assert_eq!(outcome.message, "No se pudo extraer texto del PDF");
        assert_eq!(state.store().unwrap().count().unwrap(), 0);
    }

    #[test]
    fn test_cors_layer_accepts_lists() {
        let _ = cors_layer(&["*".to_string()]);
        let _ = cors_layer(&[
            "http://localhost:3000".to_string(),
            "not a header\n".to_string(),
        ]);
    }
}
