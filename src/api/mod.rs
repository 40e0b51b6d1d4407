// Company Registry - REST API with Axum
//
// GET  /api/health
// GET  /api/companies?search=&page=&per_page=
// GET  /api/companies/:id
// POST /api/companies
// GET  /api/cnpj/:cnpj              registry lookup + auto-filled form
// GET  /api/validate/cnpj/:value

pub mod error;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cnpj::{validate_cnpj, Cnpj};
use crate::entities::{Address, Company, CompanyRegistry};
use crate::form::CompanyDraft;
use crate::lookup::{CnpjLookup, RegistryRecord};
use crate::mask::mask_cnpj;
use crate::pagination::Page;

pub use error::AppError;

/// Largest page a client may request
pub const MAX_PER_PAGE: usize = 100;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: CompanyRegistry,
    pub lookup: Arc<dyn CnpjLookup>,
    pub per_page: usize,
}

impl AppState {
    pub fn new(registry: CompanyRegistry, lookup: Arc<dyn CnpjLookup>, per_page: usize) -> Self {
        AppState {
            registry,
            lookup,
            per_page,
        }
    }
}

// ============================================================================
// DTOs
// ============================================================================

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// Company as shown by the directory (identifiers in display form)
#[derive(Debug, Serialize, Deserialize)]
pub struct CompanyResponse {
    pub id: String,
    pub name: String,
    pub legal_name: String,
    pub cnpj: String,
    pub cnpj_formatted: String,
    pub address: Address,
    pub cep_formatted: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            name: company.name,
            legal_name: company.legal_name,
            cnpj: company.cnpj.as_str().to_string(),
            cnpj_formatted: company.cnpj.formatted(),
            cep_formatted: company.address.cep_formatted(),
            address: company.address,
            email: company.email,
            phone: company.phone,
            created_at: company.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<usize>,
}

/// Registry lookup answer: the normalized record plus the form it fills
#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub record: RegistryRecord,
    pub draft: CompanyDraft,
    pub active: bool,
    pub already_registered: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub masked: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/companies - Search and paginate the directory
async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<ApiResponse<Page<CompanyResponse>>> {
    let per_page = match query.per_page {
        Some(0) | None => state.per_page,
        Some(n) => n.min(MAX_PER_PAGE),
    };
    let term = query.search.unwrap_or_default();
    let page = query.page.unwrap_or(1);

    let results = state.registry.search(&term, page, per_page);
    Json(ApiResponse::ok(results.map(CompanyResponse::from)))
}

/// GET /api/companies/:id - One company
async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CompanyResponse>>, AppError> {
    state
        .registry
        .find_by_id(&id)
        .map(|company| Json(ApiResponse::ok(company.into())))
        .ok_or_else(|| AppError::NotFound(format!("company {}", id)))
}

/// POST /api/companies - Register a company from the creation form
async fn create_company(
    State(state): State<AppState>,
    payload: Result<Json<CompanyDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CompanyResponse>>), AppError> {
    let Json(draft) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let company = draft.into_company()?;
    let company = state.registry.register(company)?;

    tracing::info!(id = %company.id, cnpj = %company.cnpj, "company created");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(company.into()))))
}

/// GET /api/cnpj/:cnpj - Look up a CNPJ and return the auto-filled form
async fn lookup_cnpj(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<ApiResponse<LookupResponse>>, AppError> {
    let cnpj = Cnpj::new(&raw).map_err(|e| AppError::invalid_field("cnpj", e.to_string()))?;

    let record = state.lookup.lookup(&cnpj).await?;

    let mut draft = CompanyDraft {
        cnpj: cnpj.as_str().to_string(),
        ..Default::default()
    };
    draft.apply_registry_record(&record);

    let response = LookupResponse {
        active: record.is_active(),
        already_registered: state.registry.find_by_cnpj(cnpj.as_str()).is_some(),
        draft: draft.masked(),
        record,
    };

    Ok(Json(ApiResponse::ok(response)))
}

/// GET /api/validate/cnpj/:value - Validate and mask without looking up
async fn validate_cnpj_value(Path(value): Path<String>) -> Json<ApiResponse<ValidationResponse>> {
    let result = validate_cnpj(&value);

    Json(ApiResponse::ok(ValidationResponse {
        valid: result.is_ok(),
        masked: mask_cnpj(&value),
        error: result.err().map(|e| e.to_string()),
    }))
}

// ============================================================================
// Router
// ============================================================================

/// Build the application router
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/:id", get(get_company))
        .route("/cnpj/:cnpj", get(lookup_cnpj))
        .route("/validate/cnpj/:value", get(validate_cnpj_value))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
