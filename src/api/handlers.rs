//! API request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::server::AppState;
use crate::cache::content_key;
use crate::core::{Diagnostics, Outcome};
use crate::writer;

/// Envelope for every JSON reply; `request_id` is fresh per response
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn envelope(data: Option<T>, error: Option<String>) -> Self {
        Self {
            success: error.is_none(),
            request_id: Uuid::new_v4().to_string(),
            data,
            error,
        }
    }

    pub fn ok(data: T) -> Self {
        Self::envelope(Some(data), None)
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self::envelope(None, Some(message.into()))
    }
}

/// (path, method, description)
const ENDPOINTS: [(&str, &str, &str); 4] = [
    ("/", "GET", "This listing"),
    ("/health", "GET", "Liveness and cache occupancy"),
    ("/version", "GET", "Server version and batch constants"),
    (
        "/api/v1/consolidate",
        "POST",
        "Consolidate a workbook sent as the raw request body (?format=json|csv)",
    ),
];

#[derive(Serialize)]
pub struct Endpoint {
    pub path: &'static str,
    pub method: &'static str,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: String,
    pub endpoints: Vec<Endpoint>,
}

/// GET / - Endpoint listing
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let endpoints = ENDPOINTS
        .iter()
        .map(|&(path, method, description)| Endpoint {
            path,
            method,
            description,
        })
        .collect();
    Json(ApiResponse::ok(ServiceInfo {
        service: "portfolio-server",
        version: state.version.clone(),
        endpoints,
    }))
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub cached_uploads: usize,
}

/// GET /health - Liveness
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthStatus {
        status: "healthy",
        cached_uploads: state.cache.len(),
    }))
}

#[derive(Serialize)]
pub struct BatchInfo {
    pub version: String,
    pub amc_name: String,
    pub reporting_date: String,
    pub header_offset: usize,
}

/// GET /version - Server version and batch constants
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.consolidator.config();
    Json(ApiResponse::ok(BatchInfo {
        version: state.version.clone(),
        amc_name: config.amc_name.clone(),
        reporting_date: config.reporting_date.to_string(),
        header_offset: config.header_offset,
    }))
}

/// Query string of the consolidate endpoint
#[derive(Deserialize, Default)]
pub struct ConsolidateParams {
    pub format: Option<String>,
}

#[derive(Serialize)]
pub struct ConsolidateResponse {
    /// "consolidated" or "empty"
    pub status: String,
    pub content_key: String,
    pub record_count: usize,
    pub columns: Vec<String>,
    pub records: Value,
    pub diagnostics: Diagnostics,
}

/// POST /api/v1/consolidate - Consolidate an uploaded workbook
pub async fn consolidate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConsolidateParams>,
    body: Bytes,
) -> Response {
    if body.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<ConsolidateResponse>::err("Request body is empty")),
        )
            .into_response();
    }

    // workbook parsing is CPU-bound; keep it off the async workers
    let worker = Arc::clone(&state);
    let payload = body.clone();
    let computed = tokio::task::spawn_blocking(move || {
        worker.cache.get_or_insert_with(&payload, |bytes| {
            worker.consolidator.consolidate_bytes(bytes)
        })
    })
    .await;

    let outcome = match computed {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<ConsolidateResponse>::err(e.to_string())),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("consolidation task failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<ConsolidateResponse>::err(
                    "Consolidation task failed",
                )),
            )
                .into_response();
        }
    };

    let wants_csv = params
        .format
        .as_deref()
        .is_some_and(|f| f.eq_ignore_ascii_case("csv"));

    match (outcome.as_ref(), wants_csv) {
        (Outcome::Consolidated { dataset, .. }, true) => match writer::to_csv_string(dataset) {
            Ok(csv) => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"portfolio.csv\"",
                    ),
                ],
                csv,
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<ConsolidateResponse>::err(e.to_string())),
            )
                .into_response(),
        },
        (Outcome::Consolidated { dataset, diagnostics }, false) => {
            Json(ApiResponse::ok(ConsolidateResponse {
                status: "consolidated".to_string(),
                content_key: content_key(&body),
                record_count: dataset.len(),
                columns: dataset.columns().to_vec(),
                records: writer::to_json_value(dataset),
                diagnostics: diagnostics.clone(),
            }))
            .into_response()
        }
        (Outcome::Empty { diagnostics }, _) => Json(ApiResponse::ok(ConsolidateResponse {
            status: "empty".to_string(),
            content_key: content_key(&body),
            record_count: 0,
            columns: Vec::new(),
            records: Value::Array(Vec::new()),
            diagnostics: diagnostics.clone(),
        }))
        .into_response(),
    }
}
