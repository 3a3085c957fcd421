use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tracing::warn;

use super::catalog::CatalogImporter;
use super::domain::{ApplicantRequest, ApplicantRequestPayload};
use super::service::MatchingService;

/// Router builder exposing catalog management and matching endpoints.
pub fn matching_router(service: Arc<MatchingService>) -> Router {
    Router::new()
        .route(
            "/api/v1/catalog",
            get(catalog_status_handler).put(catalog_replace_handler),
        )
        .route("/api/v1/matches", post(match_handler))
        .with_state(service)
}

pub(crate) async fn catalog_status_handler(
    State(service): State<Arc<MatchingService>>,
) -> Response {
    (StatusCode::OK, axum::Json(service.status())).into_response()
}

pub(crate) async fn catalog_replace_handler(
    State(service): State<Arc<MatchingService>>,
    axum::Json(payload): axum::Json<Value>,
) -> Response {
    match CatalogImporter::from_value(payload) {
        Ok(imported) => {
            let report = service.load_imported(&imported);
            (StatusCode::OK, axum::Json(report)).into_response()
        }
        Err(error) => {
            warn!(%error, "rejected catalog payload");
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn match_handler(
    State(service): State<Arc<MatchingService>>,
    axum::Json(payload): axum::Json<ApplicantRequestPayload>,
) -> Response {
    let result = ApplicantRequest::try_from(payload)
        .and_then(|request| service.match_request(&request));

    match result {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}
