use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::data::registry::TableCache;
use crate::server::api::{self, ApiError};

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}

fn respond<T: Serialize>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn health() -> Response {
    Json(api::health_payload()).into_response()
}

async fn formats(State(cache): State<Arc<TableCache>>) -> Response {
    Json(api::formats_payload(&cache)).into_response()
}

async fn table(State(cache): State<Arc<TableCache>>, Path(format_overs): Path<u32>) -> Response {
    respond(api::table_payload(&cache, format_overs))
}

async fn target(State(cache): State<Arc<TableCache>>, body: String) -> Response {
    respond(api::target_payload(&cache, &body))
}

async fn par(State(cache): State<Arc<TableCache>>, body: String) -> Response {
    respond(api::par_payload(&cache, &body))
}

async fn par_sheet(State(cache): State<Arc<TableCache>>, body: String) -> Response {
    respond(api::par_sheet_payload(&cache, &body))
}

async fn assess(State(cache): State<Arc<TableCache>>, body: String) -> Response {
    respond(api::assess_payload(&cache, &body))
}

pub fn router(cache: Arc<TableCache>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/formats", get(formats))
        .route("/api/tables/:format_overs", get(table))
        .route("/api/target", post(target))
        .route("/api/par", post(par))
        .route("/api/par-sheet", post(par_sheet))
        .route("/api/assess", post(assess))
        .with_state(cache)
}
