//! HTTP endpoint.
//!
//! `POST /api/scrape` takes `{"searchConfig": {...}}` and answers with the
//! filtered listings. Messages are in Portuguese, matching what existing
//! front-ends expect.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::search::VehicleSearch;
use crate::{ScoutError, SearchSpec, VehicleListing};

const MISSING_CONFIG: &str = "Configuração de busca é obrigatória.";
const METHOD_NOT_ALLOWED: &str = "Método não permitido. Use POST.";
const INTERNAL_ERROR: &str = "Erro interno do servidor.";

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<VehicleSearch>,
}

impl AppState {
    pub fn new(search: VehicleSearch) -> Self {
        Self {
            search: Arc::new(search),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeRequest {
    #[serde(rename = "searchConfig", default)]
    search_config: Option<SearchSpec>,
}

#[derive(Debug, Serialize)]
struct ScrapeResponse {
    success: bool,
    vehicles: Vec<VehicleListing>,
    total: usize,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Failures surfaced to HTTP clients.
#[derive(Debug)]
enum ApiError {
    BadRequest(ScoutError),
    MethodNotAllowed,
    Internal(ScoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(e) => {
                debug!(error = %e, "Rejected scrape request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        success: None,
                        error: MISSING_CONFIG,
                        details: None,
                    },
                )
            }
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorBody {
                    success: None,
                    error: METHOD_NOT_ALLOWED,
                    details: None,
                },
            ),
            ApiError::Internal(e) => {
                error!(error = %e, "Scrape request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        success: Some(false),
                        error: INTERNAL_ERROR,
                        details: Some(e.to_string()),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::DELETE,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers(Any)
}

/// Builds the router with CORS and request tracing applied.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/scrape", post(scrape).fallback(method_not_allowed))
        .route("/api/health", get(health))
        .layer(build_cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the app on `addr` until the process is stopped.
pub async fn serve(addr: SocketAddr, search: VehicleSearch) -> std::io::Result<()> {
    let app = build_app(AppState::new(search));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}

async fn scrape(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let spec = match payload {
        Ok(Json(ScrapeRequest {
            search_config: Some(spec),
        })) => spec,
        Ok(_) => {
            return Err(ApiError::BadRequest(ScoutError::Configuration(
                "missing searchConfig".to_string(),
            )));
        }
        Err(rejection) => {
            return Err(ApiError::BadRequest(ScoutError::Configuration(
                rejection.body_text(),
            )));
        }
    };

    debug!(?spec, "Scrape request");
    let outcome = state.search.run(&spec).await.map_err(ApiError::Internal)?;
    let total = outcome.total();

    Ok(Json(ScrapeResponse {
        success: true,
        vehicles: outcome.vehicles,
        total,
        message: format!("Busca concluída! {} veículos encontrados.", total),
    }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
