//! Memoria HTTP REST API
//!
//! Axum-based HTTP server exposing the fact collection under `/api`.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to an
//! inner function. The inner functions take the store and already-extracted
//! request data, so they are directly testable without axum dispatch
//! machinery.
//!
//! Endpoints:
//! - GET    /health                  — liveness check, plain `ok`
//! - GET    /version                 — server version info
//! - GET    /api/swagger.json        — OpenAPI document for the fact endpoints
//! - GET    /api/fact/facts/         — paged list of facts
//! - POST   /api/fact/facts/         — create a fact
//! - GET    /api/fact/facts/{uuid}   — fetch one fact
//! - PUT    /api/fact/facts/{uuid}   — replace a fact
//! - DELETE /api/fact/facts/{uuid}   — delete a fact

use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use memoria_core::facts;
use memoria_core::{Fact, FactPayload, MemoriaConfig, Page, PageSize, StoreHandle};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::error::{handle_panic, ApiError, ApiResult, FactAction};

pub const FACTS_PATH: &str = "/api/fact/facts";
pub const OPENAPI_PATH: &str = "/api/swagger.json";

const DEFAULT_PAGE: u32 = 1;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub store: StoreHandle,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Memoria Fact api",
        version = "1.0",
        description = "Manages a set of Fact resources."
    ),
    paths(list_handler, create_handler, get_handler, update_handler, delete_handler),
    components(schemas(Fact, FactPayload)),
    tags(
        (name = "fact", description = "Operations related to facts")
    )
)]
pub struct ApiDoc;

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    let collection = get(list_handler).post(create_handler);

    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route(OPENAPI_PATH, get(openapi_handler))
        .route(FACTS_PATH, collection.clone())
        .route(&format!("{}/", FACTS_PATH), collection)
        .route(
            &format!("{}/:uuid", FACTS_PATH),
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .fallback(fallback_handler)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    store: StoreHandle,
    config: MemoriaConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = config.http.bind_addr();
    let state = Arc::new(HttpState { store });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Memoria HTTP API listening on http://{}/api/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Raw pagination query. Values stay strings until [`parse_list_params`]
/// so a bad value is reported against its own field.
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Validate pagination arguments: `page` is a positive integer (default 1),
/// `per_page` one of the allowed page sizes (default 10).
pub fn parse_list_params(params: &ListParams) -> ApiResult<(u32, PageSize)> {
    let page = match params.page.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_PAGE,
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => {
                return Err(ApiError::validation(
                    "page",
                    format!("Page number: '{}' is not a positive integer", raw),
                ))
            }
        },
    };

    let per_page = match params.per_page.as_deref().map(str::trim) {
        None | Some("") => PageSize::default(),
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .and_then(|n| PageSize::try_from(n).ok())
            .ok_or_else(|| {
                ApiError::validation(
                    "per_page",
                    format!(
                        "Results per page: '{}' is not a valid choice, expected one of {:?}",
                        raw,
                        PageSize::CHOICES
                    ),
                )
            })?,
    };

    Ok((page, per_page))
}

fn payload_from(payload: Result<Json<FactPayload>, JsonRejection>) -> ApiResult<FactPayload> {
    payload
        .map(|Json(p)| p)
        .map_err(|rejection| ApiError::validation("payload", rejection.body_text()))
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

pub async fn list_inner(store: &StoreHandle, params: &ListParams) -> ApiResult<Page<Fact>> {
    let (page, per_page) = parse_list_params(params)?;
    Ok(facts::list_facts(store.as_ref(), page, per_page).await?)
}

pub async fn create_inner(store: &StoreHandle, payload: FactPayload) -> ApiResult<Fact> {
    Ok(facts::create_fact(store.as_ref(), payload).await?)
}

pub async fn get_inner(store: &StoreHandle, uuid: &str) -> ApiResult<Fact> {
    facts::get_fact(store.as_ref(), uuid)
        .await
        .map_err(|e| ApiError::from_fact_error(e, uuid, FactAction::Get))
}

pub async fn update_inner(store: &StoreHandle, uuid: &str, payload: FactPayload) -> ApiResult<()> {
    facts::update_fact(store.as_ref(), uuid, payload)
        .await
        .map_err(|e| ApiError::from_fact_error(e, uuid, FactAction::Update))
}

pub async fn delete_inner(store: &StoreHandle, uuid: &str) -> ApiResult<()> {
    facts::delete_fact(store.as_ref(), uuid)
        .await
        .map_err(|e| ApiError::from_fact_error(e, uuid, FactAction::Delete))
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "api": "1.0",
    })
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    get,
    path = "/api/fact/facts/",
    tag = "fact",
    params(
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("per_page" = Option<u32>, Query, description = "Results per page: 1, 10, 100 or 1000")
    ),
    responses(
        (status = 200, description = "A page of facts", body = Page<Fact>),
        (status = 400, description = "Invalid pagination arguments")
    )
)]
pub async fn list_handler(
    State(state): State<Arc<HttpState>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Page<Fact>>> {
    let Query(params) =
        query.map_err(|rejection| ApiError::validation("query", rejection.body_text()))?;
    let page = list_inner(&state.store, &params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/fact/facts/",
    tag = "fact",
    request_body = FactPayload,
    responses(
        (status = 201, description = "Fact successfully created.", body = Fact),
        (status = 400, description = "Input payload validation failed")
    )
)]
pub async fn create_handler(
    State(state): State<Arc<HttpState>>,
    payload: Result<Json<FactPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Fact>)> {
    let fact = create_inner(&state.store, payload_from(payload)?).await?;
    Ok((StatusCode::CREATED, Json(fact)))
}

#[utoipa::path(
    get,
    path = "/api/fact/facts/{uuid}",
    tag = "fact",
    params(("uuid" = String, Path, description = "Fact identifier")),
    responses(
        (status = 200, description = "The fact", body = Fact),
        (status = 404, description = "Fact not found.")
    )
)]
pub async fn get_handler(
    State(state): State<Arc<HttpState>>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<Fact>> {
    Ok(Json(get_inner(&state.store, &uuid).await?))
}

#[utoipa::path(
    put,
    path = "/api/fact/facts/{uuid}",
    tag = "fact",
    params(("uuid" = String, Path, description = "Fact identifier")),
    request_body = FactPayload,
    responses(
        (status = 204, description = "Fact successfully updated."),
        (status = 400, description = "Input payload validation failed"),
        (status = 404, description = "Fact not found.")
    )
)]
pub async fn update_handler(
    State(state): State<Arc<HttpState>>,
    Path(uuid): Path<String>,
    payload: Result<Json<FactPayload>, JsonRejection>,
) -> ApiResult<StatusCode> {
    update_inner(&state.store, &uuid, payload_from(payload)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/fact/facts/{uuid}",
    tag = "fact",
    params(("uuid" = String, Path, description = "Fact identifier")),
    responses(
        (status = 204, description = "Fact successfully deleted."),
        (status = 404, description = "Fact not found.")
    )
)]
pub async fn delete_handler(
    State(state): State<Arc<HttpState>>,
    Path(uuid): Path<String>,
) -> ApiResult<StatusCode> {
    delete_inner(&state.store, &uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn fallback_handler() -> ApiError {
    ApiError::NoRoute
}

// ============================================================================
// Unit Tests — call inner functions directly
// ============================================================================
