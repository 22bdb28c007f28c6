//! HTTP request handlers.
//!
//! One submodule per resource. Every handler locks the store for the whole
//! request; handlers that distribute also lock the distributor, always after
//! the store.

mod contacts;
mod leads;
mod operators;
mod sources;
mod stats;

use crate::config::ServerConfig;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use leadflow_domain::traits::AdminStore;
use leadflow_engine::{Distributor, EngineError};
use leadflow_store::{SqliteStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;
use validator::ValidationErrors;

/// Service identity reported on the root endpoint
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    /// Service name
    pub name: String,
    /// Description
    pub description: String,
    /// Version
    pub version: String,
    /// Mount point of the API routes
    pub api_prefix: String,
}

impl From<&ServerConfig> for ServiceInfo {
    fn from(config: &ServerConfig) -> Self {
        ServiceInfo {
            name: config.app_name.clone(),
            description: config.app_description.clone(),
            version: config.app_version.clone(),
            api_prefix: config.api_prefix.clone(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The database; one request at a time, only touched through
    /// [`AppState::with_store`] and [`AppState::with_distributor`]
    pub store: Arc<Mutex<SqliteStore>>,
    /// Distribution engine with its random source
    pub distributor: Arc<Mutex<Distributor>>,
    /// Service identity
    pub service: Arc<ServiceInfo>,
}

impl AppState {
    /// Wrap an opened store
    pub fn new(store: SqliteStore, service: ServiceInfo) -> Self {
        AppState {
            store: Arc::new(Mutex::new(store)),
            distributor: Arc::new(Mutex::new(Distributor::new())),
            service: Arc::new(service),
        }
    }

    /// Run store work on the blocking pool while holding the store lock
    ///
    /// SQLite calls block, for up to the store's busy timeout when another
    /// process holds the write lock, so they never run on an async worker.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut SqliteStore) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let mut store = Arc::clone(&self.store).lock_owned().await;

        tokio::task::spawn_blocking(move || f(&mut *store))
            .await
            .map_err(join_error)?
    }

    /// Like [`AppState::with_store`], also holding the distributor
    ///
    /// The store is always locked before the distributor.
    pub async fn with_distributor<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut SqliteStore, &mut Distributor) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let mut store = Arc::clone(&self.store).lock_owned().await;
        let mut distributor = Arc::clone(&self.distributor).lock_owned().await;

        tokio::task::spawn_blocking(move || f(&mut *store, &mut *distributor))
            .await
            .map_err(join_error)?
    }
}

fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError::InternalError(format!("Store task failed: {}", e))
}

/// Root endpoint response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    /// "<name> API"
    pub message: String,
    /// Service description
    pub description: String,
    /// Service version
    pub version: String,
    /// Where the API routes are mounted
    pub api: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Referenced entity does not exist
    NotFound(String),
    /// Uniqueness conflict
    Conflict(String),
    /// Request body failed validation
    Validation(String),
    /// Internal server error
    InternalError(String),
}

impl AppError {
    pub(crate) fn not_found(entity: &str, id: i64) -> Self {
        AppError::NotFound(format!("{} {} not found", entity, id))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InternalError(msg) => {
                error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => AppError::NotFound(e.to_string()),
            StoreError::Conflict(_) => AppError::Conflict(e.to_string()),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::NotFound { .. } => AppError::NotFound(e.to_string()),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// GET / - Service identity
async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let service = &state.service;
    let api = if service.api_prefix.is_empty() {
        "/".to_string()
    } else {
        service.api_prefix.clone()
    };

    Json(RootResponse {
        message: format!("{} API", service.name),
        description: service.description.clone(),
        version: service.version.clone(),
        api,
    })
}

/// GET /health - Store round-trip
async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthCheckResponse>, AppError> {
    state
        .with_store(|store| Ok(store.list_sources(0, 1)?))
        .await?;

    Ok(Json(HealthCheckResponse {
        status: "healthy".to_string(),
    }))
}

/// Create the axum router with all routes
///
/// `/` and `/health` always sit at the root; resource routes are nested under
/// `api_prefix` when it is non-empty.
pub fn create_router(state: AppState, api_prefix: &str) -> AxumRouter {
    let api = AxumRouter::new()
        .route(
            "/operators",
            post(operators::create_operator).get(operators::list_operators),
        )
        .route(
            "/operators/:id",
            get(operators::get_operator)
                .patch(operators::update_operator)
                .delete(operators::delete_operator),
        )
        .route(
            "/sources",
            post(sources::create_source).get(sources::list_sources),
        )
        .route("/sources/:id", get(sources::get_source))
        .route(
            "/sources/:id/distribution",
            post(sources::set_distribution).get(sources::get_distribution),
        )
        .route(
            "/contacts",
            post(contacts::create_contact).get(contacts::list_contacts),
        )
        .route("/contacts/:id", get(contacts::get_contact))
        .route("/contacts/:id/close", post(contacts::close_contact))
        .route("/leads", get(leads::list_leads))
        .route("/leads/:id", get(leads::get_lead))
        .route("/leads/:id/contacts", get(leads::lead_contacts))
        .route("/stats/contacts", get(stats::contact_stats))
        .route("/stats/distribution", get(stats::distribution_stats));

    let app = AxumRouter::new()
        .route("/", get(root))
        .route("/health", get(health_check));

    let app = if api_prefix.is_empty() {
        app.merge(api)
    } else {
        app.nest(api_prefix, api)
    };

    app.with_state(state)
}
