//! Sources and their distribution policies

use super::{AppError, AppState};
use crate::schemas::{DistributionConfig, Pagination, SourceCreate, SourceResponse, WeightResponse};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use leadflow_domain::traits::{AdminStore, DistributionStore};
use leadflow_domain::{SourceId, WeightAssignment};
use tracing::info;
use validator::Validate;

/// POST /sources - 409 if the name is taken
pub(crate) async fn create_source(
    State(state): State<AppState>,
    Json(request): Json<SourceCreate>,
) -> Result<Json<SourceResponse>, AppError> {
    request.validate()?;

    let source = state
        .with_store(move |store| Ok(store.create_source(request.into())?))
        .await?;
    info!("Created source {} '{}'", source.id, source.name);

    Ok(Json(source.into()))
}

/// GET /sources
pub(crate) async fn list_sources(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<SourceResponse>>, AppError> {
    let sources = state
        .with_store(move |store| Ok(store.list_sources(page.skip, page.limit)?))
        .await?;

    Ok(Json(sources.into_iter().map(Into::into).collect()))
}

/// GET /sources/{id}
pub(crate) async fn get_source(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SourceResponse>, AppError> {
    let source = state
        .with_store(move |store| {
            store
                .get_source(SourceId::from_value(id))?
                .ok_or_else(|| AppError::not_found("Source", id))
        })
        .await?;

    Ok(Json(source.into()))
}

/// POST /sources/{id}/distribution - Replace the whole policy
///
/// Either every row is written or the previous policy stays untouched.
pub(crate) async fn set_distribution(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(config): Json<DistributionConfig>,
) -> Result<Json<Vec<WeightResponse>>, AppError> {
    let assignments = config.assignments();
    if let Some(duplicate) = WeightAssignment::first_duplicate(&assignments) {
        return Err(AppError::Validation(format!(
            "operator {} listed more than once",
            duplicate
        )));
    }

    let rows = state
        .with_store(move |store| Ok(store.replace_weights(SourceId::from_value(id), &assignments)?))
        .await?;
    info!(
        "Source {} distribution replaced with {} operators",
        id,
        rows.len()
    );

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET /sources/{id}/distribution
pub(crate) async fn get_distribution(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<WeightResponse>>, AppError> {
    let source_id = SourceId::from_value(id);

    let rows = state
        .with_store(move |store| {
            if store.get_source(source_id)?.is_none() {
                return Err(AppError::not_found("Source", id));
            }
            Ok(store.weights_for_source(source_id)?)
        })
        .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
