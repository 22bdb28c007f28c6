//! Operator management

use super::{AppError, AppState};
use crate::schemas::{MessageResponse, OperatorCreate, OperatorPatch, OperatorResponse, Pagination};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use leadflow_domain::traits::{AdminStore, DistributionStore};
use leadflow_domain::{OperatorId, OperatorUpdate};
use leadflow_engine::current_load;
use tracing::info;
use validator::Validate;

/// POST /operators
pub(crate) async fn create_operator(
    State(state): State<AppState>,
    Json(request): Json<OperatorCreate>,
) -> Result<Json<OperatorResponse>, AppError> {
    request.validate()?;

    let operator = state
        .with_store(move |store| Ok(store.create_operator(request.into())?))
        .await?;
    info!(
        "Created operator {} '{}' (max_load {})",
        operator.id, operator.name, operator.max_load
    );

    Ok(Json(OperatorResponse::from(operator).with_load(0)))
}

/// GET /operators - Each entry carries its current load
pub(crate) async fn list_operators(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<OperatorResponse>>, AppError> {
    let response = state
        .with_store(move |store| {
            let operators = store.list_operators(page.skip, page.limit)?;

            let mut response = Vec::with_capacity(operators.len());
            for operator in operators {
                let load = current_load(&*store, operator.id)?;
                response.push(OperatorResponse::from(operator).with_load(load));
            }
            Ok(response)
        })
        .await?;

    Ok(Json(response))
}

/// GET /operators/{id}
pub(crate) async fn get_operator(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OperatorResponse>, AppError> {
    let response = state
        .with_store(move |store| {
            let operator = store
                .get_operator(OperatorId::from_value(id))?
                .ok_or_else(|| AppError::not_found("Operator", id))?;
            let load = current_load(&*store, operator.id)?;
            Ok(OperatorResponse::from(operator).with_load(load))
        })
        .await?;

    Ok(Json(response))
}

/// PATCH /operators/{id} - Only fields present in the body change
pub(crate) async fn update_operator(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<OperatorPatch>,
) -> Result<Json<OperatorResponse>, AppError> {
    patch.validate()?;
    let update = OperatorUpdate::from(patch);

    let (operator, load) = state
        .with_store(move |store| {
            let operator = store
                .update_operator(OperatorId::from_value(id), &update)?
                .ok_or_else(|| AppError::not_found("Operator", id))?;
            let load = current_load(&*store, operator.id)?;
            Ok((operator, load))
        })
        .await?;

    // Lowering capacity below the current load does not reassign anything
    info!(
        "Updated operator {}: active={} max_load={} load={}",
        operator.id, operator.is_active, operator.max_load, load
    );

    Ok(Json(OperatorResponse::from(operator).with_load(load)))
}

/// DELETE /operators/{id}
pub(crate) async fn delete_operator(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = state
        .with_store(move |store| Ok(store.delete_operator(OperatorId::from_value(id))?))
        .await?;
    if !deleted {
        return Err(AppError::not_found("Operator", id));
    }
    info!("Deleted operator {}", id);

    Ok(Json(MessageResponse {
        message: "Operator deleted".to_string(),
    }))
}
