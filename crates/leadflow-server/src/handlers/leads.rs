//! Lead lookup

use super::contacts::expand_all;
use super::{AppError, AppState};
use crate::schemas::{ContactResponse, LeadResponse, Pagination};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use leadflow_domain::traits::{AdminStore, DistributionStore};
use leadflow_domain::{ContactFilter, LeadId};

/// GET /leads
pub(crate) async fn list_leads(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<LeadResponse>>, AppError> {
    let leads = state
        .with_store(move |store| Ok(store.list_leads(page.skip, page.limit)?))
        .await?;

    Ok(Json(leads.into_iter().map(Into::into).collect()))
}

/// GET /leads/{id}
pub(crate) async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LeadResponse>, AppError> {
    let lead = state
        .with_store(move |store| {
            store
                .get_lead(LeadId::from_value(id))?
                .ok_or_else(|| AppError::not_found("Lead", id))
        })
        .await?;

    Ok(Json(lead.into()))
}

/// GET /leads/{id}/contacts - Full contact history of one lead
pub(crate) async fn lead_contacts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    let lead_id = LeadId::from_value(id);

    let response = state
        .with_store(move |store| {
            if store.get_lead(lead_id)?.is_none() {
                return Err(AppError::not_found("Lead", id));
            }

            let filter = ContactFilter {
                lead_id: Some(lead_id),
                limit: u32::MAX,
                ..ContactFilter::default()
            };
            let contacts = store.list_contacts(&filter)?;
            expand_all(store, contacts)
        })
        .await?;

    Ok(Json(response))
}
