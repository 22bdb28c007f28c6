//! Contact registration and lookup

use super::{AppError, AppState};
use crate::schemas::{ContactCreate, ContactQuery, ContactResponse};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use leadflow_domain::traits::{AdminStore, DistributionStore};
use leadflow_domain::{Contact, ContactFilter, ContactId, SourceId};
use leadflow_engine::ContactRequest;
use leadflow_store::SqliteStore;
use validator::Validate;

/// Resolve a contact's lead, source and operator
pub(super) fn expand_contact(
    store: &SqliteStore,
    contact: Contact,
) -> Result<ContactResponse, AppError> {
    let lead = store.get_lead(contact.lead_id)?.ok_or_else(|| {
        AppError::InternalError(format!(
            "contact {} references missing lead {}",
            contact.id, contact.lead_id
        ))
    })?;
    let source = store.get_source(contact.source_id)?.ok_or_else(|| {
        AppError::InternalError(format!(
            "contact {} references missing source {}",
            contact.id, contact.source_id
        ))
    })?;
    let operator = match contact.operator_id {
        Some(id) => store.get_operator(id)?,
        None => None,
    };

    Ok(ContactResponse::new(contact, lead, source, operator))
}

pub(super) fn expand_all(
    store: &SqliteStore,
    contacts: Vec<Contact>,
) -> Result<Vec<ContactResponse>, AppError> {
    contacts
        .into_iter()
        .map(|contact| expand_contact(store, contact))
        .collect()
}

/// POST /contacts - Register an inbound contact and assign it
///
/// The lead is created on first sight of `external_id`. The contact is stored
/// even when no operator can take it.
pub(crate) async fn create_contact(
    State(state): State<AppState>,
    Json(request): Json<ContactCreate>,
) -> Result<Json<ContactResponse>, AppError> {
    request.validate()?;

    let contact = ContactRequest {
        external_id: request.external_id,
        source_id: SourceId::from_value(request.source_id),
        phone: request.phone,
        email: request.email,
    };

    let assignment = state
        .with_distributor(move |store, distributor| Ok(distributor.distribute(store, contact)?))
        .await?;

    Ok(Json(ContactResponse::new(
        assignment.contact,
        assignment.lead,
        assignment.source,
        assignment.operator,
    )))
}

/// GET /contacts
pub(crate) async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<ContactQuery>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    let filter = ContactFilter::from(query);

    let response = state
        .with_store(move |store| {
            let contacts = store.list_contacts(&filter)?;
            expand_all(store, contacts)
        })
        .await?;

    Ok(Json(response))
}

/// GET /contacts/{id}
pub(crate) async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContactResponse>, AppError> {
    let response = state
        .with_store(move |store| {
            let contact = store
                .get_contact(ContactId::from_value(id))?
                .ok_or_else(|| AppError::not_found("Contact", id))?;
            expand_contact(store, contact)
        })
        .await?;

    Ok(Json(response))
}

/// POST /contacts/{id}/close - The operator's capacity is freed immediately
pub(crate) async fn close_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContactResponse>, AppError> {
    let response = state
        .with_store(move |store| {
            let contact = store
                .close_contact(ContactId::from_value(id))?
                .ok_or_else(|| AppError::not_found("Contact", id))?;
            expand_contact(store, contact)
        })
        .await?;

    Ok(Json(response))
}
