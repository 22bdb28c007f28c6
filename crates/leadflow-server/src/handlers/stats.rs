//! Reporting

use super::{AppError, AppState};
use crate::schemas::ContactStatsResponse;
use axum::extract::State;
use axum::response::Json;
use leadflow_domain::traits::AdminStore;
use std::collections::BTreeMap;

/// GET /stats/contacts - Totals keyed by source and operator name
///
/// Names are not unique, so groups sharing a name are summed.
pub(crate) async fn contact_stats(
    State(state): State<AppState>,
) -> Result<Json<ContactStatsResponse>, AppError> {
    let stats = state
        .with_store(|store| Ok(store.contact_stats()?))
        .await?;

    let mut contacts_by_source: BTreeMap<String, u64> = BTreeMap::new();
    for group in stats.by_source {
        *contacts_by_source.entry(group.name).or_default() += group.count;
    }

    let mut contacts_by_operator: BTreeMap<String, u64> = BTreeMap::new();
    for group in stats.by_operator {
        *contacts_by_operator.entry(group.name).or_default() += group.count;
    }

    Ok(Json(ContactStatsResponse {
        total_contacts: stats.total_contacts,
        contacts_by_source,
        contacts_by_operator,
    }))
}

/// GET /stats/distribution - source name -> operator name -> contacts
///
/// Unassigned contacts are not counted.
pub(crate) async fn distribution_stats(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, BTreeMap<String, u64>>>, AppError> {
    let cells = state
        .with_store(|store| Ok(store.distribution_stats()?))
        .await?;

    let mut result: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    for cell in cells {
        *result
            .entry(cell.source_name)
            .or_default()
            .entry(cell.operator_name)
            .or_default() += cell.count;
    }

    Ok(Json(result))
}
