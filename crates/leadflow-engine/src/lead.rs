//! Lead resolution (upsert by external id)

use crate::EngineError;
use leadflow_domain::traits::{DistributionStore, LeadInsert};
use leadflow_domain::{Lead, NewLead};
use std::fmt::Display;
use tracing::{debug, warn};

/// Map an external id to its lead, creating the lead on first sight
///
/// An existing lead is returned unmodified: `phone` and `email` are only used
/// when the lead is created (first write wins).
///
/// Safe to call concurrently with the same `external_id`. If another writer
/// inserts the lead between the lookup and the insert, the store reports the
/// uniqueness conflict and the winner's row is re-read and returned.
pub fn resolve_lead<S>(
    store: &mut S,
    external_id: &str,
    phone: Option<String>,
    email: Option<String>,
) -> Result<Lead, EngineError>
where
    S: DistributionStore,
    S::Error: Display,
{
    if let Some(lead) = store
        .find_lead_by_external_id(external_id)
        .map_err(EngineError::store)?
    {
        debug!("Lead {} found for external id '{}'", lead.id, external_id);
        return Ok(lead);
    }

    let inserted = store
        .insert_lead(NewLead {
            external_id: external_id.to_string(),
            phone,
            email,
        })
        .map_err(EngineError::store)?;

    match inserted {
        LeadInsert::Created(lead) => {
            debug!("Lead {} created for external id '{}'", lead.id, external_id);
            Ok(lead)
        }
        LeadInsert::AlreadyExists => {
            warn!(
                "Concurrent creation of lead '{}', using the existing row",
                external_id
            );
            store
                .find_lead_by_external_id(external_id)
                .map_err(EngineError::store)?
                .ok_or_else(|| {
                    EngineError::Store(format!(
                        "lead '{}' reported as existing but could not be read back",
                        external_id
                    ))
                })
        }
    }
}
