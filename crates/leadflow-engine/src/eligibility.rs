//! Eligibility filter

use crate::current_load;
use leadflow_domain::traits::DistributionStore;
use leadflow_domain::{Operator, OperatorId, SourceId};
use std::collections::HashMap;
use tracing::debug;

/// An operator that may receive the next contact from a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleOperator {
    /// The operator
    pub operator: Operator,

    /// Configured weight for the source
    pub weight: u32,

    /// Active contacts at the time of the check
    pub current_load: u32,
}

/// Operators that can take a contact from `source_id` right now
///
/// An operator is eligible when it has a weight row for the source, is active,
/// and its current load is strictly below its capacity. Candidates come back
/// in weight-row order. An empty result is normal: the source has no policy or
/// every configured operator is inactive or saturated.
///
/// The caller is responsible for `source_id` referring to an existing source.
pub fn eligible_operators<S: DistributionStore>(
    store: &S,
    source_id: SourceId,
) -> Result<Vec<EligibleOperator>, S::Error> {
    let weights = store.weights_for_source(source_id)?;
    if weights.is_empty() {
        debug!("Source {} has no distribution policy", source_id);
        return Ok(Vec::new());
    }

    let ids: Vec<OperatorId> = weights.iter().map(|w| w.operator_id).collect();
    let operators: HashMap<OperatorId, Operator> = store
        .operators_by_ids(&ids)?
        .into_iter()
        .map(|op| (op.id, op))
        .collect();

    let mut eligible = Vec::with_capacity(weights.len());
    for row in &weights {
        let Some(operator) = operators.get(&row.operator_id) else {
            continue;
        };

        if !operator.is_active {
            debug!("Operator {} skipped: inactive", operator.id);
            continue;
        }

        let load = current_load(store, operator.id)?;
        if !operator.has_capacity(load) {
            debug!(
                "Operator {} skipped: load {}/{}",
                operator.id, load, operator.max_load
            );
            continue;
        }

        eligible.push(EligibleOperator {
            operator: operator.clone(),
            weight: row.weight,
            current_load: load,
        });
    }

    debug!(
        "Source {}: {} of {} configured operators eligible",
        source_id,
        eligible.len(),
        weights.len()
    );
    Ok(eligible)
}
