//! Load accounting

use leadflow_domain::traits::DistributionStore;
use leadflow_domain::OperatorId;

/// Number of active contacts currently assigned to an operator
///
/// Always recomputed from the store. Concurrent distributions and closures change
/// the value between calls, so no result of this function may be cached.
pub fn current_load<S: DistributionStore>(
    store: &S,
    operator_id: OperatorId,
) -> Result<u32, S::Error> {
    store.count_active_contacts(operator_id)
}
