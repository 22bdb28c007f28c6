//! Source module - channels producing contact events and their distribution policy

use crate::{OperatorId, SourceId, WeightId};

/// A channel (bot, form, landing page) that produces contact events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Unique identifier
    pub id: SourceId,

    /// Unique name
    pub name: String,

    /// When this source was created (timestamp)
    pub created_at: u64,
}

/// Fields required to create a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSource {
    /// Unique name
    pub name: String,
}

/// One row of a source's distribution policy
///
/// At most one row exists per (source, operator) pair. A weight of zero keeps the
/// operator configured for the source but gives it no probability mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOperatorWeight {
    /// Row identifier
    pub id: WeightId,

    /// Source the policy belongs to
    pub source_id: SourceId,

    /// Operator receiving a share of the traffic
    pub operator_id: OperatorId,

    /// Relative share
    pub weight: u32,
}

/// One entry of a policy replacement request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightAssignment {
    /// Operator receiving a share of the traffic
    pub operator_id: OperatorId,

    /// Relative share
    pub weight: u32,
}

impl WeightAssignment {
    /// Find the first operator that appears more than once in a policy
    pub fn first_duplicate(assignments: &[WeightAssignment]) -> Option<OperatorId> {
        let mut seen = std::collections::HashSet::new();
        assignments
            .iter()
            .map(|a| a.operator_id)
            .find(|id| !seen.insert(*id))
    }
}
