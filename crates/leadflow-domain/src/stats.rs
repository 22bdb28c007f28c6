//! Aggregated contact counts for reporting

use crate::{OperatorId, SourceId};

/// Number of contacts attributed to one named entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount<Id> {
    /// Entity identifier
    pub id: Id,

    /// Entity display name
    pub name: String,

    /// Number of contacts
    pub count: u64,
}

/// Contact totals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactStats {
    /// All contacts ever registered
    pub total_contacts: u64,

    /// Contacts per source (sources without contacts are omitted)
    pub by_source: Vec<GroupCount<SourceId>>,

    /// Contacts per operator (unassigned contacts are omitted)
    pub by_operator: Vec<GroupCount<OperatorId>>,
}

/// Number of contacts a source routed to one operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionCell {
    /// Source identifier
    pub source_id: SourceId,

    /// Source name
    pub source_name: String,

    /// Operator identifier
    pub operator_id: OperatorId,

    /// Operator name
    pub operator_name: String,

    /// Number of contacts
    pub count: u64,
}
