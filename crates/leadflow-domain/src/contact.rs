//! Contact module - one routed inbound event

use crate::{ContactId, LeadId, OperatorId, SourceId};

/// Status of a contact
///
/// Only active contacts count toward an operator's load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactStatus {
    /// Being handled (or waiting for an operator)
    Active,

    /// Finished; no longer occupies operator capacity
    Closed,
}

impl ContactStatus {
    /// Get the status name as stored and serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Active => "active",
            ContactStatus::Closed => "closed",
        }
    }

    /// Parse a status from its stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ContactStatus::Active),
            "closed" => Some(ContactStatus::Closed),
            _ => None,
        }
    }
}

impl std::str::FromStr for ContactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid contact status: {}", s))
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound event from a source
///
/// The operator is chosen once, when the contact is created. `None` means no
/// operator was eligible at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Unique identifier
    pub id: ContactId,

    /// Lead the event belongs to
    pub lead_id: LeadId,

    /// Source that produced the event
    pub source_id: SourceId,

    /// Assigned operator, if any
    pub operator_id: Option<OperatorId>,

    /// Current status
    pub status: ContactStatus,

    /// When the event was registered (timestamp)
    pub created_at: u64,
}

/// Fields required to create a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewContact {
    /// Lead the event belongs to
    pub lead_id: LeadId,

    /// Source that produced the event
    pub source_id: SourceId,

    /// Assigned operator, if any
    pub operator_id: Option<OperatorId>,

    /// Initial status
    pub status: ContactStatus,
}

/// Filter for listing contacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactFilter {
    /// Only contacts of this lead
    pub lead_id: Option<LeadId>,

    /// Only contacts from this source
    pub source_id: Option<SourceId>,

    /// Only contacts assigned to this operator
    pub operator_id: Option<OperatorId>,

    /// Rows to skip
    pub skip: u32,

    /// Maximum rows to return
    pub limit: u32,
}

impl Default for ContactFilter {
    fn default() -> Self {
        Self {
            lead_id: None,
            source_id: None,
            operator_id: None,
            skip: 0,
            limit: 100,
        }
    }
}
