//! Lead module

use crate::LeadId;

/// A person identified by a stable external key across many contact events
///
/// Leads are created on first sight of an `external_id` and never updated:
/// contact channels from later events do not overwrite the stored ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    /// Unique identifier
    pub id: LeadId,

    /// Externally supplied unique key
    pub external_id: String,

    /// Phone number, if supplied on the first contact
    pub phone: Option<String>,

    /// Email address, if supplied on the first contact
    pub email: Option<String>,

    /// When this lead was first seen (timestamp)
    pub created_at: u64,
}

/// Fields required to create a lead
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    /// Externally supplied unique key
    pub external_id: String,

    /// Phone number
    pub phone: Option<String>,

    /// Email address
    pub email: Option<String>,
}
