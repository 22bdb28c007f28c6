//! Trait definitions for external interactions
//!
//! These traits define the boundary between the distribution logic and persistence.
//! Implementations live in other crates (leadflow-store).

use crate::{
    Contact, ContactFilter, ContactId, ContactStats, DistributionCell, Lead, LeadId, NewContact,
    NewLead, NewOperator, NewSource, Operator, OperatorId, OperatorUpdate, Source, SourceId,
    SourceOperatorWeight, WeightAssignment,
};

/// Outcome of inserting a lead keyed by its external id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadInsert {
    /// A new row was written
    Created(Lead),

    /// Another writer already holds this external id; nothing was written
    AlreadyExists,
}

/// Storage operations the distribution engine depends on
///
/// Implemented by the infrastructure layer (leadflow-store)
pub trait DistributionStore {
    /// Error type for store operations
    type Error;

    /// Get a source by ID
    fn get_source(&self, id: SourceId) -> Result<Option<Source>, Self::Error>;

    /// Get an operator by ID
    fn get_operator(&self, id: OperatorId) -> Result<Option<Operator>, Self::Error>;

    /// Get a lead by ID
    fn get_lead(&self, id: LeadId) -> Result<Option<Lead>, Self::Error>;

    /// All weight rows configured for a source, in insertion order
    fn weights_for_source(&self, source_id: SourceId)
        -> Result<Vec<SourceOperatorWeight>, Self::Error>;

    /// Operators with the given IDs (missing IDs are skipped)
    fn operators_by_ids(&self, ids: &[OperatorId]) -> Result<Vec<Operator>, Self::Error>;

    /// Number of active contacts currently assigned to an operator
    fn count_active_contacts(&self, operator_id: OperatorId) -> Result<u32, Self::Error>;

    /// Look up a lead by its external key
    fn find_lead_by_external_id(&self, external_id: &str) -> Result<Option<Lead>, Self::Error>;

    /// Insert a lead, reporting a uniqueness conflict on `external_id` instead of failing
    fn insert_lead(&mut self, lead: NewLead) -> Result<LeadInsert, Self::Error>;

    /// Insert a contact
    fn insert_contact(&mut self, contact: NewContact) -> Result<Contact, Self::Error>;

    /// Run `f` as one atomic unit of work
    ///
    /// Everything `f` writes is committed when it returns `Ok` and rolled back
    /// when it returns `Err`.
    fn in_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<Self::Error>;
}

/// Administrative operations around the distribution core
///
/// These are plain persistence pass-throughs used by the HTTP layer.
pub trait AdminStore: DistributionStore {
    /// Create an operator
    fn create_operator(&mut self, operator: NewOperator) -> Result<Operator, Self::Error>;

    /// List operators ordered by ID
    fn list_operators(&self, skip: u32, limit: u32) -> Result<Vec<Operator>, Self::Error>;

    /// Apply a partial update; `None` if the operator does not exist
    fn update_operator(
        &mut self,
        id: OperatorId,
        update: &OperatorUpdate,
    ) -> Result<Option<Operator>, Self::Error>;

    /// Delete an operator and its weight rows; `false` if it did not exist
    ///
    /// Contacts keep existing and lose their assignment.
    fn delete_operator(&mut self, id: OperatorId) -> Result<bool, Self::Error>;

    /// Create a source
    fn create_source(&mut self, source: NewSource) -> Result<Source, Self::Error>;

    /// List sources ordered by ID
    fn list_sources(&self, skip: u32, limit: u32) -> Result<Vec<Source>, Self::Error>;

    /// Replace the whole distribution policy of a source
    fn replace_weights(
        &mut self,
        source_id: SourceId,
        weights: &[WeightAssignment],
    ) -> Result<Vec<SourceOperatorWeight>, Self::Error>;

    /// List leads ordered by ID
    fn list_leads(&self, skip: u32, limit: u32) -> Result<Vec<Lead>, Self::Error>;

    /// List contacts matching a filter, ordered by ID
    fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>, Self::Error>;

    /// Get a contact by ID
    fn get_contact(&self, id: ContactId) -> Result<Option<Contact>, Self::Error>;

    /// Mark a contact closed; `None` if it does not exist
    fn close_contact(&mut self, id: ContactId) -> Result<Option<Contact>, Self::Error>;

    /// Contact totals per source and per operator
    fn contact_stats(&self) -> Result<ContactStats, Self::Error>;

    /// Contact counts per (source, operator) pair
    fn distribution_stats(&self) -> Result<Vec<DistributionCell>, Self::Error>;
}
