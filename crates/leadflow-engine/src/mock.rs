//! In-memory store for unit tests

use leadflow_domain::traits::{DistributionStore, LeadInsert};
use leadflow_domain::{
    Contact, ContactId, ContactStatus, Lead, LeadId, NewContact, NewLead, Operator, OperatorId,
    Source, SourceId, SourceOperatorWeight, WeightId,
};
use std::collections::HashSet;

#[derive(Clone, Default)]
struct Tables {
    operators: Vec<Operator>,
    sources: Vec<Source>,
    weights: Vec<SourceOperatorWeight>,
    leads: Vec<Lead>,
    contacts: Vec<Contact>,
}

/// Vec-backed store with hooks for simulating races and failures
#[derive(Default)]
pub(crate) struct MockStore {
    tables: Tables,
    next_id: i64,
    /// External ids for which another writer wins the insert race
    pub(crate) lose_lead_race: HashSet<String>,
    /// Make every contact insert fail
    pub(crate) fail_contact_insert: bool,
}

impl MockStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn add_operator(&mut self, name: &str, is_active: bool, max_load: u32) -> OperatorId {
        let id = OperatorId::from_value(self.next_id());
        self.tables.operators.push(Operator {
            id,
            name: name.to_string(),
            is_active,
            max_load,
            created_at: 0,
        });
        id
    }

    pub(crate) fn add_source(&mut self, name: &str) -> SourceId {
        let id = SourceId::from_value(self.next_id());
        self.tables.sources.push(Source {
            id,
            name: name.to_string(),
            created_at: 0,
        });
        id
    }

    pub(crate) fn set_weight(&mut self, source_id: SourceId, operator_id: OperatorId, weight: u32) {
        let id = WeightId::from_value(self.next_id());
        self.tables.weights.push(SourceOperatorWeight {
            id,
            source_id,
            operator_id,
            weight,
        });
    }

    /// Add a contact for a throwaway lead and source
    pub(crate) fn add_contact(
        &mut self,
        operator_id: Option<OperatorId>,
        status: ContactStatus,
    ) -> ContactId {
        let id = ContactId::from_value(self.next_id());
        self.tables.contacts.push(Contact {
            id,
            lead_id: LeadId::from_value(0),
            source_id: SourceId::from_value(0),
            operator_id,
            status,
            created_at: 0,
        });
        id
    }

    pub(crate) fn set_status(&mut self, id: ContactId, status: ContactStatus) {
        if let Some(contact) = self.tables.contacts.iter_mut().find(|c| c.id == id) {
            contact.status = status;
        }
    }

    pub(crate) fn leads(&self) -> &[Lead] {
        &self.tables.leads
    }

    pub(crate) fn contacts(&self) -> &[Contact] {
        &self.tables.contacts
    }

    fn push_lead(&mut self, lead: NewLead) -> Lead {
        let lead = Lead {
            id: LeadId::from_value(self.next_id()),
            external_id: lead.external_id,
            phone: lead.phone,
            email: lead.email,
            created_at: 0,
        };
        self.tables.leads.push(lead.clone());
        lead
    }
}

impl DistributionStore for MockStore {
    type Error = String;

    fn get_source(&self, id: SourceId) -> Result<Option<Source>, Self::Error> {
        Ok(self.tables.sources.iter().find(|s| s.id == id).cloned())
    }

    fn get_operator(&self, id: OperatorId) -> Result<Option<Operator>, Self::Error> {
        Ok(self.tables.operators.iter().find(|o| o.id == id).cloned())
    }

    fn get_lead(&self, id: LeadId) -> Result<Option<Lead>, Self::Error> {
        Ok(self.tables.leads.iter().find(|l| l.id == id).cloned())
    }

    fn weights_for_source(
        &self,
        source_id: SourceId,
    ) -> Result<Vec<SourceOperatorWeight>, Self::Error> {
        Ok(self
            .tables
            .weights
            .iter()
            .filter(|w| w.source_id == source_id)
            .copied()
            .collect())
    }

    fn operators_by_ids(&self, ids: &[OperatorId]) -> Result<Vec<Operator>, Self::Error> {
        Ok(self
            .tables
            .operators
            .iter()
            .filter(|o| ids.contains(&o.id))
            .cloned()
            .collect())
    }

    fn count_active_contacts(&self, operator_id: OperatorId) -> Result<u32, Self::Error> {
        Ok(self
            .tables
            .contacts
            .iter()
            .filter(|c| c.operator_id == Some(operator_id) && c.status == ContactStatus::Active)
            .count() as u32)
    }

    fn find_lead_by_external_id(&self, external_id: &str) -> Result<Option<Lead>, Self::Error> {
        Ok(self
            .tables
            .leads
            .iter()
            .find(|l| l.external_id == external_id)
            .cloned())
    }

    fn insert_lead(&mut self, lead: NewLead) -> Result<LeadInsert, Self::Error> {
        if self.lose_lead_race.remove(&lead.external_id) {
            // A concurrent writer commits its own row first
            self.push_lead(NewLead {
                external_id: lead.external_id,
                phone: Some("winner".to_string()),
                email: None,
            });
            return Ok(LeadInsert::AlreadyExists);
        }

        if self
            .tables
            .leads
            .iter()
            .any(|l| l.external_id == lead.external_id)
        {
            return Ok(LeadInsert::AlreadyExists);
        }

        Ok(LeadInsert::Created(self.push_lead(lead)))
    }

    fn insert_contact(&mut self, contact: NewContact) -> Result<Contact, Self::Error> {
        if self.fail_contact_insert {
            return Err("contacts table is read-only".to_string());
        }

        let contact = Contact {
            id: ContactId::from_value(self.next_id()),
            lead_id: contact.lead_id,
            source_id: contact.source_id,
            operator_id: contact.operator_id,
            status: contact.status,
            created_at: 0,
        };
        self.tables.contacts.push(contact.clone());
        Ok(contact)
    }

    fn in_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<Self::Error>,
    {
        let snapshot = self.tables.clone();
        let result = f(self);
        if result.is_err() {
            self.tables = snapshot;
        }
        result
    }
}
