//! JSON request and response bodies
//!
//! Requests are checked with `validator` before they reach the store. Identifiers
//! travel as plain integers on the wire.

use leadflow_domain::{
    Contact, ContactFilter, Lead, LeadId, NewOperator, NewSource, Operator, OperatorId,
    OperatorUpdate, Source, SourceId, SourceOperatorWeight, WeightAssignment, DEFAULT_MAX_LOAD,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

const DEFAULT_PAGE_SIZE: u32 = 100;

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_active() -> bool {
    true
}

fn default_max_load() -> u32 {
    DEFAULT_MAX_LOAD
}

/// `?skip=&limit=` query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    /// Rows to skip
    #[serde(default)]
    pub skip: u32,

    /// Maximum rows to return
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Query parameters for listing contacts
#[derive(Debug, Clone, Deserialize)]
pub struct ContactQuery {
    /// Rows to skip
    #[serde(default)]
    pub skip: u32,

    /// Maximum rows to return
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Only contacts of this lead
    pub lead_id: Option<i64>,

    /// Only contacts from this source
    pub source_id: Option<i64>,

    /// Only contacts assigned to this operator
    pub operator_id: Option<i64>,
}

impl From<ContactQuery> for ContactFilter {
    fn from(query: ContactQuery) -> Self {
        ContactFilter {
            lead_id: query.lead_id.map(LeadId::from_value),
            source_id: query.source_id.map(SourceId::from_value),
            operator_id: query.operator_id.map(OperatorId::from_value),
            skip: query.skip,
            limit: query.limit,
        }
    }
}

/// POST /operators
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OperatorCreate {
    /// Display name
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Whether the operator takes contacts (default true)
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Capacity (default 10)
    #[serde(default = "default_max_load")]
    #[validate(range(min = 1))]
    pub max_load: u32,
}

impl From<OperatorCreate> for NewOperator {
    fn from(request: OperatorCreate) -> Self {
        NewOperator::new(request.name)
            .with_active(request.is_active)
            .with_max_load(request.max_load)
    }
}

/// PATCH /operators/{id}
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct OperatorPatch {
    /// New display name
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    /// New active flag
    pub is_active: Option<bool>,

    /// New capacity
    #[validate(range(min = 1))]
    pub max_load: Option<u32>,
}

impl From<OperatorPatch> for OperatorUpdate {
    fn from(patch: OperatorPatch) -> Self {
        OperatorUpdate {
            name: patch.name,
            is_active: patch.is_active,
            max_load: patch.max_load,
        }
    }
}

/// Operator as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorResponse {
    /// Operator ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Whether the operator takes contacts
    pub is_active: bool,
    /// Capacity
    pub max_load: u32,
    /// Creation time, seconds since the Unix epoch
    pub created_at: u64,
    /// Active contacts right now; omitted where it was not computed
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub current_load: Option<u32>,
}

impl OperatorResponse {
    /// Attach the operator's current load
    pub fn with_load(mut self, load: u32) -> Self {
        self.current_load = Some(load);
        self
    }
}

impl From<Operator> for OperatorResponse {
    fn from(op: Operator) -> Self {
        OperatorResponse {
            id: op.id.value(),
            name: op.name,
            is_active: op.is_active,
            max_load: op.max_load,
            created_at: op.created_at,
            current_load: None,
        }
    }
}

/// POST /sources
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SourceCreate {
    /// Unique source name
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

impl From<SourceCreate> for NewSource {
    fn from(request: SourceCreate) -> Self {
        NewSource { name: request.name }
    }
}

/// Source as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResponse {
    /// Source ID
    pub id: i64,
    /// Unique name
    pub name: String,
    /// Creation time, seconds since the Unix epoch
    pub created_at: u64,
}

impl From<Source> for SourceResponse {
    fn from(source: Source) -> Self {
        SourceResponse {
            id: source.id.value(),
            name: source.name,
            created_at: source.created_at,
        }
    }
}

/// One entry of a distribution policy
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OperatorWeight {
    /// Operator receiving contacts from the source
    pub operator_id: i64,
    /// Relative share; 0 keeps the operator configured but never picked
    pub weight: u32,
}

/// POST /sources/{id}/distribution
#[derive(Debug, Clone, Deserialize)]
pub struct DistributionConfig {
    /// The complete new policy
    pub operator_weights: Vec<OperatorWeight>,
}

impl DistributionConfig {
    /// Convert to domain assignments
    pub fn assignments(&self) -> Vec<WeightAssignment> {
        self.operator_weights
            .iter()
            .map(|w| WeightAssignment {
                operator_id: OperatorId::from_value(w.operator_id),
                weight: w.weight,
            })
            .collect()
    }
}

/// Weight row as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightResponse {
    /// Row ID
    pub id: i64,
    /// Source ID
    pub source_id: i64,
    /// Operator ID
    pub operator_id: i64,
    /// Relative share
    pub weight: u32,
}

impl From<SourceOperatorWeight> for WeightResponse {
    fn from(row: SourceOperatorWeight) -> Self {
        WeightResponse {
            id: row.id.value(),
            source_id: row.source_id.value(),
            operator_id: row.operator_id.value(),
            weight: row.weight,
        }
    }
}

/// Lead as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadResponse {
    /// Lead ID
    pub id: i64,
    /// External key
    pub external_id: String,
    /// Phone recorded at creation
    pub phone: Option<String>,
    /// Email recorded at creation
    pub email: Option<String>,
    /// Creation time, seconds since the Unix epoch
    pub created_at: u64,
}

impl From<Lead> for LeadResponse {
    fn from(lead: Lead) -> Self {
        LeadResponse {
            id: lead.id.value(),
            external_id: lead.external_id,
            phone: lead.phone,
            email: lead.email,
            created_at: lead.created_at,
        }
    }
}

/// POST /contacts
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactCreate {
    /// Stable key of the person behind the contact
    #[validate(length(min = 1, max = 255))]
    pub external_id: String,

    /// Source the contact came from
    pub source_id: i64,

    /// Phone number
    pub phone: Option<String>,

    /// Email address
    #[validate(email)]
    pub email: Option<String>,
}

/// Contact with its lead, source and operator resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    /// Contact ID
    pub id: i64,
    /// Lead ID
    pub lead_id: i64,
    /// Source ID
    pub source_id: i64,
    /// Assigned operator, `null` when unassigned
    pub operator_id: Option<i64>,
    /// "active" or "closed"
    pub status: String,
    /// Creation time, seconds since the Unix epoch
    pub created_at: u64,
    /// The lead
    pub lead: LeadResponse,
    /// The source
    pub source: SourceResponse,
    /// The operator, `null` when unassigned
    pub operator: Option<OperatorResponse>,
}

impl ContactResponse {
    /// Assemble from a contact and its related entities
    pub fn new(contact: Contact, lead: Lead, source: Source, operator: Option<Operator>) -> Self {
        ContactResponse {
            id: contact.id.value(),
            lead_id: contact.lead_id.value(),
            source_id: contact.source_id.value(),
            operator_id: contact.operator_id.map(|id| id.value()),
            status: contact.status.to_string(),
            created_at: contact.created_at,
            lead: lead.into(),
            source: source.into(),
            operator: operator.map(Into::into),
        }
    }
}

/// GET /stats/contacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactStatsResponse {
    /// All contacts
    pub total_contacts: u64,
    /// Source name to contact count
    pub contacts_by_source: std::collections::BTreeMap<String, u64>,
    /// Operator name to contact count
    pub contacts_by_operator: std::collections::BTreeMap<String, u64>,
}

/// Plain message body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}
