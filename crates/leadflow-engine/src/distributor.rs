//! Distribution orchestration

use crate::error::UnitError;
use crate::{eligible_operators, resolve_lead, EngineError, WeightedSelector};
use leadflow_domain::traits::DistributionStore;
use leadflow_domain::{Contact, ContactStatus, Lead, NewContact, Operator, Source, SourceId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// An inbound contact event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    /// Stable key of the person behind the event
    pub external_id: String,

    /// Source that produced the event
    pub source_id: SourceId,

    /// Phone number (stored only if the lead is new)
    pub phone: Option<String>,

    /// Email address (stored only if the lead is new)
    pub email: Option<String>,
}

/// The stored result of a distribution, with its related entities resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// The created contact
    pub contact: Contact,

    /// The lead the contact belongs to
    pub lead: Lead,

    /// The source the contact came from
    pub source: Source,

    /// The chosen operator, `None` if nobody was eligible
    pub operator: Option<Operator>,
}

/// Routes contact events to operators
///
/// # Examples
///
/// ```no_run
/// use leadflow_engine::{ContactRequest, Distributor};
/// use leadflow_domain::SourceId;
/// use leadflow_store::SqliteStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteStore::new(":memory:")?;
/// let mut distributor = Distributor::new();
///
/// let request = ContactRequest {
///     external_id: "ext-1".to_string(),
///     source_id: SourceId::from_value(1),
///     phone: None,
///     email: None,
/// };
/// let assignment = distributor.distribute(&mut store, request)?;
/// println!("assigned to {:?}", assignment.contact.operator_id);
/// # Ok(())
/// # }
/// ```
pub struct Distributor<R = StdRng> {
    selector: WeightedSelector<R>,
}

impl Distributor<StdRng> {
    /// Create a distributor seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for Distributor<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Distributor<R> {
    /// Create a distributor drawing from the given random source
    pub fn with_rng(rng: R) -> Self {
        Self {
            selector: WeightedSelector::new(rng),
        }
    }

    /// Register an inbound contact and assign it to an operator
    ///
    /// Runs as one unit of work:
    /// 1. Resolve the source (`NotFound` if absent; nothing is written)
    /// 2. Resolve or create the lead
    /// 3. Compute the eligible operators for the source
    /// 4. Pick one by weight, or leave the contact unassigned if none is eligible
    /// 5. Store the contact as active
    ///
    /// Any failure rolls back the whole unit; nothing is retried.
    pub fn distribute<S>(
        &mut self,
        store: &mut S,
        request: ContactRequest,
    ) -> Result<Assignment, EngineError>
    where
        S: DistributionStore,
        S::Error: Display,
    {
        let selector = &mut self.selector;

        let assignment = store.in_transaction(|s: &mut S| -> Result<Assignment, UnitError<S::Error>> {
            let source = s
                .get_source(request.source_id)?
                .ok_or_else(|| UnitError::Engine(EngineError::not_found("Source", request.source_id)))?;

            let lead = resolve_lead(s, &request.external_id, request.phone, request.email)
                .map_err(UnitError::Engine)?;

            let eligible = eligible_operators(s, source.id)?;
            let operator = if eligible.is_empty() {
                None
            } else {
                let chosen = selector
                    .select(&eligible, |candidate| candidate.weight)
                    .map_err(UnitError::Engine)?;
                debug!(
                    "Selected operator {} (weight {}, load {}/{}) among {} candidates",
                    chosen.operator.id,
                    chosen.weight,
                    chosen.current_load,
                    chosen.operator.max_load,
                    eligible.len()
                );
                Some(chosen.operator.clone())
            };

            let contact = s.insert_contact(NewContact {
                lead_id: lead.id,
                source_id: source.id,
                operator_id: operator.as_ref().map(|op| op.id),
                status: ContactStatus::Active,
            })?;

            Ok(Assignment {
                contact,
                lead,
                source,
                operator,
            })
        })?;

        match &assignment.operator {
            Some(op) => info!(
                "Contact {} from source '{}' assigned to operator {} ({})",
                assignment.contact.id, assignment.source.name, op.id, op.name
            ),
            None => warn!(
                "Contact {} from source '{}' left unassigned: no eligible operator",
                assignment.contact.id, assignment.source.name
            ),
        }

        Ok(assignment)
    }
}
