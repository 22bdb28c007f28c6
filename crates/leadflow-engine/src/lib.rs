//! Leadflow Distribution Engine
//!
//! Turns an inbound contact event into a stored assignment.
//!
//! # Overview
//!
//! The engine is built from small pieces, leaves first:
//! - **Load accounting** ([`current_load`]): active contacts per operator, counted on every call
//! - **Eligibility** ([`eligible_operators`]): configured for the source, active, under capacity
//! - **Weighted selection** ([`WeightedSelector`]): one draw proportional to weight
//! - **Lead resolution** ([`resolve_lead`]): upsert-by-key on the external id
//! - **Distribution** ([`Distributor`]): all of the above in one unit of work
//!
//! Everything operates on a [`DistributionStore`](leadflow_domain::traits::DistributionStore);
//! the engine never caches anything between calls.
//!
//! # Concurrency
//!
//! Eligibility is read-then-act. The engine runs the whole sequence inside
//! `DistributionStore::in_transaction`, so capacity is enforced exactly as
//! strictly as the store serializes its units of work. A store that does not
//! serialize them may overshoot an operator's capacity by the number of
//! concurrently racing requests.
//!
//! # Usage
//!
//! ```no_run
//! use leadflow_engine::{ContactRequest, Distributor};
//! use leadflow_domain::SourceId;
//! use leadflow_store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new("leadflow.db")?;
//! let mut distributor = Distributor::new();
//!
//! let assignment = distributor.distribute(&mut store, ContactRequest {
//!     external_id: "tg-100500".to_string(),
//!     source_id: SourceId::from_value(1),
//!     phone: Some("+15550100".to_string()),
//!     email: None,
//! })?;
//!
//! match assignment.operator {
//!     Some(op) => println!("contact {} -> {}", assignment.contact.id, op.name),
//!     None => println!("contact {} left unassigned", assignment.contact.id),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Tests inject a seeded generator instead of OS entropy:
//!
//! ```
//! use leadflow_engine::Distributor;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let distributor = Distributor::with_rng(StdRng::seed_from_u64(7));
//! ```

#![warn(missing_docs)]

mod distributor;
mod eligibility;
mod error;
mod lead;
mod load;
mod selector;

#[cfg(test)]
mod mock;

pub use distributor::{Assignment, ContactRequest, Distributor};
pub use eligibility::{eligible_operators, EligibleOperator};
pub use error::EngineError;
pub use lead::resolve_lead;
pub use load::current_load;
pub use selector::WeightedSelector;
