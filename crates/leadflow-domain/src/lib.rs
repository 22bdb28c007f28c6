//! Leadflow Domain Layer
//!
//! This crate contains the domain model for Leadflow, a service that routes
//! inbound contact events from lead sources to human operators.
//! It has ZERO external dependencies and defines the entities, value objects
//! and store traits that every other layer depends upon.
//!
//! ## Key Concepts
//!
//! - **Operator**: a human who handles contacts, with an on/off switch and a capacity
//! - **Source**: a channel (bot, landing page) producing contact events
//! - **Weight**: per-source, per-operator share of the distribution policy
//! - **Lead**: a person identified by a stable external key
//! - **Contact**: one inbound event, routed to at most one operator
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Entities reference each other by id only; there is no back-navigation
//! - Persistence lives behind the traits in [`traits`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contact;
pub mod ids;
pub mod lead;
pub mod operator;
pub mod source;
pub mod stats;
pub mod traits;

// Re-exports for convenience
pub use contact::{Contact, ContactFilter, ContactStatus, NewContact};
pub use ids::{ContactId, LeadId, OperatorId, SourceId, WeightId};
pub use lead::{Lead, NewLead};
pub use operator::{NewOperator, Operator, OperatorUpdate, DEFAULT_MAX_LOAD};
pub use source::{NewSource, Source, SourceOperatorWeight, WeightAssignment};
pub use stats::{ContactStats, DistributionCell, GroupCount};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current timestamp in seconds since Unix epoch
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
