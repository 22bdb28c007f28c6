//! Error types for distribution operations

use std::fmt::Display;
use thiserror::Error;

/// Errors that can occur during distribution
#[derive(Error, Debug)]
pub enum EngineError {
    /// A referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity ("Source", "Operator", ...)
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The engine was called in a way its contract forbids (a wiring bug)
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// Storage layer error, message carried unchanged
    #[error("Storage error: {0}")]
    Store(String),
}

impl EngineError {
    /// Build a `NotFound` error
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Wrap a store error
    pub fn store(err: impl Display) -> Self {
        EngineError::Store(err.to_string())
    }
}

/// Failure inside a unit of work: either the store failed or the engine refused
///
/// Store errors convert in with `?`; both sides collapse into [`EngineError`]
/// once the unit of work has been rolled back.
pub(crate) enum UnitError<E> {
    Store(E),
    Engine(EngineError),
}

impl<E> From<E> for UnitError<E> {
    fn from(err: E) -> Self {
        UnitError::Store(err)
    }
}

impl<E: Display> From<UnitError<E>> for EngineError {
    fn from(err: UnitError<E>) -> Self {
        match err {
            UnitError::Store(e) => EngineError::store(e),
            UnitError::Engine(e) => e,
        }
    }
}
