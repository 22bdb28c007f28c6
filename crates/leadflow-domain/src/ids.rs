//! Identifier newtypes
//!
//! Every entity is keyed by the integer rowid the store assigns on insert.
//! Wrapping them keeps an operator id from being passed where a source id is expected.

use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i64);

        impl $name {
            /// Create an id from its raw storage value
            pub fn from_value(value: i64) -> Self {
                Self(value)
            }

            /// Get the raw storage value
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of an [`Operator`](crate::Operator)
    OperatorId
);
entity_id!(
    /// Identifier of a [`Source`](crate::Source)
    SourceId
);
entity_id!(
    /// Identifier of a [`Lead`](crate::Lead)
    LeadId
);
entity_id!(
    /// Identifier of a [`Contact`](crate::Contact)
    ContactId
);
entity_id!(
    /// Identifier of a [`SourceOperatorWeight`](crate::SourceOperatorWeight) row
    WeightId
);
