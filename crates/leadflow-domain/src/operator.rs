//! Operator module - the humans contacts are routed to

use crate::OperatorId;

/// Capacity given to operators created without an explicit limit
pub const DEFAULT_MAX_LOAD: u32 = 10;

/// An operator who handles contacts
///
/// The current load is never stored here. It is derived from the number of
/// active contacts assigned to the operator and recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    /// Unique identifier
    pub id: OperatorId,

    /// Display name
    pub name: String,

    /// Inactive operators never receive new contacts
    pub is_active: bool,

    /// Maximum number of simultaneously active contacts
    pub max_load: u32,

    /// When this operator was created (timestamp)
    pub created_at: u64,
}

impl Operator {
    /// Whether the operator can take one more contact at the given load
    pub fn has_capacity(&self, current_load: u32) -> bool {
        current_load < self.max_load
    }
}

/// Fields required to create an operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOperator {
    /// Display name
    pub name: String,

    /// Initial activity flag
    pub is_active: bool,

    /// Capacity limit
    pub max_load: u32,
}

impl NewOperator {
    /// Create an active operator with the default capacity
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: true,
            max_load: DEFAULT_MAX_LOAD,
        }
    }

    /// Override the capacity limit
    pub fn with_max_load(mut self, max_load: u32) -> Self {
        self.max_load = max_load;
        self
    }

    /// Override the activity flag
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Partial update of an operator; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorUpdate {
    /// New display name
    pub name: Option<String>,

    /// New activity flag
    pub is_active: Option<bool>,

    /// New capacity limit
    pub max_load: Option<u32>,
}

impl OperatorUpdate {
    /// Apply the update to an operator in place
    pub fn apply_to(&self, operator: &mut Operator) {
        if let Some(name) = &self.name {
            operator.name = name.clone();
        }
        if let Some(is_active) = self.is_active {
            operator.is_active = is_active;
        }
        if let Some(max_load) = self.max_load {
            operator.max_load = max_load;
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_active.is_none() && self.max_load.is_none()
    }
}
