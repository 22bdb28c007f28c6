//! Leadflow Storage Layer
//!
//! Implements the `DistributionStore` and `AdminStore` traits on top of SQLite.
//!
//! # Architecture
//!
//! - One table per entity; relations are plain foreign keys
//! - Operator load is never stored, it is counted from `contacts` on demand
//! - `leads.external_id` carries a UNIQUE constraint, which is what makes
//!   concurrent lead creation safe
//! - Units of work open with `BEGIN IMMEDIATE`, taking the write lock before the
//!   first read so that eligibility checks and contact creation are serialized
//!   across every connection to the same database file
//!
//! # Examples
//!
//! ```no_run
//! use leadflow_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for distribution operations
//! ```

#![warn(missing_docs)]

use leadflow_domain::traits::{AdminStore, DistributionStore, LeadInsert};
use leadflow_domain::{
    current_timestamp, Contact, ContactFilter, ContactId, ContactStats, ContactStatus,
    DistributionCell, GroupCount, Lead, LeadId, NewContact, NewLead, NewOperator, NewSource,
    Operator, OperatorId, OperatorUpdate, Source, SourceId, SourceOperatorWeight,
    WeightAssignment, WeightId,
};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// How long a connection waits for another writer before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const OPERATOR_COLUMNS: &str = "id, name, is_active, max_load, created_at";
const SOURCE_COLUMNS: &str = "id, name, created_at";
const WEIGHT_COLUMNS: &str = "id, source_id, operator_id, weight";
const LEAD_COLUMNS: &str = "id, external_id, phone, email, created_at";
const CONTACT_COLUMNS: &str = "id, lead_id, source_id, operator_id, status, created_at";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Referenced entity not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Uniqueness constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// SQLite-based implementation of the Leadflow store traits
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store behind a mutex, or open
/// one `SqliteStore` per thread against the same database file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use leadflow_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("leadflow.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Map unique-constraint failures to `StoreError::Conflict`
    fn conflict_or(err: rusqlite::Error, what: impl FnOnce() -> String) -> StoreError {
        let is_constraint = matches!(
            &err,
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
        );
        if is_constraint {
            StoreError::Conflict(what())
        } else {
            StoreError::Database(err)
        }
    }

    /// An operator must be able to hold at least one contact
    fn check_max_load(max_load: u32) -> Result<(), StoreError> {
        if max_load == 0 {
            return Err(StoreError::InvalidData(
                "max_load must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn operator_from_row(row: &Row<'_>) -> rusqlite::Result<Operator> {
        Ok(Operator {
            id: OperatorId::from_value(row.get(0)?),
            name: row.get(1)?,
            is_active: row.get(2)?,
            max_load: row.get(3)?,
            created_at: row.get::<_, i64>(4)? as u64,
        })
    }

    fn source_from_row(row: &Row<'_>) -> rusqlite::Result<Source> {
        Ok(Source {
            id: SourceId::from_value(row.get(0)?),
            name: row.get(1)?,
            created_at: row.get::<_, i64>(2)? as u64,
        })
    }

    fn weight_from_row(row: &Row<'_>) -> rusqlite::Result<SourceOperatorWeight> {
        Ok(SourceOperatorWeight {
            id: WeightId::from_value(row.get(0)?),
            source_id: SourceId::from_value(row.get(1)?),
            operator_id: OperatorId::from_value(row.get(2)?),
            weight: row.get(3)?,
        })
    }

    fn lead_from_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
        Ok(Lead {
            id: LeadId::from_value(row.get(0)?),
            external_id: row.get(1)?,
            phone: row.get(2)?,
            email: row.get(3)?,
            created_at: row.get::<_, i64>(4)? as u64,
        })
    }

    fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
        let status_str: String = row.get(4)?;
        let status = ContactStatus::parse(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                Box::new(StoreError::InvalidData(format!(
                    "Unknown contact status: {}",
                    status_str
                ))),
            )
        })?;

        Ok(Contact {
            id: ContactId::from_value(row.get(0)?),
            lead_id: LeadId::from_value(row.get(1)?),
            source_id: SourceId::from_value(row.get(2)?),
            operator_id: row.get::<_, Option<i64>>(3)?.map(OperatorId::from_value),
            status,
            created_at: row.get::<_, i64>(5)? as u64,
        })
    }
}

impl DistributionStore for SqliteStore {
    type Error = StoreError;

    fn get_source(&self, id: SourceId) -> Result<Option<Source>, Self::Error> {
        let source = self
            .conn
            .query_row(
                &format!("SELECT {} FROM sources WHERE id = ?1", SOURCE_COLUMNS),
                params![id.value()],
                Self::source_from_row,
            )
            .optional()?;
        Ok(source)
    }

    fn get_operator(&self, id: OperatorId) -> Result<Option<Operator>, Self::Error> {
        let operator = self
            .conn
            .query_row(
                &format!("SELECT {} FROM operators WHERE id = ?1", OPERATOR_COLUMNS),
                params![id.value()],
                Self::operator_from_row,
            )
            .optional()?;
        Ok(operator)
    }

    fn get_lead(&self, id: LeadId) -> Result<Option<Lead>, Self::Error> {
        let lead = self
            .conn
            .query_row(
                &format!("SELECT {} FROM leads WHERE id = ?1", LEAD_COLUMNS),
                params![id.value()],
                Self::lead_from_row,
            )
            .optional()?;
        Ok(lead)
    }

    fn weights_for_source(
        &self,
        source_id: SourceId,
    ) -> Result<Vec<SourceOperatorWeight>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM source_operator_weights WHERE source_id = ?1 ORDER BY id",
            WEIGHT_COLUMNS
        ))?;
        let weights = stmt
            .query_map(params![source_id.value()], Self::weight_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(weights)
    }

    fn operators_by_ids(&self, ids: &[OperatorId]) -> Result<Vec<Operator>, Self::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM operators WHERE id IN ({}) ORDER BY id",
            OPERATOR_COLUMNS, placeholders
        ))?;
        let operators = stmt
            .query_map(
                params_from_iter(ids.iter().map(|id| id.value())),
                Self::operator_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(operators)
    }

    fn count_active_contacts(&self, operator_id: OperatorId) -> Result<u32, Self::Error> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM contacts WHERE operator_id = ?1 AND status = ?2",
            params![operator_id.value(), ContactStatus::Active.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn find_lead_by_external_id(&self, external_id: &str) -> Result<Option<Lead>, Self::Error> {
        let lead = self
            .conn
            .query_row(
                &format!("SELECT {} FROM leads WHERE external_id = ?1", LEAD_COLUMNS),
                params![external_id],
                Self::lead_from_row,
            )
            .optional()?;
        Ok(lead)
    }

    fn insert_lead(&mut self, lead: NewLead) -> Result<LeadInsert, Self::Error> {
        let created_at = current_timestamp();
        let inserted = self.conn.execute(
            "INSERT INTO leads (external_id, phone, email, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(external_id) DO NOTHING",
            params![&lead.external_id, &lead.phone, &lead.email, created_at as i64],
        )?;

        if inserted == 0 {
            return Ok(LeadInsert::AlreadyExists);
        }

        Ok(LeadInsert::Created(Lead {
            id: LeadId::from_value(self.conn.last_insert_rowid()),
            external_id: lead.external_id,
            phone: lead.phone,
            email: lead.email,
            created_at,
        }))
    }

    fn insert_contact(&mut self, contact: NewContact) -> Result<Contact, Self::Error> {
        let created_at = current_timestamp();
        self.conn.execute(
            "INSERT INTO contacts (lead_id, source_id, operator_id, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                contact.lead_id.value(),
                contact.source_id.value(),
                contact.operator_id.map(|id| id.value()),
                contact.status.as_str(),
                created_at as i64,
            ],
        )?;

        Ok(Contact {
            id: ContactId::from_value(self.conn.last_insert_rowid()),
            lead_id: contact.lead_id,
            source_id: contact.source_id,
            operator_id: contact.operator_id,
            status: contact.status,
            created_at,
        })
    }

    fn in_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<Self::Error>,
    {
        // Already inside a unit of work: join it
        if !self.conn.is_autocommit() {
            return f(self);
        }

        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| E::from(StoreError::from(e)))?;

        // A panicking unit must not leave the connection inside BEGIN, or the
        // next call would join it
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| f(self))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                panic::resume_unwind(payload);
            }
        };

        match outcome {
            Ok(value) => match self.conn.execute_batch("COMMIT") {
                Ok(()) => Ok(value),
                Err(e) => {
                    let _ = self.conn.execute_batch("ROLLBACK");
                    Err(E::from(StoreError::from(e)))
                }
            },
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }
}

impl AdminStore for SqliteStore {
    fn create_operator(&mut self, operator: NewOperator) -> Result<Operator, Self::Error> {
        Self::check_max_load(operator.max_load)?;
        let created_at = current_timestamp();
        self.conn.execute(
            "INSERT INTO operators (name, is_active, max_load, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &operator.name,
                operator.is_active,
                operator.max_load,
                created_at as i64
            ],
        )?;

        Ok(Operator {
            id: OperatorId::from_value(self.conn.last_insert_rowid()),
            name: operator.name,
            is_active: operator.is_active,
            max_load: operator.max_load,
            created_at,
        })
    }

    fn list_operators(&self, skip: u32, limit: u32) -> Result<Vec<Operator>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM operators ORDER BY id LIMIT ?1 OFFSET ?2",
            OPERATOR_COLUMNS
        ))?;
        let operators = stmt
            .query_map(params![limit, skip], Self::operator_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(operators)
    }

    fn update_operator(
        &mut self,
        id: OperatorId,
        update: &OperatorUpdate,
    ) -> Result<Option<Operator>, Self::Error> {
        let Some(mut operator) = self.get_operator(id)? else {
            return Ok(None);
        };

        update.apply_to(&mut operator);
        Self::check_max_load(operator.max_load)?;
        self.conn.execute(
            "UPDATE operators SET name = ?1, is_active = ?2, max_load = ?3 WHERE id = ?4",
            params![
                &operator.name,
                operator.is_active,
                operator.max_load,
                id.value()
            ],
        )?;

        Ok(Some(operator))
    }

    fn delete_operator(&mut self, id: OperatorId) -> Result<bool, Self::Error> {
        let deleted = self
            .conn
            .execute("DELETE FROM operators WHERE id = ?1", params![id.value()])?;
        Ok(deleted > 0)
    }

    fn create_source(&mut self, source: NewSource) -> Result<Source, Self::Error> {
        let created_at = current_timestamp();
        self.conn
            .execute(
                "INSERT INTO sources (name, created_at) VALUES (?1, ?2)",
                params![&source.name, created_at as i64],
            )
            .map_err(|e| {
                Self::conflict_or(e, || format!("source named '{}' already exists", source.name))
            })?;

        Ok(Source {
            id: SourceId::from_value(self.conn.last_insert_rowid()),
            name: source.name,
            created_at,
        })
    }

    fn list_sources(&self, skip: u32, limit: u32) -> Result<Vec<Source>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM sources ORDER BY id LIMIT ?1 OFFSET ?2",
            SOURCE_COLUMNS
        ))?;
        let sources = stmt
            .query_map(params![limit, skip], Self::source_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sources)
    }

    fn replace_weights(
        &mut self,
        source_id: SourceId,
        weights: &[WeightAssignment],
    ) -> Result<Vec<SourceOperatorWeight>, Self::Error> {
        self.in_transaction(|store: &mut Self| {
            if store.get_source(source_id)?.is_none() {
                return Err(StoreError::NotFound(format!("Source {}", source_id)));
            }

            store.conn.execute(
                "DELETE FROM source_operator_weights WHERE source_id = ?1",
                params![source_id.value()],
            )?;

            for assignment in weights {
                if store.get_operator(assignment.operator_id)?.is_none() {
                    return Err(StoreError::NotFound(format!(
                        "Operator with id {}",
                        assignment.operator_id
                    )));
                }

                store
                    .conn
                    .execute(
                        "INSERT INTO source_operator_weights (source_id, operator_id, weight)
                         VALUES (?1, ?2, ?3)",
                        params![
                            source_id.value(),
                            assignment.operator_id.value(),
                            assignment.weight
                        ],
                    )
                    .map_err(|e| {
                        Self::conflict_or(e, || {
                            format!(
                                "operator {} listed twice for source {}",
                                assignment.operator_id, source_id
                            )
                        })
                    })?;
            }

            store.weights_for_source(source_id)
        })
    }

    fn list_leads(&self, skip: u32, limit: u32) -> Result<Vec<Lead>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM leads ORDER BY id LIMIT ?1 OFFSET ?2",
            LEAD_COLUMNS
        ))?;
        let leads = stmt
            .query_map(params![limit, skip], Self::lead_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(leads)
    }

    fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>, Self::Error> {
        let mut sql = format!("SELECT {} FROM contacts WHERE 1=1", CONTACT_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(lead_id) = filter.lead_id {
            sql.push_str(" AND lead_id = ?");
            params.push(Box::new(lead_id.value()));
        }

        if let Some(source_id) = filter.source_id {
            sql.push_str(" AND source_id = ?");
            params.push(Box::new(source_id.value()));
        }

        if let Some(operator_id) = filter.operator_id {
            sql.push_str(" AND operator_id = ?");
            params.push(Box::new(operator_id.value()));
        }

        sql.push_str(" ORDER BY id LIMIT ? OFFSET ?");
        params.push(Box::new(filter.limit));
        params.push(Box::new(filter.skip));

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let contacts = stmt
            .query_map(&param_refs[..], Self::contact_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    fn get_contact(&self, id: ContactId) -> Result<Option<Contact>, Self::Error> {
        let contact = self
            .conn
            .query_row(
                &format!("SELECT {} FROM contacts WHERE id = ?1", CONTACT_COLUMNS),
                params![id.value()],
                Self::contact_from_row,
            )
            .optional()?;
        Ok(contact)
    }

    fn close_contact(&mut self, id: ContactId) -> Result<Option<Contact>, Self::Error> {
        let updated = self.conn.execute(
            "UPDATE contacts SET status = ?1 WHERE id = ?2",
            params![ContactStatus::Closed.as_str(), id.value()],
        )?;

        if updated == 0 {
            return Ok(None);
        }
        self.get_contact(id)
    }

    fn contact_stats(&self) -> Result<ContactStats, Self::Error> {
        let total_contacts: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;

        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.name, COUNT(c.id)
             FROM sources s JOIN contacts c ON c.source_id = s.id
             GROUP BY s.id ORDER BY s.id",
        )?;
        let by_source = stmt
            .query_map([], |row| {
                Ok(GroupCount {
                    id: SourceId::from_value(row.get(0)?),
                    name: row.get(1)?,
                    count: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT o.id, o.name, COUNT(c.id)
             FROM operators o JOIN contacts c ON c.operator_id = o.id
             GROUP BY o.id ORDER BY o.id",
        )?;
        let by_operator = stmt
            .query_map([], |row| {
                Ok(GroupCount {
                    id: OperatorId::from_value(row.get(0)?),
                    name: row.get(1)?,
                    count: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ContactStats {
            total_contacts: total_contacts as u64,
            by_source,
            by_operator,
        })
    }

    fn distribution_stats(&self) -> Result<Vec<DistributionCell>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.name, o.id, o.name, COUNT(c.id)
             FROM contacts c
             JOIN sources s ON c.source_id = s.id
             JOIN operators o ON c.operator_id = o.id
             GROUP BY s.id, o.id
             ORDER BY s.id, o.id",
        )?;
        let cells = stmt
            .query_map([], |row| {
                Ok(DistributionCell {
                    source_id: SourceId::from_value(row.get(0)?),
                    source_name: row.get(1)?,
                    operator_id: OperatorId::from_value(row.get(2)?),
                    operator_name: row.get(3)?,
                    count: row.get::<_, i64>(4)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cells)
    }
}
