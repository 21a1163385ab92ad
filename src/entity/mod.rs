// Per-entity glue for the staged mutation lifecycle: domain models, their
// persisted-record forms, and the bindings that instantiate the generic
// stage types for each of the six entity kinds.

pub mod address;
pub mod appointment;
pub mod city;
pub mod country;
pub mod customer;
pub mod user;

pub use address::{Address, AddressBinding, AddressRecord};
pub use appointment::{
    Appointment, AppointmentBinding, AppointmentRecord, AppointmentType,
};
pub use city::{City, CityBinding, CityRecord};
pub use country::{Country, CountryBinding, CountryRecord};
pub use customer::{Customer, CustomerBinding, CustomerRecord};
pub use user::{User, UserBinding, UserRecord, UserStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::operation::OperationKind;

/// Persistence state of a domain entity relative to its backing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowState {
    New,
    Unmodified,
    Modified,
    Deleted,
}

/// Audit columns every table carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFields {
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl AuditFields {
    /// Audit columns for a freshly created entity.
    pub fn create(user: &str) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            created_by: user.to_string(),
            updated_at: now,
            updated_by: user.to_string(),
        }
    }

    /// Stamp a modification.
    pub fn touch(&mut self, user: &str) {
        self.updated_at = Utc::now();
        self.updated_by = user.to_string();
    }
}

/// A single failed business rule, attributed to the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub field: &'static str,
    pub message: String,
}

impl RuleViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Join violations into the single message a validate stage records.
pub fn violation_message(violations: &[RuleViolation]) -> String {
    violations
        .iter()
        .map(RuleViolation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Per-entity-kind wiring that instantiates the generic stage machinery.
///
/// A binding is pure parametric glue: the concrete entity and record types,
/// the dispatch-tag map for the subscription layer, and the row-state probe
/// that turns an edit request into an insert or an update.
pub trait EntityBinding: Sized + Send + Sync + 'static {
    /// Domain model the stages carry.
    type Entity: Send + Sync + 'static;
    /// Persisted row form consumed by the data-access layer.
    type Record: Send + Sync + 'static;

    /// Short name used in logs and summaries.
    const NAME: &'static str;

    /// Statically distinguishable dispatch tag, unique per (entity, kind).
    fn event_tag(kind: OperationKind) -> &'static str;

    /// Whether the entity has never been persisted.
    fn is_new(entity: &Self::Entity) -> bool;

    /// Snapshot of the persisted form; `None` while the entity is new.
    fn to_record(entity: &Self::Entity) -> Option<Self::Record>;
}
