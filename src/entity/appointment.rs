use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuditFields, EntityBinding, RowState, RuleViolation};
use crate::lifecycle::operation::OperationKind;

pub const MAX_TITLE_LEN: usize = 255;

/// How an appointment is held. Determines which contact fields are
/// mandatory: a phone appointment needs a number in `location`, a virtual
/// one needs a meeting `url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Phone,
    Virtual,
    Customer,
    Corporate,
    Other,
}

impl AppointmentType {
    /// Database code for the type column.
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentType::Phone => "phone",
            AppointmentType::Virtual => "virtual",
            AppointmentType::Customer => "customer",
            AppointmentType::Corporate => "corporate",
            AppointmentType::Other => "other",
        }
    }
}

/// A scheduled appointment between a customer and a consultant login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Option<i32>,
    pub customer_id: Option<i32>,
    pub user_id: Option<i32>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub contact: String,
    pub kind: AppointmentType,
    pub url: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub state: RowState,
    pub audit: AuditFields,
}

/// Persisted `appointment` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: i32,
    pub customer_id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: String,
    pub location: String,
    pub contact: String,
    pub kind: AppointmentType,
    pub url: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub audit: AuditFields,
}

impl Appointment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        customer_id: Option<i32>,
        user_id: Option<i32>,
        title: impl Into<String>,
        kind: AppointmentType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        user: &str,
    ) -> Self {
        Self {
            id: None,
            customer_id,
            user_id,
            title: title.into(),
            description: String::new(),
            location: String::new(),
            contact: String::new(),
            kind,
            url: String::new(),
            start,
            end,
            state: RowState::New,
            audit: AuditFields::create(user),
        }
    }

    pub fn from_record(record: AppointmentRecord) -> Self {
        Self {
            id: Some(record.id),
            customer_id: Some(record.customer_id),
            user_id: Some(record.user_id),
            title: record.title,
            description: record.description,
            location: record.location,
            contact: record.contact,
            kind: record.kind,
            url: record.url,
            start: record.start,
            end: record.end,
            state: RowState::Unmodified,
            audit: record.audit,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Whether this appointment's window intersects another's.
    pub fn overlaps(&self, other: &AppointmentRecord) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Field-level business rules.
    pub fn check_rules(&self) -> Vec<RuleViolation> {
        let mut violations = Vec::new();
        if self.title.trim().is_empty() {
            violations.push(RuleViolation::new("title", "title is required"));
        } else if self.title.len() > MAX_TITLE_LEN {
            violations.push(RuleViolation::new(
                "title",
                format!("title exceeds {MAX_TITLE_LEN} characters"),
            ));
        }
        if self.customer_id.is_none() {
            violations.push(RuleViolation::new("customer", "customer is required"));
        }
        if self.user_id.is_none() {
            violations.push(RuleViolation::new("user", "consultant is required"));
        }
        if self.start >= self.end {
            violations.push(RuleViolation::new("start", "start must precede end"));
        }
        match self.kind {
            AppointmentType::Phone if self.location.trim().is_empty() => {
                violations.push(RuleViolation::new(
                    "location",
                    "phone appointments require a phone number",
                ));
            }
            AppointmentType::Virtual if self.url.trim().is_empty() => {
                violations.push(RuleViolation::new(
                    "url",
                    "virtual appointments require a meeting url",
                ));
            }
            _ => {}
        }
        violations
    }

    /// Busy-conflict check against the consultant's existing appointments.
    /// The caller supplies the candidate rows; a row with this
    /// appointment's own id is ignored so updates do not conflict with
    /// themselves.
    pub fn check_conflicts(&self, existing: &[AppointmentRecord]) -> Vec<RuleViolation> {
        existing
            .iter()
            .filter(|other| self.id != Some(other.id))
            .filter(|other| Some(other.user_id) == self.user_id && self.overlaps(other))
            .map(|other| {
                RuleViolation::new(
                    "start",
                    format!("conflicts with appointment {} ({})", other.id, other.title),
                )
            })
            .collect()
    }
}

/// Lifecycle binding for [`Appointment`].
#[derive(Debug, Clone, Copy)]
pub struct AppointmentBinding;

impl EntityBinding for AppointmentBinding {
    type Entity = Appointment;
    type Record = AppointmentRecord;

    const NAME: &'static str = "appointment";

    fn event_tag(kind: OperationKind) -> &'static str {
        match kind {
            OperationKind::None => "appointment.none",
            OperationKind::EditRequest => "appointment.edit_request",
            OperationKind::DeleteRequest => "appointment.delete_request",
            OperationKind::Inserting => "appointment.inserting",
            OperationKind::Inserted => "appointment.inserted",
            OperationKind::Updating => "appointment.updating",
            OperationKind::Updated => "appointment.updated",
            OperationKind::Deleting => "appointment.deleting",
            OperationKind::Deleted => "appointment.deleted",
        }
    }

    fn is_new(entity: &Appointment) -> bool {
        entity.is_new()
    }

    fn to_record(entity: &Appointment) -> Option<AppointmentRecord> {
        match (entity.id, entity.customer_id, entity.user_id) {
            (Some(id), Some(customer_id), Some(user_id)) => Some(AppointmentRecord {
                id,
                customer_id,
                user_id,
                title: entity.title.clone(),
                description: entity.description.clone(),
                location: entity.location.clone(),
                contact: entity.contact.clone(),
                kind: entity.kind,
                url: entity.url.clone(),
                start: entity.start,
                end: entity.end,
                audit: entity.audit.clone(),
            }),
            _ => None,
        }
    }
}
