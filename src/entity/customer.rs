use serde::{Deserialize, Serialize};

use super::{AuditFields, EntityBinding, RowState, RuleViolation};
use crate::lifecycle::operation::OperationKind;

pub const MAX_NAME_LEN: usize = 45;

/// A customer appointments are booked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Option<i32>,
    pub name: String,
    pub address_id: Option<i32>,
    pub active: bool,
    pub state: RowState,
    pub audit: AuditFields,
}

/// Persisted `customer` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: i32,
    pub name: String,
    pub address_id: i32,
    pub active: bool,
    pub audit: AuditFields,
}

impl Customer {
    pub fn new(name: impl Into<String>, address_id: Option<i32>, user: &str) -> Self {
        Self {
            id: None,
            name: name.into(),
            address_id,
            active: true,
            state: RowState::New,
            audit: AuditFields::create(user),
        }
    }

    pub fn from_record(record: CustomerRecord) -> Self {
        Self {
            id: Some(record.id),
            name: record.name,
            address_id: Some(record.address_id),
            active: record.active,
            state: RowState::Unmodified,
            audit: record.audit,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn check_rules(&self) -> Vec<RuleViolation> {
        let mut violations = Vec::new();
        if self.name.trim().is_empty() {
            violations.push(RuleViolation::new("name", "name is required"));
        } else if self.name.len() > MAX_NAME_LEN {
            violations.push(RuleViolation::new(
                "name",
                format!("name exceeds {MAX_NAME_LEN} characters"),
            ));
        }
        if self.address_id.is_none() {
            violations.push(RuleViolation::new("address", "address is required"));
        }
        violations
    }
}

/// Lifecycle binding for [`Customer`].
#[derive(Debug, Clone, Copy)]
pub struct CustomerBinding;

impl EntityBinding for CustomerBinding {
    type Entity = Customer;
    type Record = CustomerRecord;

    const NAME: &'static str = "customer";

    fn event_tag(kind: OperationKind) -> &'static str {
        match kind {
            OperationKind::None => "customer.none",
            OperationKind::EditRequest => "customer.edit_request",
            OperationKind::DeleteRequest => "customer.delete_request",
            OperationKind::Inserting => "customer.inserting",
            OperationKind::Inserted => "customer.inserted",
            OperationKind::Updating => "customer.updating",
            OperationKind::Updated => "customer.updated",
            OperationKind::Deleting => "customer.deleting",
            OperationKind::Deleted => "customer.deleted",
        }
    }

    fn is_new(entity: &Customer) -> bool {
        entity.is_new()
    }

    fn to_record(entity: &Customer) -> Option<CustomerRecord> {
        match (entity.id, entity.address_id) {
            (Some(id), Some(address_id)) => Some(CustomerRecord {
                id,
                name: entity.name.clone(),
                address_id,
                active: entity.active,
                audit: entity.audit.clone(),
            }),
            _ => None,
        }
    }
}
