use serde::{Deserialize, Serialize};

use super::{AuditFields, EntityBinding, RowState, RuleViolation};
use crate::lifecycle::operation::OperationKind;

pub const MAX_LINE_LEN: usize = 50;
pub const MAX_POSTAL_CODE_LEN: usize = 10;
pub const MAX_PHONE_LEN: usize = 20;

/// A street address attached to a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: Option<i32>,
    pub address1: String,
    pub address2: String,
    pub city_id: Option<i32>,
    pub postal_code: String,
    pub phone: String,
    pub state: RowState,
    pub audit: AuditFields,
}

/// Persisted `address` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub id: i32,
    pub address1: String,
    pub address2: String,
    pub city_id: i32,
    pub postal_code: String,
    pub phone: String,
    pub audit: AuditFields,
}

impl Address {
    pub fn new(address1: impl Into<String>, city_id: Option<i32>, user: &str) -> Self {
        Self {
            id: None,
            address1: address1.into(),
            address2: String::new(),
            city_id,
            postal_code: String::new(),
            phone: String::new(),
            state: RowState::New,
            audit: AuditFields::create(user),
        }
    }

    pub fn from_record(record: AddressRecord) -> Self {
        Self {
            id: Some(record.id),
            address1: record.address1,
            address2: record.address2,
            city_id: Some(record.city_id),
            postal_code: record.postal_code,
            phone: record.phone,
            state: RowState::Unmodified,
            audit: record.audit,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn check_rules(&self) -> Vec<RuleViolation> {
        let mut violations = Vec::new();
        if self.address1.trim().is_empty() {
            violations.push(RuleViolation::new("address1", "street address is required"));
        } else if self.address1.len() > MAX_LINE_LEN {
            violations.push(RuleViolation::new(
                "address1",
                format!("street address exceeds {MAX_LINE_LEN} characters"),
            ));
        }
        if self.address2.len() > MAX_LINE_LEN {
            violations.push(RuleViolation::new(
                "address2",
                format!("second line exceeds {MAX_LINE_LEN} characters"),
            ));
        }
        if self.city_id.is_none() {
            violations.push(RuleViolation::new("city", "city is required"));
        }
        if self.postal_code.len() > MAX_POSTAL_CODE_LEN {
            violations.push(RuleViolation::new(
                "postal_code",
                format!("postal code exceeds {MAX_POSTAL_CODE_LEN} characters"),
            ));
        }
        if self.phone.len() > MAX_PHONE_LEN {
            violations.push(RuleViolation::new(
                "phone",
                format!("phone exceeds {MAX_PHONE_LEN} characters"),
            ));
        }
        violations
    }
}

/// Lifecycle binding for [`Address`].
#[derive(Debug, Clone, Copy)]
pub struct AddressBinding;

impl EntityBinding for AddressBinding {
    type Entity = Address;
    type Record = AddressRecord;

    const NAME: &'static str = "address";

    fn event_tag(kind: OperationKind) -> &'static str {
        match kind {
            OperationKind::None => "address.none",
            OperationKind::EditRequest => "address.edit_request",
            OperationKind::DeleteRequest => "address.delete_request",
            OperationKind::Inserting => "address.inserting",
            OperationKind::Inserted => "address.inserted",
            OperationKind::Updating => "address.updating",
            OperationKind::Updated => "address.updated",
            OperationKind::Deleting => "address.deleting",
            OperationKind::Deleted => "address.deleted",
        }
    }

    fn is_new(entity: &Address) -> bool {
        entity.is_new()
    }

    fn to_record(entity: &Address) -> Option<AddressRecord> {
        match (entity.id, entity.city_id) {
            (Some(id), Some(city_id)) => Some(AddressRecord {
                id,
                address1: entity.address1.clone(),
                address2: entity.address2.clone(),
                city_id,
                postal_code: entity.postal_code.clone(),
                phone: entity.phone.clone(),
                audit: entity.audit.clone(),
            }),
            _ => None,
        }
    }
}
