use serde::{Deserialize, Serialize};

use super::{AuditFields, EntityBinding, RowState, RuleViolation};
use crate::lifecycle::operation::OperationKind;

pub const MAX_NAME_LEN: usize = 50;

/// A city within a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: Option<i32>,
    pub name: String,
    pub country_id: Option<i32>,
    pub state: RowState,
    pub audit: AuditFields,
}

/// Persisted `city` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub id: i32,
    pub name: String,
    pub country_id: i32,
    pub audit: AuditFields,
}

impl City {
    pub fn new(name: impl Into<String>, country_id: Option<i32>, user: &str) -> Self {
        Self {
            id: None,
            name: name.into(),
            country_id,
            state: RowState::New,
            audit: AuditFields::create(user),
        }
    }

    pub fn from_record(record: CityRecord) -> Self {
        Self {
            id: Some(record.id),
            name: record.name,
            country_id: Some(record.country_id),
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
        if self.country_id.is_none() {
            violations.push(RuleViolation::new("country", "country is required"));
        }
        violations
    }
}

/// Lifecycle binding for [`City`].
#[derive(Debug, Clone, Copy)]
pub struct CityBinding;

impl EntityBinding for CityBinding {
    type Entity = City;
    type Record = CityRecord;

    const NAME: &'static str = "city";

    fn event_tag(kind: OperationKind) -> &'static str {
        match kind {
            OperationKind::None => "city.none",
            OperationKind::EditRequest => "city.edit_request",
            OperationKind::DeleteRequest => "city.delete_request",
            OperationKind::Inserting => "city.inserting",
            OperationKind::Inserted => "city.inserted",
            OperationKind::Updating => "city.updating",
            OperationKind::Updated => "city.updated",
            OperationKind::Deleting => "city.deleting",
            OperationKind::Deleted => "city.deleted",
        }
    }

    fn is_new(entity: &City) -> bool {
        entity.is_new()
    }

    fn to_record(entity: &City) -> Option<CityRecord> {
        match (entity.id, entity.country_id) {
            (Some(id), Some(country_id)) => Some(CityRecord {
                id,
                name: entity.name.clone(),
                country_id,
                audit: entity.audit.clone(),
            }),
            _ => None,
        }
    }
}
