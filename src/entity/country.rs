use serde::{Deserialize, Serialize};

use super::{AuditFields, EntityBinding, RowState, RuleViolation};
use crate::lifecycle::operation::OperationKind;

/// Schema cap on the country name column.
pub const MAX_NAME_LEN: usize = 50;

/// A country available for customer addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: Option<i32>,
    pub name: String,
    pub state: RowState,
    pub audit: AuditFields,
}

/// Persisted `country` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub id: i32,
    pub name: String,
    pub audit: AuditFields,
}

impl Country {
    pub fn new(name: impl Into<String>, user: &str) -> Self {
        Self {
            id: None,
            name: name.into(),
            state: RowState::New,
            audit: AuditFields::create(user),
        }
    }

    pub fn from_record(record: CountryRecord) -> Self {
        Self {
            id: Some(record.id),
            name: record.name,
            state: RowState::Unmodified,
            audit: record.audit,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Business rules checked during the validate stage.
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
        violations
    }
}

/// Lifecycle binding for [`Country`].
#[derive(Debug, Clone, Copy)]
pub struct CountryBinding;

impl EntityBinding for CountryBinding {
    type Entity = Country;
    type Record = CountryRecord;

    const NAME: &'static str = "country";

    fn event_tag(kind: OperationKind) -> &'static str {
        match kind {
            OperationKind::None => "country.none",
            OperationKind::EditRequest => "country.edit_request",
            OperationKind::DeleteRequest => "country.delete_request",
            OperationKind::Inserting => "country.inserting",
            OperationKind::Inserted => "country.inserted",
            OperationKind::Updating => "country.updating",
            OperationKind::Updated => "country.updated",
            OperationKind::Deleting => "country.deleting",
            OperationKind::Deleted => "country.deleted",
        }
    }

    fn is_new(entity: &Country) -> bool {
        entity.is_new()
    }

    fn to_record(entity: &Country) -> Option<CountryRecord> {
        entity.id.map(|id| CountryRecord {
            id,
            name: entity.name.clone(),
            audit: entity.audit.clone(),
        })
    }
}
