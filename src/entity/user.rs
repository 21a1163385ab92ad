use serde::{Deserialize, Serialize};

use super::{AuditFields, EntityBinding, RowState, RuleViolation};
use crate::lifecycle::operation::OperationKind;

pub const MAX_USER_NAME_LEN: usize = 50;

/// Access level of a scheduler login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Inactive,
    Normal,
    Admin,
}

/// A scheduler login that appointments are assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i32>,
    pub user_name: String,
    /// Password hash; never the clear text.
    pub password: String,
    pub status: UserStatus,
    pub state: RowState,
    pub audit: AuditFields,
}

/// Persisted `user` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i32,
    pub user_name: String,
    pub password: String,
    pub status: UserStatus,
    pub audit: AuditFields,
}

impl User {
    pub fn new(user_name: impl Into<String>, password: impl Into<String>, user: &str) -> Self {
        Self {
            id: None,
            user_name: user_name.into(),
            password: password.into(),
            status: UserStatus::Normal,
            state: RowState::New,
            audit: AuditFields::create(user),
        }
    }

    pub fn from_record(record: UserRecord) -> Self {
        Self {
            id: Some(record.id),
            user_name: record.user_name,
            password: record.password,
            status: record.status,
            state: RowState::Unmodified,
            audit: record.audit,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn check_rules(&self) -> Vec<RuleViolation> {
        let mut violations = Vec::new();
        if self.user_name.trim().is_empty() {
            violations.push(RuleViolation::new("user_name", "user name is required"));
        } else if self.user_name.len() > MAX_USER_NAME_LEN {
            violations.push(RuleViolation::new(
                "user_name",
                format!("user name exceeds {MAX_USER_NAME_LEN} characters"),
            ));
        }
        if self.password.is_empty() {
            violations.push(RuleViolation::new("password", "password hash is required"));
        }
        violations
    }
}

/// Lifecycle binding for [`User`].
#[derive(Debug, Clone, Copy)]
pub struct UserBinding;

impl EntityBinding for UserBinding {
    type Entity = User;
    type Record = UserRecord;

    const NAME: &'static str = "user";

    fn event_tag(kind: OperationKind) -> &'static str {
        match kind {
            OperationKind::None => "user.none",
            OperationKind::EditRequest => "user.edit_request",
            OperationKind::DeleteRequest => "user.delete_request",
            OperationKind::Inserting => "user.inserting",
            OperationKind::Inserted => "user.inserted",
            OperationKind::Updating => "user.updating",
            OperationKind::Updated => "user.updated",
            OperationKind::Deleting => "user.deleting",
            OperationKind::Deleted => "user.deleted",
        }
    }

    fn is_new(entity: &User) -> bool {
        entity.is_new()
    }

    fn to_record(entity: &User) -> Option<UserRecord> {
        entity.id.map(|id| UserRecord {
            id,
            user_name: entity.user_name.clone(),
            password: entity.password.clone(),
            status: entity.status,
            audit: entity.audit.clone(),
        })
    }
}
