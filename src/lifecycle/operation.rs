use serde::{Deserialize, Serialize};

/// Lifecycle phase of a database mutation, from the initial user request
/// through the in-progress write to the finished state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    None,
    EditRequest,
    DeleteRequest,
    Inserting,
    Inserted,
    Updating,
    Updated,
    Deleting,
    Deleted,
}

/// Coarse classification of a mutation, used to pick the concrete
/// in-progress and finished kinds for a stage chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationClass {
    Insert,
    Update,
    Delete,
}

impl OperationKind {
    /// Classify the mutation this kind belongs to.
    ///
    /// `EditRequest` and `None` have no class yet: an edit request only
    /// resolves to insert or update once the target's row state is known.
    /// A delete request is always a delete.
    pub fn classify(self) -> Option<OperationClass> {
        match self {
            OperationKind::Inserting | OperationKind::Inserted => Some(OperationClass::Insert),
            OperationKind::Updating | OperationKind::Updated => Some(OperationClass::Update),
            OperationKind::Deleting | OperationKind::Deleted | OperationKind::DeleteRequest => {
                Some(OperationClass::Delete)
            }
            OperationKind::EditRequest | OperationKind::None => None,
        }
    }

    /// Whether this is one of the two user-request kinds.
    pub fn is_request(self) -> bool {
        matches!(self, OperationKind::EditRequest | OperationKind::DeleteRequest)
    }

    /// Whether this kind describes a finished mutation.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            OperationKind::Inserted | OperationKind::Updated | OperationKind::Deleted
        )
    }
}

impl OperationClass {
    /// The in-progress kind for this class.
    pub fn running(self) -> OperationKind {
        match self {
            OperationClass::Insert => OperationKind::Inserting,
            OperationClass::Update => OperationKind::Updating,
            OperationClass::Delete => OperationKind::Deleting,
        }
    }

    /// The finished kind for this class.
    pub fn finished(self) -> OperationKind {
        match self {
            OperationClass::Insert => OperationKind::Inserted,
            OperationClass::Update => OperationKind::Updated,
            OperationClass::Delete => OperationKind::Deleted,
        }
    }
}
