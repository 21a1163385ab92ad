use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::entity::EntityBinding;
use crate::lifecycle::operation::{OperationClass, OperationKind};
use crate::lifecycle::resolution::{Disposition, FAULTED_MESSAGE};

/// Successful terminal outcome. Immutable; nothing further can be derived
/// from it. Carries the finalized entity for the presentation layer.
#[derive(Debug)]
pub struct CompletionStage<B: EntityBinding> {
    entity: Arc<B::Entity>,
    kind: OperationKind,
    operation_id: Uuid,
}

impl<B: EntityBinding> Clone for CompletionStage<B> {
    fn clone(&self) -> Self {
        Self {
            entity: Arc::clone(&self.entity),
            kind: self.kind,
            operation_id: self.operation_id,
        }
    }
}

impl<B: EntityBinding> CompletionStage<B> {
    pub(crate) fn new(entity: Arc<B::Entity>, kind: OperationKind, operation_id: Uuid) -> Self {
        Self {
            entity,
            kind,
            operation_id,
        }
    }

    pub fn entity(&self) -> &B::Entity {
        &self.entity
    }

    /// `Inserted`, `Updated`, or `Deleted`.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn class(&self) -> Option<OperationClass> {
        self.kind.classify()
    }

    pub fn operation_id(&self) -> Uuid {
        self.operation_id
    }

    pub fn event_tag(&self) -> &'static str {
        B::event_tag(self.kind)
    }

    pub fn successful(&self) -> bool {
        true
    }

    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            entity: B::NAME,
            tag: self.event_tag(),
            kind: self.kind,
            operation_id: self.operation_id,
            successful: true,
            canceled: false,
            message: String::new(),
        }
    }
}

/// Failed terminal outcome. Immutable.
///
/// Precisely one of `canceled` or a non-null `fault` is the informative
/// case; an invalid-validation failure sets neither and the message alone
/// carries the reason.
#[derive(Debug)]
pub struct FailureStage<B: EntityBinding> {
    entity: Arc<B::Entity>,
    kind: OperationKind,
    operation_id: Uuid,
    canceled: bool,
    fault: Option<Arc<anyhow::Error>>,
    message: String,
}

impl<B: EntityBinding> Clone for FailureStage<B> {
    fn clone(&self) -> Self {
        Self {
            entity: Arc::clone(&self.entity),
            kind: self.kind,
            operation_id: self.operation_id,
            canceled: self.canceled,
            fault: self.fault.clone(),
            message: self.message.clone(),
        }
    }
}

impl<B: EntityBinding> FailureStage<B> {
    pub(crate) fn from_disposition(
        entity: Arc<B::Entity>,
        kind: OperationKind,
        operation_id: Uuid,
        disposition: Disposition,
    ) -> Self {
        let (canceled, fault, message) = match disposition {
            Disposition::Canceled { message } => (true, None, message),
            Disposition::Faulted { fault, message } => (false, Some(fault), message),
            Disposition::Invalid { message } => (false, None, message),
            // Success dispositions never reach here through the stage
            // conversions; fall back to the default failure message.
            Disposition::Approved | Disposition::Valid => {
                (false, None, FAULTED_MESSAGE.to_string())
            }
        };
        Self {
            entity,
            kind,
            operation_id,
            canceled,
            fault,
            message,
        }
    }

    pub fn entity(&self) -> &B::Entity {
        &self.entity
    }

    /// The in-progress kind at the point of failure.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn operation_id(&self) -> Uuid {
        self.operation_id
    }

    pub fn event_tag(&self) -> &'static str {
        B::event_tag(self.kind)
    }

    pub fn canceled(&self) -> bool {
        self.canceled
    }

    pub fn fault(&self) -> Option<&anyhow::Error> {
        self.fault.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            entity: B::NAME,
            tag: self.event_tag(),
            kind: self.kind,
            operation_id: self.operation_id,
            successful: false,
            canceled: self.canceled,
            message: self.message.clone(),
        }
    }
}

/// Terminal result of a stage chain, consumed by the presentation layer.
pub enum MutationOutcome<B: EntityBinding> {
    Completed(CompletionStage<B>),
    Failed(FailureStage<B>),
}

impl<B: EntityBinding> std::fmt::Debug for MutationOutcome<B>
where
    CompletionStage<B>: std::fmt::Debug,
    FailureStage<B>: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationOutcome::Completed(stage) => {
                f.debug_tuple("Completed").field(stage).finish()
            }
            MutationOutcome::Failed(stage) => f.debug_tuple("Failed").field(stage).finish(),
        }
    }
}

impl<B: EntityBinding> Clone for MutationOutcome<B> {
    fn clone(&self) -> Self {
        match self {
            MutationOutcome::Completed(stage) => MutationOutcome::Completed(stage.clone()),
            MutationOutcome::Failed(stage) => MutationOutcome::Failed(stage.clone()),
        }
    }
}

impl<B: EntityBinding> MutationOutcome<B> {
    pub fn successful(&self) -> bool {
        matches!(self, MutationOutcome::Completed(_))
    }

    pub fn completed(&self) -> Option<&CompletionStage<B>> {
        match self {
            MutationOutcome::Completed(stage) => Some(stage),
            MutationOutcome::Failed(_) => None,
        }
    }

    pub fn failed(&self) -> Option<&FailureStage<B>> {
        match self {
            MutationOutcome::Completed(_) => None,
            MutationOutcome::Failed(stage) => Some(stage),
        }
    }

    pub fn summary(&self) -> OutcomeSummary {
        match self {
            MutationOutcome::Completed(stage) => stage.summary(),
            MutationOutcome::Failed(stage) => stage.summary(),
        }
    }
}

/// Serializable report of a terminal outcome, for logs and API responses.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary {
    pub entity: &'static str,
    pub tag: &'static str,
    pub kind: OperationKind,
    pub operation_id: Uuid,
    pub successful: bool,
    pub canceled: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::customer::CustomerBinding;
    use crate::lifecycle::request::RequestStage;
    use crate::testing;

    fn completed_insert() -> CompletionStage<CustomerBinding> {
        let request = RequestStage::<CustomerBinding>::edit(testing::new_customer());
        request.approve().unwrap();
        let begin = request.into_begin().unwrap();
        begin.complete().unwrap();
        let validating = begin.into_validating().unwrap();
        validating.mark_valid().unwrap();
        validating.into_completed().unwrap()
    }

    #[test]
    fn completion_reports_finished_kind_and_tag() {
        let completed = completed_insert();
        assert_eq!(completed.kind(), OperationKind::Inserted);
        assert_eq!(completed.event_tag(), "customer.inserted");
        assert_eq!(completed.class(), Some(OperationClass::Insert));
    }

    #[test]
    fn summary_serializes() {
        let completed = completed_insert();
        let value = serde_json::to_value(completed.summary()).unwrap();
        assert_eq!(value["entity"], "customer");
        assert_eq!(value["kind"], "inserted");
        assert_eq!(value["successful"], true);
        assert_eq!(value["message"], "");
    }

    #[test]
    fn failure_summary_carries_reason() {
        let request = RequestStage::<CustomerBinding>::delete(testing::saved_customer(4));
        request.approve().unwrap();
        let begin = request.into_begin().unwrap();
        let failure = begin.into_canceled(Some("user aborted")).unwrap();
        let summary = failure.summary();
        assert!(!summary.successful);
        assert!(summary.canceled);
        assert_eq!(summary.message, "user aborted");
        assert_eq!(summary.tag, "customer.deleting");
    }
}
