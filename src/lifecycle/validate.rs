use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::entity::EntityBinding;
use crate::lifecycle::operation::{OperationClass, OperationKind};
use crate::lifecycle::outcome::{CompletionStage, FailureStage};
use crate::lifecycle::resolution::{Disposition, StageError, StageResolution};

/// Business-rule validation before the write is allowed to commit.
///
/// This is the one point where application-level checks run: required
/// fields, referential integrity, overlapping-appointment conflicts. The
/// validator resolves the stage exactly once and then converts it to the
/// matching terminal: `mark_valid` → `into_completed`, `mark_invalid` →
/// `into_invalid`, cancel/fault → `into_canceled`/`into_fault`.
///
/// Invalid and canceled are distinct terminal reasons here; converting an
/// invalid stage through the canceled or faulted path is caller misuse.
#[derive(Debug)]
pub struct ValidateStage<B: EntityBinding> {
    entity: Arc<B::Entity>,
    class: OperationClass,
    operation_id: Uuid,
    resolution: Arc<StageResolution>,
}

impl<B: EntityBinding> Clone for ValidateStage<B> {
    fn clone(&self) -> Self {
        Self {
            entity: Arc::clone(&self.entity),
            class: self.class,
            operation_id: self.operation_id,
            resolution: Arc::clone(&self.resolution),
        }
    }
}

impl<B: EntityBinding> ValidateStage<B> {
    pub(crate) fn from_begin(
        entity: Arc<B::Entity>,
        class: OperationClass,
        operation_id: Uuid,
    ) -> Self {
        debug!(
            "validating: entity={}, kind={:?}, id={}",
            B::NAME,
            class.running(),
            operation_id
        );
        Self {
            entity,
            class,
            operation_id,
            resolution: Arc::new(StageResolution::new()),
        }
    }

    pub fn entity(&self) -> &B::Entity {
        &self.entity
    }

    pub fn class(&self) -> OperationClass {
        self.class
    }

    /// Still the in-progress kind; the finished kind is minted by
    /// [`ValidateStage::into_completed`].
    pub fn kind(&self) -> OperationKind {
        self.class.running()
    }

    pub fn operation_id(&self) -> Uuid {
        self.operation_id
    }

    pub fn event_tag(&self) -> &'static str {
        B::event_tag(self.kind())
    }

    pub fn handled(&self) -> bool {
        self.resolution.handled()
    }

    pub fn valid(&self) -> bool {
        self.resolution.valid()
    }

    pub fn canceled(&self) -> bool {
        self.resolution.canceled()
    }

    pub fn message(&self) -> String {
        self.resolution.message()
    }

    /// Snapshot of the recorded disposition, if any.
    pub fn disposition(&self) -> Option<Disposition> {
        self.resolution.disposition()
    }

    /// All business rules passed; the write may commit.
    pub fn mark_valid(&self) -> Result<(), StageError> {
        self.resolution.resolve_valid()
    }

    /// A business rule failed. Blank messages default to "Validation failed".
    pub fn mark_invalid(&self, message: Option<&str>) -> Result<(), StageError> {
        self.resolution.resolve_invalid(message)
    }

    pub fn cancel(&self, message: Option<&str>) -> Result<(), StageError> {
        self.resolution.resolve_canceled(message)
    }

    pub fn fault(&self, fault: anyhow::Error, message: Option<&str>) -> Result<(), StageError> {
        self.resolution.resolve_faulted(fault, message)
    }

    /// Consume a valid stage into the successful terminal outcome.
    pub fn into_completed(self) -> Result<CompletionStage<B>, StageError> {
        match self.resolution.disposition() {
            Some(Disposition::Valid) => Ok(CompletionStage::new(
                self.entity,
                self.class.finished(),
                self.operation_id,
            )),
            None => Err(StageError::PreconditionViolated(
                "validation has not resolved",
            )),
            Some(_) => Err(StageError::PreconditionViolated(
                "validation did not resolve as valid",
            )),
        }
    }

    /// Consume an invalid stage into the failed terminal outcome. The
    /// failure carries neither a cancel flag nor a fault; the message is the
    /// informative part.
    pub fn into_invalid(self) -> Result<FailureStage<B>, StageError> {
        match self.resolution.disposition() {
            Some(disposition @ Disposition::Invalid { .. }) => Ok(FailureStage::from_disposition(
                self.entity,
                self.class.running(),
                self.operation_id,
                disposition,
            )),
            None => Err(StageError::PreconditionViolated(
                "validation has not resolved",
            )),
            Some(_) => Err(StageError::PreconditionViolated(
                "validation did not resolve as invalid",
            )),
        }
    }

    /// Terminal shortcut: resolve as faulted. A racing cancel or fault that
    /// resolved first is authoritative; a valid or invalid resolution makes
    /// this conversion misuse.
    pub fn into_fault(
        self,
        fault: anyhow::Error,
        message: Option<&str>,
    ) -> Result<FailureStage<B>, StageError> {
        match self.resolution.resolve_faulted(fault, message) {
            Ok(()) | Err(StageError::AlreadyResolved) => {}
            Err(err) => return Err(err),
        }
        self.into_failure()
    }

    /// Terminal shortcut: resolve as canceled. Same race rules as
    /// [`ValidateStage::into_fault`].
    pub fn into_canceled(self, message: Option<&str>) -> Result<FailureStage<B>, StageError> {
        match self.resolution.resolve_canceled(message) {
            Ok(()) | Err(StageError::AlreadyResolved) => {}
            Err(err) => return Err(err),
        }
        self.into_failure()
    }

    fn into_failure(self) -> Result<FailureStage<B>, StageError> {
        match self.resolution.disposition() {
            Some(disposition @ (Disposition::Canceled { .. } | Disposition::Faulted { .. })) => {
                Ok(FailureStage::from_disposition(
                    self.entity,
                    self.class.running(),
                    self.operation_id,
                    disposition,
                ))
            }
            Some(Disposition::Invalid { .. }) => Err(StageError::PreconditionViolated(
                "invalid validation must convert through into_invalid",
            )),
            Some(_) => Err(StageError::PreconditionViolated(
                "validation resolved successfully; there is no failure to report",
            )),
            None => Err(StageError::PreconditionViolated(
                "validation is unresolved",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::customer::CustomerBinding;
    use crate::lifecycle::request::RequestStage;
    use crate::lifecycle::resolution::INVALID_MESSAGE;
    use crate::testing;

    fn validating_insert() -> ValidateStage<CustomerBinding> {
        let request = RequestStage::<CustomerBinding>::edit(testing::new_customer());
        request.approve().unwrap();
        let begin = request.into_begin().unwrap();
        begin.complete().unwrap();
        begin.into_validating().unwrap()
    }

    #[test]
    fn valid_stage_completes() {
        let stage = validating_insert();
        stage.mark_valid().unwrap();
        let completed = stage.into_completed().unwrap();
        assert_eq!(completed.kind(), OperationKind::Inserted);
        assert!(completed.successful());
    }

    #[test]
    fn unresolved_stage_cannot_complete() {
        let stage = validating_insert();
        assert!(matches!(
            stage.into_completed(),
            Err(StageError::PreconditionViolated(_))
        ));
    }

    #[test]
    fn invalid_stage_cannot_complete() {
        let stage = validating_insert();
        stage.mark_invalid(Some("name required")).unwrap();
        assert!(matches!(
            stage.into_completed(),
            Err(StageError::PreconditionViolated(_))
        ));
    }

    #[test]
    fn invalid_stage_converts_through_into_invalid() {
        let stage = validating_insert();
        stage.mark_invalid(Some("name required")).unwrap();
        let failure = stage.into_invalid().unwrap();
        assert!(!failure.canceled());
        assert!(failure.fault().is_none());
        assert_eq!(failure.message(), "name required");
    }

    #[test]
    fn invalid_stage_rejects_canceled_conversion() {
        let stage = validating_insert();
        stage.mark_invalid(Some("name required")).unwrap();
        assert!(matches!(
            stage.into_canceled(Some("wrong path")),
            Err(StageError::PreconditionViolated(_))
        ));
    }

    #[test]
    fn valid_stage_rejects_failure_conversions() {
        let stage = validating_insert();
        stage.mark_valid().unwrap();
        assert!(matches!(
            stage.clone().into_canceled(None),
            Err(StageError::PreconditionViolated(_))
        ));
        assert!(matches!(
            stage.into_fault(anyhow::anyhow!("late fault"), None),
            Err(StageError::PreconditionViolated(_))
        ));
    }

    #[test]
    fn invalid_defaults_message() {
        let stage = validating_insert();
        stage.mark_invalid(None).unwrap();
        assert_eq!(stage.message(), INVALID_MESSAGE);
    }

    #[test]
    fn mark_valid_is_one_shot() {
        let stage = validating_insert();
        stage.mark_valid().unwrap();
        assert_eq!(stage.mark_valid(), Err(StageError::AlreadyResolved));
        assert_eq!(stage.mark_invalid(None), Err(StageError::AlreadyResolved));
    }

    #[test]
    fn racing_cancel_is_authoritative_for_fault_shortcut() {
        let stage = validating_insert();
        stage.clone().cancel(Some("user aborted")).unwrap();
        let failure = stage.into_fault(anyhow::anyhow!("broken"), None).unwrap();
        assert!(failure.canceled());
        assert_eq!(failure.message(), "user aborted");
    }
}
