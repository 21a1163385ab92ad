use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::entity::EntityBinding;
use crate::lifecycle::operation::{OperationClass, OperationKind};
use crate::lifecycle::outcome::FailureStage;
use crate::lifecycle::resolution::{Disposition, StageError, StageResolution};
use crate::lifecycle::validate::ValidateStage;

/// The running mutation attempt, between an approved request and either
/// validation or a terminal failure.
///
/// The executor performing the database write must resolve this stage
/// exactly once: `complete` + [`BeginStage::into_validating`] on success, or
/// one of the terminal shortcuts when the write itself fails or is canceled.
#[derive(Debug)]
pub struct BeginStage<B: EntityBinding> {
    entity: Arc<B::Entity>,
    class: OperationClass,
    operation_id: Uuid,
    resolution: Arc<StageResolution>,
}

impl<B: EntityBinding> Clone for BeginStage<B> {
    fn clone(&self) -> Self {
        Self {
            entity: Arc::clone(&self.entity),
            class: self.class,
            operation_id: self.operation_id,
            resolution: Arc::clone(&self.resolution),
        }
    }
}

impl<B: EntityBinding> BeginStage<B> {
    pub(crate) fn from_request(
        entity: Arc<B::Entity>,
        class: OperationClass,
        operation_id: Uuid,
    ) -> Self {
        debug!(
            "mutation beginning: entity={}, kind={:?}, id={}",
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

    /// The mutation class fixed at construction from the request subtype.
    pub fn class(&self) -> OperationClass {
        self.class
    }

    /// `Inserting`, `Updating`, or `Deleting`.
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

    pub fn canceled(&self) -> bool {
        self.resolution.canceled()
    }

    pub fn message(&self) -> String {
        self.resolution.message()
    }

    /// Mark the write finished with no failure, gating `into_validating`.
    pub fn complete(&self) -> Result<(), StageError> {
        self.resolution.resolve_approved()
    }

    /// Cancel the running mutation. Cooperative only: has no effect once the
    /// stage has resolved, and cannot interrupt an in-flight write.
    pub fn cancel(&self, message: Option<&str>) -> Result<(), StageError> {
        self.resolution.resolve_canceled(message)
    }

    /// Record a fault raised by the write.
    pub fn fault(&self, fault: anyhow::Error, message: Option<&str>) -> Result<(), StageError> {
        self.resolution.resolve_faulted(fault, message)
    }

    /// Consume the successfully completed stage into validation.
    pub fn into_validating(self) -> Result<ValidateStage<B>, StageError> {
        match self.resolution.disposition() {
            Some(Disposition::Approved) => Ok(ValidateStage::from_begin(
                self.entity,
                self.class,
                self.operation_id,
            )),
            None => Err(StageError::PreconditionViolated(
                "begin stage has not completed",
            )),
            Some(_) => Err(StageError::PreconditionViolated(
                "begin stage did not resolve successfully",
            )),
        }
    }

    /// Terminal shortcut: resolve as faulted and skip validation entirely.
    ///
    /// If a racing caller already resolved the stage as a failure, that
    /// first resolution is authoritative and the failure is built from it.
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

    /// Terminal shortcut: resolve as canceled and skip validation entirely.
    pub fn into_canceled(self, message: Option<&str>) -> Result<FailureStage<B>, StageError> {
        match self.resolution.resolve_canceled(message) {
            Ok(()) | Err(StageError::AlreadyResolved) => {}
            Err(err) => return Err(err),
        }
        self.into_failure()
    }

    /// Consume a stage whose resolution already records a failure.
    pub fn into_failure(self) -> Result<FailureStage<B>, StageError> {
        match self.resolution.disposition() {
            Some(disposition) if disposition.is_failure() => Ok(FailureStage::from_disposition(
                self.entity,
                self.class.running(),
                self.operation_id,
                disposition,
            )),
            Some(_) => Err(StageError::PreconditionViolated(
                "begin stage resolved successfully; there is no failure to report",
            )),
            None => Err(StageError::PreconditionViolated(
                "begin stage is unresolved",
            )),
        }
    }
}
