use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::entity::EntityBinding;
use crate::lifecycle::begin::BeginStage;
use crate::lifecycle::operation::{OperationClass, OperationKind};
use crate::lifecycle::resolution::{Disposition, StageError, StageResolution};

/// A user-initiated request to edit or delete an entity.
///
/// The request layer wires `approve`/`cancel` to user confirmation; an
/// approved request is consumed into a [`BeginStage`]. Clones share one
/// resolution record, so a handler holding a clone can still cancel the
/// request another handler is about to approve — the first resolver wins.
#[derive(Debug)]
pub struct RequestStage<B: EntityBinding> {
    entity: Arc<B::Entity>,
    kind: OperationKind,
    operation_id: Uuid,
    resolution: Arc<StageResolution>,
}

impl<B: EntityBinding> Clone for RequestStage<B> {
    fn clone(&self) -> Self {
        Self {
            entity: Arc::clone(&self.entity),
            kind: self.kind,
            operation_id: self.operation_id,
            resolution: Arc::clone(&self.resolution),
        }
    }
}

impl<B: EntityBinding> RequestStage<B> {
    /// Request to edit (save) the entity. Classifies as insert or update at
    /// approval time, based on whether the entity has been persisted.
    pub fn edit(entity: B::Entity) -> Self {
        Self::with_kind(entity, OperationKind::EditRequest)
    }

    /// Request to delete the entity.
    pub fn delete(entity: B::Entity) -> Self {
        Self::with_kind(entity, OperationKind::DeleteRequest)
    }

    fn with_kind(entity: B::Entity, kind: OperationKind) -> Self {
        let stage = Self {
            entity: Arc::new(entity),
            kind,
            operation_id: Uuid::new_v4(),
            resolution: Arc::new(StageResolution::new()),
        };
        debug!(
            "request opened: entity={}, kind={:?}, id={}",
            B::NAME,
            kind,
            stage.operation_id
        );
        stage
    }

    pub fn entity(&self) -> &B::Entity {
        &self.entity
    }

    /// `EditRequest` or `DeleteRequest`.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Correlation id carried through the whole stage chain.
    pub fn operation_id(&self) -> Uuid {
        self.operation_id
    }

    /// Dispatch tag for the request, from the entity binding.
    pub fn event_tag(&self) -> &'static str {
        B::event_tag(self.kind)
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

    /// Approve the request so the mutation may begin.
    pub fn approve(&self) -> Result<(), StageError> {
        self.resolution.resolve_approved()
    }

    /// Cancel the request. Blank messages default to "Operation canceled".
    pub fn cancel(&self, message: Option<&str>) -> Result<(), StageError> {
        self.resolution.resolve_canceled(message)
    }

    /// Record a fault raised while the request was being evaluated.
    pub fn fault(&self, fault: anyhow::Error, message: Option<&str>) -> Result<(), StageError> {
        self.resolution.resolve_faulted(fault, message)
    }

    /// Consume the approved request into the running mutation.
    ///
    /// Requires the request to be resolved approved: calling this on an
    /// unresolved, canceled, or faulted request is caller misuse and yields
    /// [`StageError::PreconditionViolated`].
    pub fn into_begin(self) -> Result<BeginStage<B>, StageError> {
        match self.resolution.disposition() {
            Some(Disposition::Approved) => {}
            None => {
                return Err(StageError::PreconditionViolated(
                    "request has not been approved",
                ))
            }
            Some(_) => {
                return Err(StageError::PreconditionViolated(
                    "request was canceled or faulted",
                ))
            }
        }
        let class = match self.kind {
            OperationKind::DeleteRequest => OperationClass::Delete,
            OperationKind::EditRequest if B::is_new(&self.entity) => OperationClass::Insert,
            OperationKind::EditRequest => OperationClass::Update,
            _ => {
                return Err(StageError::PreconditionViolated(
                    "stage does not carry a request kind",
                ))
            }
        };
        Ok(BeginStage::from_request(
            self.entity,
            class,
            self.operation_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::customer::CustomerBinding;
    use crate::testing;

    #[test]
    fn edit_of_new_entity_begins_as_insert() {
        let request = RequestStage::<CustomerBinding>::edit(testing::new_customer());
        request.approve().unwrap();
        let begin = request.into_begin().unwrap();
        assert_eq!(begin.class(), OperationClass::Insert);
        assert_eq!(begin.kind(), OperationKind::Inserting);
    }

    #[test]
    fn edit_of_saved_entity_begins_as_update() {
        let request = RequestStage::<CustomerBinding>::edit(testing::saved_customer(12));
        request.approve().unwrap();
        let begin = request.into_begin().unwrap();
        assert_eq!(begin.class(), OperationClass::Update);
    }

    #[test]
    fn delete_request_begins_as_delete() {
        let request = RequestStage::<CustomerBinding>::delete(testing::saved_customer(12));
        request.approve().unwrap();
        assert_eq!(request.into_begin().unwrap().class(), OperationClass::Delete);
    }

    #[test]
    fn unresolved_request_cannot_begin() {
        let request = RequestStage::<CustomerBinding>::edit(testing::new_customer());
        assert!(matches!(
            request.into_begin(),
            Err(StageError::PreconditionViolated(_))
        ));
    }

    #[test]
    fn canceled_request_cannot_begin() {
        let request = RequestStage::<CustomerBinding>::delete(testing::saved_customer(3));
        request.cancel(Some("user aborted")).unwrap();
        assert_eq!(request.message(), "user aborted");
        assert!(matches!(
            request.into_begin(),
            Err(StageError::PreconditionViolated(_))
        ));
    }

    #[test]
    fn clone_shares_resolution() {
        let request = RequestStage::<CustomerBinding>::edit(testing::new_customer());
        let other = request.clone();
        other.cancel(None).unwrap();
        assert!(request.canceled());
        assert_eq!(request.approve(), Err(StageError::AlreadyResolved));
        assert_eq!(request.operation_id(), other.operation_id());
    }

    #[test]
    fn request_event_tags_come_from_binding() {
        let edit = RequestStage::<CustomerBinding>::edit(testing::new_customer());
        let delete = RequestStage::<CustomerBinding>::delete(testing::saved_customer(1));
        assert_eq!(edit.event_tag(), "customer.edit_request");
        assert_eq!(delete.event_tag(), "customer.delete_request");
    }
}
