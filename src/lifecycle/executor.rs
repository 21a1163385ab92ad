use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::entity::EntityBinding;
use crate::lifecycle::begin::BeginStage;
use crate::lifecycle::outcome::MutationOutcome;
use crate::lifecycle::request::RequestStage;
use crate::lifecycle::resolution::{Disposition, StageError};
use crate::lifecycle::validate::ValidateStage;

/// Applies the database write for a running mutation.
///
/// Runs inside the persistence layer's transaction; the transaction commits
/// or rolls back based on the terminal outcome, which is outside this
/// crate's scope. Returning `Err` routes the chain straight to a faulted
/// failure, skipping validation.
#[async_trait]
pub trait MutationWriter<B: EntityBinding>: Send + Sync {
    async fn apply(&self, stage: &BeginStage<B>) -> anyhow::Result<()>;
}

/// Runs business-rule checks before the write may commit.
///
/// Implementations must resolve the stage exactly once via `mark_valid`,
/// `mark_invalid`, `cancel`, or `fault`. Returning `Err` without resolving
/// is treated as a fault.
#[async_trait]
pub trait MutationValidator<B: EntityBinding>: Send + Sync {
    async fn validate(&self, stage: &ValidateStage<B>) -> anyhow::Result<()>;
}

/// Time budgets for the external collaborators.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub write_timeout: Duration,
    pub validate_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_secs(30),
            validate_timeout: Duration::from_secs(5),
        }
    }
}

/// Drives an approved request through begin → write → validate → terminal
/// outcome, enforcing the one-shot rules at every handoff.
///
/// Cancellation stays cooperative: a `cancel` on a stage clone wins only if
/// it resolves before the executor does, and an in-flight write is never
/// interrupted — a lost race is converted into the canceled terminal after
/// the write returns.
#[derive(Debug, Default)]
pub struct OperationExecutor {
    config: ExecutorConfig,
}

impl OperationExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Run a full stage chain. The request must already be approved;
    /// passing an unapproved or canceled request is caller misuse and
    /// surfaces the underlying [`StageError`].
    pub async fn run<B: EntityBinding>(
        &self,
        request: RequestStage<B>,
        writer: &dyn MutationWriter<B>,
        validator: &dyn MutationValidator<B>,
    ) -> Result<MutationOutcome<B>, StageError> {
        let begin = request.into_begin()?;
        info!(
            "mutation starting: entity={}, kind={:?}, id={}",
            B::NAME,
            begin.kind(),
            begin.operation_id()
        );

        match timeout(self.config.write_timeout, writer.apply(&begin)).await {
            Err(_) => {
                warn!(
                    "write timed out: entity={}, id={}",
                    B::NAME,
                    begin.operation_id()
                );
                return begin
                    .into_fault(anyhow::anyhow!("database write timed out"), None)
                    .map(MutationOutcome::Failed);
            }
            Ok(Err(err)) => {
                warn!(
                    "write faulted: entity={}, id={}, error={}",
                    B::NAME,
                    begin.operation_id(),
                    err
                );
                return begin.into_fault(err, None).map(MutationOutcome::Failed);
            }
            Ok(Ok(())) => {}
        }

        // The write finished, but a cancel may have resolved the stage
        // first; the first resolver is authoritative.
        match begin.complete() {
            Ok(()) => {}
            Err(StageError::AlreadyResolved) => {
                debug!(
                    "begin stage resolved during write: entity={}, id={}",
                    B::NAME,
                    begin.operation_id()
                );
                return begin.into_failure().map(MutationOutcome::Failed);
            }
            Err(err) => return Err(err),
        }

        let validating = begin.into_validating()?;
        match timeout(self.config.validate_timeout, validator.validate(&validating)).await {
            Err(_) => {
                return validating
                    .into_fault(anyhow::anyhow!("validation timed out"), None)
                    .map(MutationOutcome::Failed);
            }
            Ok(Err(err)) if !validating.handled() => {
                return validating.into_fault(err, None).map(MutationOutcome::Failed);
            }
            Ok(_) => {}
        }

        let outcome = match validating.disposition() {
            Some(Disposition::Valid) => {
                let completed = validating.into_completed()?;
                info!(
                    "mutation completed: entity={}, kind={:?}, id={}",
                    B::NAME,
                    completed.kind(),
                    completed.operation_id()
                );
                MutationOutcome::Completed(completed)
            }
            Some(Disposition::Invalid { .. }) => {
                MutationOutcome::Failed(validating.into_invalid()?)
            }
            Some(Disposition::Canceled { .. }) => {
                MutationOutcome::Failed(validating.into_canceled(None)?)
            }
            Some(Disposition::Faulted { .. }) => MutationOutcome::Failed(
                validating.into_fault(anyhow::anyhow!("validation faulted"), None)?,
            ),
            Some(Disposition::Approved) | None => MutationOutcome::Failed(
                validating.into_fault(
                    anyhow::anyhow!("validator returned without resolving the stage"),
                    None,
                )?,
            ),
        };

        if let MutationOutcome::Failed(failure) = &outcome {
            warn!(
                "mutation failed: entity={}, kind={:?}, id={}, canceled={}, message={}",
                B::NAME,
                failure.kind(),
                failure.operation_id(),
                failure.canceled(),
                failure.message()
            );
        }
        Ok(outcome)
    }
}
