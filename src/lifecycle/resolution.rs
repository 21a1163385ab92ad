use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Message recorded when a stage is canceled without an explicit reason.
pub const CANCELED_MESSAGE: &str = "Operation canceled";
/// Message recorded when a fault carries no usable message of its own.
pub const FAULTED_MESSAGE: &str = "Unexpected error";
/// Message recorded when validation fails without an explicit reason.
pub const INVALID_MESSAGE: &str = "Validation failed";

/// Misuse of the stage state machine. Both variants indicate a caller bug,
/// not a recoverable condition; callers must not catch and retry them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("stage resolution was already finalized")]
    AlreadyResolved,

    #[error("stage transition precondition violated: {0}")]
    PreconditionViolated(&'static str),
}

/// Final disposition of a stage.
///
/// `Approved` marks a stage handled with no failure (an approved request or
/// a completed write); `Valid` is the validation-stage success mark. The
/// remaining three are the terminal-failure reasons surfaced to the UI.
#[derive(Debug, Clone)]
pub enum Disposition {
    Approved,
    Valid,
    Canceled { message: String },
    Faulted { fault: Arc<anyhow::Error>, message: String },
    Invalid { message: String },
}

impl Disposition {
    /// The human-readable message, empty for the success marks.
    pub fn message(&self) -> &str {
        match self {
            Disposition::Approved | Disposition::Valid => "",
            Disposition::Canceled { message }
            | Disposition::Faulted { message, .. }
            | Disposition::Invalid { message } => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Disposition::Canceled { .. } | Disposition::Faulted { .. } | Disposition::Invalid { .. }
        )
    }

    pub fn fault(&self) -> Option<Arc<anyhow::Error>> {
        match self {
            Disposition::Faulted { fault, .. } => Some(Arc::clone(fault)),
            _ => None,
        }
    }
}

/// One-shot resolution record shared by every clone of a stage.
///
/// The first caller to resolve wins; every later attempt observes
/// [`StageError::AlreadyResolved`]. This is the only shared mutable state in
/// the lifecycle, and it must stay race-safe because the requesting thread
/// and the background write may both try to resolve the same stage.
#[derive(Debug, Default)]
pub struct StageResolution {
    state: Mutex<Option<Disposition>>,
}

impl StageResolution {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, disposition: Disposition) -> Result<(), StageError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_some() {
            return Err(StageError::AlreadyResolved);
        }
        *state = Some(disposition);
        Ok(())
    }

    /// Mark the stage handled with no failure.
    pub fn resolve_approved(&self) -> Result<(), StageError> {
        self.resolve(Disposition::Approved)
    }

    /// Mark the stage canceled. A blank or missing message defaults to
    /// [`CANCELED_MESSAGE`].
    pub fn resolve_canceled(&self, message: Option<&str>) -> Result<(), StageError> {
        let message = match message.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => CANCELED_MESSAGE.to_string(),
        };
        self.resolve(Disposition::Canceled { message })
    }

    /// Mark the stage faulted. The message falls back to the fault's own
    /// message, then to [`FAULTED_MESSAGE`].
    pub fn resolve_faulted(
        &self,
        fault: anyhow::Error,
        message: Option<&str>,
    ) -> Result<(), StageError> {
        let message = match message.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => {
                let derived = fault.to_string();
                if derived.trim().is_empty() {
                    FAULTED_MESSAGE.to_string()
                } else {
                    derived
                }
            }
        };
        self.resolve(Disposition::Faulted {
            fault: Arc::new(fault),
            message,
        })
    }

    /// Validation-stage failure mark. A blank or missing message defaults to
    /// [`INVALID_MESSAGE`].
    pub fn resolve_invalid(&self, message: Option<&str>) -> Result<(), StageError> {
        let message = match message.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => INVALID_MESSAGE.to_string(),
        };
        self.resolve(Disposition::Invalid { message })
    }

    /// Validation-stage success mark.
    pub fn resolve_valid(&self) -> Result<(), StageError> {
        self.resolve(Disposition::Valid)
    }

    /// Whether any disposition has been recorded.
    pub fn handled(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn canceled(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            Some(Disposition::Canceled { .. })
        )
    }

    pub fn valid(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            Some(Disposition::Valid)
        )
    }

    /// The recorded message, empty while unresolved or resolved successfully.
    pub fn message(&self) -> String {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|d| d.message().to_string())
            .unwrap_or_default()
    }

    pub fn fault(&self) -> Option<Arc<anyhow::Error>> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Disposition::fault)
    }

    /// Snapshot of the recorded disposition, if any.
    pub fn disposition(&self) -> Option<Disposition> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
