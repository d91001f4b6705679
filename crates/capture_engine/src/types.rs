use std::sync::Arc;

use capture_core::{CaptureError, CaptureOutcome};
use thiserror::Error;

/// Click handler of a copy control. Compared by reference when restored.
pub type ClickHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard permission denied")]
    PermissionDenied,
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

impl From<ClipboardError> for CaptureError {
    fn from(_: ClipboardError) -> Self {
        // Hosts only expose permission-gated reads, so every failure is reported the same way.
        CaptureError::ClipboardPermissionDenied
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Progress {
        current: usize,
        total: usize,
    },
    Finished {
        outcome: CaptureOutcome,
    },
    Aborted {
        reason: CaptureError,
        outcome: CaptureOutcome,
    },
    Rejected {
        reason: CaptureError,
    },
}

impl CaptureEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CaptureEvent::Progress { .. })
    }

    pub fn status_message(&self) -> String {
        match self {
            CaptureEvent::Progress { current, total } => format!("Capturing {current} of {total}"),
            CaptureEvent::Finished { outcome } => outcome.status_message(),
            CaptureEvent::Aborted { reason, outcome } => format!(
                "Capture stopped after {} of {} messages: {reason}",
                outcome.messages.len(),
                outcome.total
            ),
            CaptureEvent::Rejected { reason } => format!("Capture not started: {reason}"),
        }
    }
}

/// A run that did not finish; `partial` holds whatever was captured first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct CaptureFailure {
    pub reason: CaptureError,
    pub partial: CaptureOutcome,
}

impl CaptureFailure {
    pub(crate) fn rejected(reason: CaptureError) -> Self {
        Self {
            reason,
            partial: CaptureOutcome::default(),
        }
    }
}
