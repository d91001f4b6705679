use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum CaptureError {
    #[error("no messages are selected for capture")]
    EmptyQueue,
    #[error("a capture run is already in progress")]
    RunInProgress,
    #[error("clipboard access was denied; allow clipboard permission and start the capture again")]
    ClipboardPermissionDenied,
    #[error("the clipboard was empty after copying; start the capture again")]
    ClipboardEmptyRead,
    #[error("the message has no copy button")]
    HandlerNotFound,
    #[error("the copy button did not respond in time")]
    CopyTimeout,
    #[error("the capture was cancelled")]
    Cancelled,
}

impl CaptureError {
    /// Fatal errors end the run; the rest only affect a single element.
    pub fn is_fatal(self) -> bool {
        !matches!(self, CaptureError::HandlerNotFound)
    }
}
