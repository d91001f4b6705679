use crate::{CaptureError, CaptureOutcome, ElementId};

/// Side effects requested by [`crate::update`]; executed by the host driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A start request was refused; the state was left untouched.
    StartRejected(CaptureError),
    /// Highlight and scroll to the element, and surface "current of total".
    Present {
        position: usize,
        element: ElementId,
        current: usize,
        total: usize,
    },
    ClearHighlight { element: ElementId },
    /// Intercept the element's copy control and trigger it once.
    AwaitCopy { position: usize, element: ElementId },
    /// Wait for the clipboard to settle, then read it exactly once.
    ReadClipboard { position: usize },
    /// Put every intercepted copy handler back.
    RestoreHandlers,
    Finished(CaptureOutcome),
    Aborted {
        reason: CaptureError,
        outcome: CaptureOutcome,
    },
}
