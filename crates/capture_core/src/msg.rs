use chrono::{DateTime, Utc};

use crate::{CaptureError, QueuedElement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User started a collection over the selected elements, in DOM order.
    StartCollection(Vec<QueuedElement>),
    /// The intercepted copy handler for `position` ran the site's own copy.
    CopyTriggered { position: usize },
    /// No copy control could be found for `position`.
    CopyHandlerMissing { position: usize },
    /// The copy control for `position` never fired.
    CopyTimedOut { position: usize },
    /// Result of the single clipboard read for `position`.
    ClipboardRead {
        position: usize,
        result: Result<String, CaptureError>,
        captured_at: DateTime<Utc>,
    },
    /// User asked to stop the run.
    CancelRequested,
    /// Fallback for placeholder wiring.
    NoOp,
}
