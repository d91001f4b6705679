use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::view_model::CaptureViewModel;
use crate::{CaptureError, Effect};

/// Opaque handle to a message element on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the capture queue, classified when the run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedElement {
    pub element: ElementId,
    pub role: Role,
}

impl QueuedElement {
    pub fn new(element: ElementId, role: Role) -> Self {
        Self { element, role }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedMessage {
    pub role: Role,
    /// Clipboard text, verbatim.
    pub text: String,
    pub captured_at: DateTime<Utc>,
    /// Only used to highlight or scroll back to the source; never serialized.
    #[serde(skip)]
    pub source: Option<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementFailure {
    pub position: usize,
    pub element: ElementId,
    pub error: CaptureError,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureOutcome {
    pub messages: Vec<CapturedMessage>,
    pub failures: Vec<ElementFailure>,
    pub total: usize,
}

impl CaptureOutcome {
    pub fn status_message(&self) -> String {
        let mut status = format!(
            "Captured {} of {} messages.",
            self.messages.len(),
            self.total
        );
        if !self.failures.is_empty() {
            status.push_str(&format!(
                " {} skipped without a copy button.",
                self.failures.len()
            ));
        }
        status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePhase {
    #[default]
    Idle,
    Advancing,
    WaitingForCopy,
    Finished,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureState {
    phase: CapturePhase,
    queue: Vec<QueuedElement>,
    position: usize,
    messages: Vec<CapturedMessage>,
    failures: Vec<ElementFailure>,
    highlighted: Option<ElementId>,
    cancel_pending: bool,
    last_status: Option<String>,
    dirty: bool,
}

impl CaptureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            CapturePhase::Advancing | CapturePhase::WaitingForCopy
        )
    }

    pub fn messages(&self) -> &[CapturedMessage] {
        &self.messages
    }

    pub fn view(&self) -> CaptureViewModel {
        let total = self.queue.len();
        let current = if self.is_active() {
            self.position + 1
        } else {
            0
        };
        CaptureViewModel {
            phase: self.phase,
            current,
            total,
            captured: self.messages.len(),
            failures: self.failures.len(),
            status: self.last_status.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_status(&mut self, status: String) {
        self.last_status = Some(status);
        self.dirty = true;
    }

    /// True when `position` is the entry being processed and the run is in `phase`.
    pub(crate) fn expects(&self, position: usize, phase: CapturePhase) -> bool {
        self.phase == phase && self.position == position
    }

    pub(crate) fn begin_run(&mut self, queue: Vec<QueuedElement>) {
        self.queue = queue;
        self.position = 0;
        self.messages.clear();
        self.failures.clear();
        self.highlighted = None;
        self.cancel_pending = false;
        self.last_status = None;
        self.phase = CapturePhase::Advancing;
        self.dirty = true;
    }

    pub(crate) fn copy_triggered(&mut self) {
        self.phase = CapturePhase::WaitingForCopy;
        self.dirty = true;
    }

    pub(crate) fn defer_cancel(&mut self) {
        self.cancel_pending = true;
    }

    pub(crate) fn take_cancel_pending(&mut self) -> bool {
        std::mem::take(&mut self.cancel_pending)
    }

    pub(crate) fn record_message(&mut self, text: String, captured_at: DateTime<Utc>) {
        let entry = self.queue[self.position];
        self.messages.push(CapturedMessage {
            role: entry.role,
            text,
            captured_at,
            source: Some(entry.element),
        });
        self.position += 1;
        self.dirty = true;
    }

    pub(crate) fn record_failure(&mut self, error: CaptureError) {
        let entry = self.queue[self.position];
        self.failures.push(ElementFailure {
            position: self.position,
            element: entry.element,
            error,
        });
        self.position += 1;
        self.dirty = true;
    }

    /// Presents the entry at the current position, or finishes the run when
    /// the queue is exhausted.
    pub(crate) fn advance(&mut self) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(3);
        if let Some(previous) = self.highlighted.take() {
            effects.push(Effect::ClearHighlight { element: previous });
        }

        match self.queue.get(self.position).copied() {
            Some(entry) => {
                self.phase = CapturePhase::Advancing;
                self.highlighted = Some(entry.element);
                effects.push(Effect::Present {
                    position: self.position,
                    element: entry.element,
                    current: self.position + 1,
                    total: self.queue.len(),
                });
                effects.push(Effect::AwaitCopy {
                    position: self.position,
                    element: entry.element,
                });
            }
            None => {
                self.phase = CapturePhase::Finished;
                let outcome = self.outcome();
                self.set_status(outcome.status_message());
                effects.push(Effect::RestoreHandlers);
                effects.push(Effect::Finished(outcome));
            }
        }
        self.dirty = true;
        effects
    }

    pub(crate) fn abort(&mut self, reason: CaptureError) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(3);
        if let Some(previous) = self.highlighted.take() {
            effects.push(Effect::ClearHighlight { element: previous });
        }
        self.phase = CapturePhase::Aborted;
        let outcome = self.outcome();
        self.set_status(format!(
            "Capture stopped after {} of {} messages: {reason}",
            outcome.messages.len(),
            outcome.total
        ));
        effects.push(Effect::RestoreHandlers);
        effects.push(Effect::Aborted { reason, outcome });
        effects
    }

    fn outcome(&self) -> CaptureOutcome {
        CaptureOutcome {
            messages: self.messages.clone(),
            failures: self.failures.clone(),
            total: self.queue.len(),
        }
    }
}
