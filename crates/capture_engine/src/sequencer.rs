use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use capture_core::{
    update, CaptureError, CaptureOutcome, CaptureState, Effect, ElementId, Msg, QueuedElement,
};
use chrono::Utc;
use export_logging::{export_debug, export_error, export_info, export_warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    CaptureEvent, CaptureEventSink, CaptureFailure, Clipboard, ClickHandler, HandlerRegistry,
    PageDom,
};

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Pause between the site's copy handler running and the clipboard read.
    pub settle_delay: Duration,
    /// How long to wait for the copy control to fire; `None` waits for the user.
    pub copy_timeout: Option<Duration>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(300),
            copy_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Runs one capture at a time over a page and its clipboard.
pub struct CaptureSequencer {
    dom: Arc<dyn PageDom>,
    clipboard: Arc<dyn Clipboard>,
    settings: CaptureSettings,
    active: Mutex<Option<CancellationToken>>,
}

enum Step {
    Continue,
    Next(Vec<Msg>),
    Done(Result<CaptureOutcome, CaptureFailure>),
}

struct Run {
    registry: HandlerRegistry,
    signal_tx: mpsc::UnboundedSender<usize>,
    signal_rx: mpsc::UnboundedReceiver<usize>,
    cancel: CancellationToken,
}

/// Releases the active-run slot when the run ends, however it ends.
struct ActiveGuard<'a> {
    slot: &'a Mutex<Option<CancellationToken>>,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        lock(self.slot).take();
    }
}

impl CaptureSequencer {
    pub fn new(
        dom: Arc<dyn PageDom>,
        clipboard: Arc<dyn Clipboard>,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            dom,
            clipboard,
            settings,
            active: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.active).is_some()
    }

    /// Requests that the active run stop at its next check point.
    pub fn cancel_collection(&self) {
        match lock(&self.active).as_ref() {
            Some(token) => {
                export_info!("Capture cancel requested");
                token.cancel();
            }
            None => export_debug!("Cancel requested with no active capture"),
        }
    }

    /// Captures `elements` in the given order, one clipboard round-trip each.
    ///
    /// Progress and the terminal state are also emitted through `sink`.
    pub async fn start_collection(
        &self,
        elements: &[ElementId],
        sink: &dyn CaptureEventSink,
    ) -> Result<CaptureOutcome, CaptureFailure> {
        match self.claim() {
            Some(cancel) => self.run_claimed(cancel, elements, sink).await,
            None => Err(reject_busy(sink)),
        }
    }

    /// Takes the active-run slot, or `None` when a run already holds it.
    pub(crate) fn claim(&self) -> Option<CancellationToken> {
        let mut slot = lock(&self.active);
        if slot.is_some() {
            return None;
        }
        let token = CancellationToken::new();
        *slot = Some(token.clone());
        Some(token)
    }

    /// Drives a run whose slot was already taken with [`Self::claim`].
    pub(crate) async fn run_claimed(
        &self,
        cancel: CancellationToken,
        elements: &[ElementId],
        sink: &dyn CaptureEventSink,
    ) -> Result<CaptureOutcome, CaptureFailure> {
        let _guard = ActiveGuard { slot: &self.active };

        // The queue is fixed here; later page re-renders cannot reorder the run.
        let queue: Vec<QueuedElement> = elements
            .iter()
            .map(|&element| QueuedElement::new(element, self.dom.classify(element)))
            .collect();

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let mut run = Run {
            registry: HandlerRegistry::new(self.dom.clone()),
            signal_tx,
            signal_rx,
            cancel,
        };

        let mut state = CaptureState::new();
        let mut inbox = VecDeque::from([Msg::StartCollection(queue)]);
        while let Some(msg) = inbox.pop_front() {
            let (next, effects) = update(state, msg);
            state = next;
            for effect in effects {
                match self.execute(effect, &mut run, sink).await {
                    Step::Continue => {}
                    Step::Next(msgs) => inbox.extend(msgs),
                    Step::Done(result) => return result,
                }
            }
        }

        // Unreachable: every path through the state machine ends in a terminal effect.
        export_error!("Capture run ended without a terminal state");
        let reason = CaptureError::Cancelled;
        sink.emit(CaptureEvent::Aborted {
            reason,
            outcome: CaptureOutcome::default(),
        });
        Err(CaptureFailure::rejected(reason))
    }

    async fn execute(&self, effect: Effect, run: &mut Run, sink: &dyn CaptureEventSink) -> Step {
        match effect {
            Effect::StartRejected(reason) => {
                sink.emit(CaptureEvent::Rejected { reason });
                Step::Done(Err(CaptureFailure::rejected(reason)))
            }
            Effect::Present {
                element,
                current,
                total,
                ..
            } => {
                self.dom.set_highlight(element, true);
                self.dom.scroll_into_view(element);
                sink.emit(CaptureEvent::Progress { current, total });
                Step::Continue
            }
            Effect::ClearHighlight { element } => {
                self.dom.set_highlight(element, false);
                Step::Continue
            }
            Effect::AwaitCopy { position, element } => {
                Step::Next(vec![self.await_copy(position, element, run).await])
            }
            Effect::ReadClipboard { position } => {
                // Not cancellable: a started read is always applied, then any cancel seen meanwhile.
                tokio::time::sleep(self.settings.settle_delay).await;
                let result = self
                    .clipboard
                    .read_text()
                    .await
                    .map_err(CaptureError::from);
                let read = Msg::ClipboardRead {
                    position,
                    result,
                    captured_at: Utc::now(),
                };
                if run.cancel.is_cancelled() {
                    Step::Next(vec![Msg::CancelRequested, read])
                } else {
                    Step::Next(vec![read])
                }
            }
            Effect::RestoreHandlers => {
                run.registry.restore_all();
                Step::Continue
            }
            Effect::Finished(outcome) => {
                sink.emit(CaptureEvent::Finished {
                    outcome: outcome.clone(),
                });
                Step::Done(Ok(outcome))
            }
            Effect::Aborted { reason, outcome } => {
                sink.emit(CaptureEvent::Aborted {
                    reason,
                    outcome: outcome.clone(),
                });
                Step::Done(Err(CaptureFailure {
                    reason,
                    partial: outcome,
                }))
            }
        }
    }

    async fn await_copy(&self, position: usize, element: ElementId, run: &mut Run) -> Msg {
        if run.cancel.is_cancelled() {
            return Msg::CancelRequested;
        }

        let signal_tx = run.signal_tx.clone();
        let installed = run.registry.hijack(element, move |original: ClickHandler| {
            Arc::new(move || {
                original();
                let _ = signal_tx.send(position);
            }) as ClickHandler
        });
        if !installed {
            return Msg::CopyHandlerMissing { position };
        }

        // Drop signals left over from earlier elements before clicking.
        while run.signal_rx.try_recv().is_ok() {}

        if !self.dom.trigger_copy(element) {
            return Msg::CopyHandlerMissing { position };
        }

        let copy_timeout = self.settings.copy_timeout;
        let signal_rx = &mut run.signal_rx;
        let wait = async move {
            match copy_timeout {
                Some(limit) => tokio::time::timeout(limit, wait_for_signal(signal_rx, position))
                    .await
                    .unwrap_or(false),
                None => wait_for_signal(signal_rx, position).await,
            }
        };

        tokio::select! {
            biased;
            _ = run.cancel.cancelled() => Msg::CancelRequested,
            signalled = wait => {
                if signalled {
                    Msg::CopyTriggered { position }
                } else {
                    Msg::CopyTimedOut { position }
                }
            }
        }
    }
}

async fn wait_for_signal(rx: &mut mpsc::UnboundedReceiver<usize>, position: usize) -> bool {
    while let Some(signalled) = rx.recv().await {
        if signalled == position {
            return true;
        }
        export_debug!(
            "Ignoring copy signal for position {} while waiting for {}",
            signalled,
            position
        );
    }
    false
}

/// Reports a start refused because another run holds the slot.
pub(crate) fn reject_busy(sink: &dyn CaptureEventSink) -> CaptureFailure {
    let reason = CaptureError::RunInProgress;
    export_warn!("Rejected capture start: {}", reason);
    sink.emit(CaptureEvent::Rejected { reason });
    CaptureFailure::rejected(reason)
}

fn lock(slot: &Mutex<Option<CancellationToken>>) -> MutexGuard<'_, Option<CancellationToken>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
