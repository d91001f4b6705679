use export_logging::{export_debug, export_info, export_warn};

use crate::{CaptureError, CapturePhase, CaptureState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: CaptureState, msg: Msg) -> (CaptureState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartCollection(queue) => {
            if state.is_active() {
                export_warn!("Rejected capture start: run already in progress");
                let reason = CaptureError::RunInProgress;
                state.set_status(reason.to_string());
                return (state, vec![Effect::StartRejected(reason)]);
            }
            if queue.is_empty() {
                let reason = CaptureError::EmptyQueue;
                state.set_status(reason.to_string());
                return (state, vec![Effect::StartRejected(reason)]);
            }
            export_info!("Capture run started with {} elements", queue.len());
            state.begin_run(queue);
            state.advance()
        }
        Msg::CopyTriggered { position } => {
            if !state.expects(position, CapturePhase::Advancing) {
                export_debug!("Ignoring copy signal for position {}", position);
                return (state, Vec::new());
            }
            state.copy_triggered();
            vec![Effect::ReadClipboard { position }]
        }
        Msg::CopyHandlerMissing { position } => {
            if !state.expects(position, CapturePhase::Advancing) {
                return (state, Vec::new());
            }
            export_warn!("No copy control for position {}; skipping", position);
            state.record_failure(CaptureError::HandlerNotFound);
            state.advance()
        }
        Msg::CopyTimedOut { position } => {
            if !state.expects(position, CapturePhase::Advancing) {
                return (state, Vec::new());
            }
            state.abort(CaptureError::CopyTimeout)
        }
        Msg::ClipboardRead {
            position,
            result,
            captured_at,
        } => {
            if !state.expects(position, CapturePhase::WaitingForCopy) {
                export_debug!("Ignoring stale clipboard result for position {}", position);
                return (state, Vec::new());
            }
            match result {
                Ok(text) if !text.trim().is_empty() => {
                    export_debug!(
                        "Captured position {} ({} chars)",
                        position,
                        text.chars().count()
                    );
                    state.record_message(text, captured_at);
                    if state.take_cancel_pending() {
                        state.abort(CaptureError::Cancelled)
                    } else {
                        state.advance()
                    }
                }
                Ok(_) => state.abort(CaptureError::ClipboardEmptyRead),
                Err(reason) => state.abort(reason),
            }
        }
        Msg::CancelRequested => match state.phase() {
            // The read in flight is still applied; the abort follows it.
            CapturePhase::WaitingForCopy => {
                export_debug!("Cancel deferred until the pending clipboard read lands");
                state.defer_cancel();
                Vec::new()
            }
            CapturePhase::Advancing => state.abort(CaptureError::Cancelled),
            _ => Vec::new(),
        },
        Msg::NoOp => Vec::new(),
    };

    for effect in &effects {
        match effect {
            Effect::Finished(outcome) => export_info!("{}", outcome.status_message()),
            Effect::Aborted { reason, outcome } => export_warn!(
                "Capture aborted after {} of {} messages: {}",
                outcome.messages.len(),
                outcome.total,
                reason
            ),
            _ => {}
        }
    }

    (state, effects)
}
