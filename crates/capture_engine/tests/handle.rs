mod common;

use capture_engine::{CaptureError, CaptureEvent, CaptureSequencer, Role, SequencerHandle};
use common::{fast_settings, init_logging, FakeClipboard, FakeDom};

fn drain_until_terminal(handle: &SequencerHandle) -> Vec<CaptureEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.recv() {
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            break;
        }
    }
    events
}

#[test]
fn handle_runs_capture_on_background_runtime() {
    init_logging();
    let clipboard = FakeClipboard::new();
    let dom = FakeDom::new(clipboard.clone());
    let elements = vec![
        dom.add_message(10, Role::User, "question"),
        dom.add_message(11, Role::Assistant, "answer"),
    ];
    let handle =
        SequencerHandle::new(CaptureSequencer::new(dom.clone(), clipboard, fast_settings()))
            .expect("runtime");

    handle.start(elements);
    let events = drain_until_terminal(&handle);

    let progress = events
        .iter()
        .filter(|event| matches!(event, CaptureEvent::Progress { .. }))
        .count();
    assert_eq!(progress, 2);
    match events.last() {
        Some(CaptureEvent::Finished { outcome }) => {
            let texts: Vec<_> = outcome.messages.iter().map(|m| m.text.as_str()).collect();
            assert_eq!(texts, vec!["question", "answer"]);
        }
        other => panic!("expected finished event, got {other:?}"),
    }
    assert_eq!(
        events.last().map(CaptureEvent::status_message).as_deref(),
        Some("Captured 2 of 2 messages.")
    );
}

#[test]
fn handle_reports_rejected_empty_selection() {
    init_logging();
    let clipboard = FakeClipboard::new();
    let dom = FakeDom::new(clipboard.clone());
    let handle = SequencerHandle::new(CaptureSequencer::new(dom, clipboard, fast_settings()))
        .expect("runtime");

    handle.start(Vec::new());
    let events = drain_until_terminal(&handle);

    assert_eq!(
        events,
        vec![CaptureEvent::Rejected {
            reason: CaptureError::EmptyQueue
        }]
    );
    assert!(events[0].status_message().starts_with("Capture not started"));
}

#[test]
fn cancel_right_after_start_aborts_the_run() {
    init_logging();
    let clipboard = FakeClipboard::new();
    let dom = FakeDom::new(clipboard.clone());
    let elements = vec![
        dom.add_message(1, Role::User, "one"),
        dom.add_message(2, Role::Assistant, "two"),
        dom.add_message(3, Role::User, "three"),
    ];
    let handle = SequencerHandle::new(CaptureSequencer::new(
        dom.clone(),
        clipboard.clone(),
        fast_settings(),
    ))
    .expect("runtime");

    handle.start(elements);
    handle.cancel();
    let events = drain_until_terminal(&handle);

    match events.last() {
        Some(CaptureEvent::Aborted { reason, outcome }) => {
            assert_eq!(*reason, CaptureError::Cancelled);
            assert!(outcome.messages.is_empty());
        }
        other => panic!("expected aborted event, got {other:?}"),
    }
    assert_eq!(clipboard.reads(), 0);
    assert!(dom.highlighted().is_empty());
}
