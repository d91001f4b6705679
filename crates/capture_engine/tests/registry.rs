mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use capture_engine::{ClickHandler, ElementId, HandlerRegistry, Role};
use common::{FakeClipboard, FakeDom};

fn counting_wrapper(counter: &Arc<AtomicUsize>) -> impl FnOnce(ClickHandler) -> ClickHandler {
    let counter = counter.clone();
    move |original: ClickHandler| -> ClickHandler {
        Arc::new(move || {
            original();
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }
}

#[test]
fn wrapped_handler_runs_on_click() {
    let dom = FakeDom::new(FakeClipboard::new());
    let element = dom.add_message(1, Role::User, "copied by the site");
    let counter = Arc::new(AtomicUsize::new(0));
    let mut registry = HandlerRegistry::new(dom.clone());

    assert!(registry.hijack(element, counting_wrapper(&counter)));
    dom.user_click(element);

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(registry.is_intercepted(element));
}

#[test]
fn restore_all_reinstalls_the_same_handler() {
    let clipboard = FakeClipboard::new();
    let dom = FakeDom::new(clipboard);
    let a = dom.add_message(1, Role::User, "a");
    let b = dom.add_message(2, Role::Assistant, "b");
    let original_a = dom.handler(a).unwrap();
    let original_b = dom.handler(b).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let mut registry = HandlerRegistry::new(dom.clone());

    registry.hijack(a, counting_wrapper(&counter));
    registry.hijack(b, counting_wrapper(&counter));
    assert!(!Arc::ptr_eq(&dom.handler(a).unwrap(), &original_a));

    assert_eq!(registry.restore_all(), 2);
    assert_eq!(registry.restore_all(), 0);
    assert!(registry.is_empty());
    assert!(Arc::ptr_eq(&dom.handler(a).unwrap(), &original_a));
    assert!(Arc::ptr_eq(&dom.handler(b).unwrap(), &original_b));
}

#[test]
fn double_hijack_keeps_first_original() {
    let dom = FakeDom::new(FakeClipboard::new());
    let element = dom.add_message(1, Role::User, "x");
    let original = dom.handler(element).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let mut registry = HandlerRegistry::new(dom.clone());

    registry.hijack(element, counting_wrapper(&counter));
    registry.hijack(element, counting_wrapper(&counter));
    assert_eq!(registry.len(), 1);

    registry.restore_all();
    assert!(Arc::ptr_eq(&dom.handler(element).unwrap(), &original));
}

#[test]
fn missing_copy_control_is_not_registered() {
    let dom = FakeDom::new(FakeClipboard::new());
    let element = dom.add_without_copy_button(5, Role::Assistant);
    let counter = Arc::new(AtomicUsize::new(0));
    let mut registry = HandlerRegistry::new(dom.clone());

    assert!(!registry.hijack(element, counting_wrapper(&counter)));
    assert!(registry.is_empty());
    assert!(dom.handler(ElementId(5)).is_none());
}

#[test]
fn dropping_registry_restores_handlers() {
    let dom = FakeDom::new(FakeClipboard::new());
    let element = dom.add_message(1, Role::User, "x");
    let original = dom.handler(element).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    {
        let mut registry = HandlerRegistry::new(dom.clone());
        registry.hijack(element, counting_wrapper(&counter));
    }

    assert!(Arc::ptr_eq(&dom.handler(element).unwrap(), &original));
}
