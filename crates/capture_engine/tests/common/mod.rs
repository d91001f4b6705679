#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use capture_engine::{
    CaptureEvent, CaptureEventSink, CaptureSettings, ClickHandler, Clipboard, ClipboardError,
    ElementId, PageDom, Role,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(export_logging::initialize_for_tests);
}

pub fn fast_settings() -> CaptureSettings {
    CaptureSettings {
        settle_delay: Duration::from_millis(1),
        copy_timeout: Some(Duration::from_millis(200)),
    }
}

#[derive(Default)]
pub struct FakeClipboard {
    contents: Mutex<String>,
    failures: Mutex<HashMap<usize, ClipboardError>>,
    reads: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeClipboard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn write(&self, text: &str) {
        *self.contents.lock().unwrap() = text.to_string();
    }

    /// Makes the `read`-th read (1-based) fail with `error`.
    pub fn fail_on_read(&self, read: usize, error: ClipboardError) {
        self.failures.lock().unwrap().insert(read, error);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Clipboard for FakeClipboard {
    async fn read_text(&self) -> Result<String, ClipboardError> {
        let read = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.failures.lock().unwrap().remove(&read) {
            return Err(error);
        }
        Ok(self.contents.lock().unwrap().clone())
    }
}

struct FakeElement {
    role: Role,
    handler: Option<ClickHandler>,
    /// When false, clicking the control does nothing (a user has to click).
    clickable: bool,
}

pub struct FakeDom {
    clipboard: Arc<FakeClipboard>,
    elements: Mutex<HashMap<ElementId, FakeElement>>,
    highlighted: Mutex<HashSet<ElementId>>,
    scrolled: Mutex<Vec<ElementId>>,
}

impl FakeDom {
    pub fn new(clipboard: Arc<FakeClipboard>) -> Arc<Self> {
        Arc::new(Self {
            clipboard,
            elements: Mutex::new(HashMap::new()),
            highlighted: Mutex::new(HashSet::new()),
            scrolled: Mutex::new(Vec::new()),
        })
    }

    /// Adds a message whose copy button writes `text` to the clipboard.
    pub fn add_message(&self, id: u64, role: Role, text: &str) -> ElementId {
        let clipboard = self.clipboard.clone();
        let text = text.to_string();
        let handler: ClickHandler = Arc::new(move || clipboard.write(&text));
        self.insert(id, role, Some(handler), true)
    }

    pub fn add_without_copy_button(&self, id: u64, role: Role) -> ElementId {
        self.insert(id, role, None, true)
    }

    /// Adds a message whose copy button only works when clicked by hand.
    pub fn add_manual_message(&self, id: u64, role: Role, text: &str) -> ElementId {
        let clipboard = self.clipboard.clone();
        let text = text.to_string();
        let handler: ClickHandler = Arc::new(move || clipboard.write(&text));
        self.insert(id, role, Some(handler), false)
    }

    fn insert(&self, id: u64, role: Role, handler: Option<ClickHandler>, clickable: bool) -> ElementId {
        let element = ElementId(id);
        self.elements.lock().unwrap().insert(
            element,
            FakeElement {
                role,
                handler,
                clickable,
            },
        );
        element
    }

    /// What a user clicking the copy button would run.
    pub fn user_click(&self, element: ElementId) {
        let handler = self.handler(element);
        if let Some(handler) = handler {
            handler();
        }
    }

    pub fn handler(&self, element: ElementId) -> Option<ClickHandler> {
        self.elements
            .lock()
            .unwrap()
            .get(&element)
            .and_then(|e| e.handler.clone())
    }

    pub fn highlighted(&self) -> HashSet<ElementId> {
        self.highlighted.lock().unwrap().clone()
    }

    pub fn scrolled(&self) -> Vec<ElementId> {
        self.scrolled.lock().unwrap().clone()
    }
}

impl PageDom for FakeDom {
    fn copy_handler(&self, element: ElementId) -> Option<ClickHandler> {
        self.handler(element)
    }

    fn replace_copy_handler(&self, element: ElementId, handler: ClickHandler) {
        if let Some(entry) = self.elements.lock().unwrap().get_mut(&element) {
            entry.handler = Some(handler);
        }
    }

    fn trigger_copy(&self, element: ElementId) -> bool {
        let (handler, clickable) = {
            let elements = self.elements.lock().unwrap();
            match elements.get(&element) {
                Some(entry) => (entry.handler.clone(), entry.clickable),
                None => (None, false),
            }
        };
        match handler {
            Some(handler) => {
                if clickable {
                    handler();
                }
                true
            }
            None => false,
        }
    }

    fn classify(&self, element: ElementId) -> Role {
        self.elements
            .lock()
            .unwrap()
            .get(&element)
            .map(|e| e.role)
            .unwrap_or(Role::Assistant)
    }

    fn set_highlight(&self, element: ElementId, highlighted: bool) {
        let mut set = self.highlighted.lock().unwrap();
        if highlighted {
            set.insert(element);
        } else {
            set.remove(&element);
        }
    }

    fn scroll_into_view(&self, element: ElementId) {
        self.scrolled.lock().unwrap().push(element);
    }
}

#[derive(Default)]
pub struct TestSink {
    events: Mutex<Vec<CaptureEvent>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<CaptureEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl CaptureEventSink for TestSink {
    fn emit(&self, event: CaptureEvent) {
        self.events.lock().unwrap().push(event);
    }
}
