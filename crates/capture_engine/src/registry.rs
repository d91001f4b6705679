use std::sync::Arc;

use capture_core::ElementId;
use export_logging::export_debug;

use crate::{ClickHandler, PageDom};

/// A copy control whose handler is temporarily replaced.
#[derive(Clone)]
pub struct InterceptedHandler {
    pub element: ElementId,
    pub original: ClickHandler,
    pub wrapped: ClickHandler,
}

/// Tracks every intercepted copy handler so they can be put back in one step.
///
/// Dropping the registry restores anything still intercepted.
pub struct HandlerRegistry {
    dom: Arc<dyn PageDom>,
    entries: Vec<InterceptedHandler>,
}

impl HandlerRegistry {
    pub fn new(dom: Arc<dyn PageDom>) -> Self {
        Self {
            dom,
            entries: Vec::new(),
        }
    }

    /// Replaces the element's copy handler with `wrap(original)`.
    ///
    /// Returns false, leaving the page untouched, when the element has no copy
    /// control. Wrapping an element twice keeps the first original.
    pub fn hijack<F>(&mut self, element: ElementId, wrap: F) -> bool
    where
        F: FnOnce(ClickHandler) -> ClickHandler,
    {
        let existing = self.entries.iter().position(|entry| entry.element == element);
        let original = match existing {
            Some(index) => self.entries[index].original.clone(),
            None => match self.dom.copy_handler(element) {
                Some(handler) => handler,
                None => return false,
            },
        };

        let wrapped = wrap(original.clone());
        self.dom.replace_copy_handler(element, wrapped.clone());

        let entry = InterceptedHandler {
            element,
            original,
            wrapped,
        };
        match existing {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
        true
    }

    pub fn is_intercepted(&self, element: ElementId) -> bool {
        self.entries.iter().any(|entry| entry.element == element)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reinstalls every original handler. Safe to call repeatedly.
    pub fn restore_all(&mut self) -> usize {
        let restored = self.entries.len();
        for entry in self.entries.drain(..) {
            self.dom.replace_copy_handler(entry.element, entry.original);
        }
        if restored > 0 {
            export_debug!("Restored {} copy handlers", restored);
        }
        restored
    }
}

impl Drop for HandlerRegistry {
    fn drop(&mut self) {
        self.restore_all();
    }
}
