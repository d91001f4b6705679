use capture_core::{ElementId, Role};

use crate::{ClickHandler, ClipboardError};

/// The slice of the host page a capture run needs.
pub trait PageDom: Send + Sync {
    /// Current click handler of the element's copy control, if it has one.
    fn copy_handler(&self, element: ElementId) -> Option<ClickHandler>;

    fn replace_copy_handler(&self, element: ElementId, handler: ClickHandler);

    /// Clicks the element's copy control. Returns false when there is none.
    fn trigger_copy(&self, element: ElementId) -> bool;

    fn classify(&self, element: ElementId) -> Role;

    fn set_highlight(&self, element: ElementId, highlighted: bool);

    fn scroll_into_view(&self, element: ElementId);
}

#[async_trait::async_trait]
pub trait Clipboard: Send + Sync {
    async fn read_text(&self) -> Result<String, ClipboardError>;
}
