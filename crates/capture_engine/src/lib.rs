//! Capture engine: drives capture runs against a host page and its clipboard.
mod dom;
mod engine;
mod registry;
mod sequencer;
mod sink;
mod types;

pub use dom::{Clipboard, PageDom};
pub use engine::SequencerHandle;
pub use registry::{HandlerRegistry, InterceptedHandler};
pub use sequencer::{CaptureSequencer, CaptureSettings};
pub use sink::{CaptureEventSink, ChannelEventSink};
pub use types::{CaptureEvent, CaptureFailure, ClickHandler, ClipboardError};

pub use capture_core::{
    CaptureError, CaptureOutcome, CapturedMessage, ElementFailure, ElementId, Role,
};
