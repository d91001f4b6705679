//! Capture core: pure state machine for ordered clipboard capture runs.
mod effect;
mod error;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::CaptureError;
pub use msg::Msg;
pub use state::{
    CaptureOutcome, CapturePhase, CaptureState, CapturedMessage, ElementFailure, ElementId,
    QueuedElement, Role,
};
pub use update::update;
pub use view_model::CaptureViewModel;
