use crate::CapturePhase;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureViewModel {
    pub phase: CapturePhase,
    /// 1-based position of the element being captured; 0 when no run is active.
    pub current: usize,
    pub total: usize,
    pub captured: usize,
    pub failures: usize,
    /// Human-readable status of the last terminal state or rejection.
    pub status: Option<String>,
    pub dirty: bool,
}
