use crate::CaptureEvent;

pub trait CaptureEventSink: Send + Sync {
    fn emit(&self, event: CaptureEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<CaptureEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<CaptureEvent>) -> Self {
        Self { tx }
    }
}

impl CaptureEventSink for ChannelEventSink {
    fn emit(&self, event: CaptureEvent) {
        let _ = self.tx.send(event);
    }
}
