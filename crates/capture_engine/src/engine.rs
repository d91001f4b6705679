use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use capture_core::ElementId;
use export_logging::export_debug;

use crate::sequencer::reject_busy;
use crate::sink::ChannelEventSink;
use crate::{CaptureEvent, CaptureSequencer};

enum SequencerCommand {
    Start { elements: Vec<ElementId> },
    Cancel,
}

/// Runs captures on a background runtime; the caller polls for events.
pub struct SequencerHandle {
    cmd_tx: mpsc::Sender<SequencerCommand>,
    event_rx: mpsc::Receiver<CaptureEvent>,
}

impl SequencerHandle {
    pub fn new(sequencer: CaptureSequencer) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sequencer = Arc::new(sequencer);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    SequencerCommand::Start { elements } => {
                        let sink = ChannelEventSink::new(event_tx.clone());
                        // Claimed before spawning so a Cancel queued behind this Start finds the run.
                        let Some(cancel) = sequencer.claim() else {
                            reject_busy(&sink);
                            continue;
                        };
                        let sequencer = sequencer.clone();
                        runtime.spawn(async move {
                            let _ = sequencer.run_claimed(cancel, &elements, &sink).await;
                        });
                    }
                    SequencerCommand::Cancel => sequencer.cancel_collection(),
                }
            }
            export_debug!("Sequencer command channel closed");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    /// Starts a capture over `elements`, in DOM order.
    pub fn start(&self, elements: Vec<ElementId>) {
        let _ = self.cmd_tx.send(SequencerCommand::Start { elements });
    }

    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(SequencerCommand::Cancel);
    }

    pub fn try_recv(&self) -> Option<CaptureEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event arrives or the engine thread is gone.
    pub fn recv(&self) -> Option<CaptureEvent> {
        self.event_rx.recv().ok()
    }
}
