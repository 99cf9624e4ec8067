use provex_model::ProgressEvent;
use tokio::sync::mpsc;

/// Default bound for the relay channel. Bounded so a slow consumer
/// applies backpressure to the producer instead of buffering without
/// limit.
pub const DEFAULT_RELAY_CAPACITY: usize = 32;

/// Create the ordered producer/consumer pair bridging one background
/// provisioning run to one streaming transport.
pub fn progress_channel(capacity: usize) -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ProgressSender { tx: Some(tx) }, ProgressReceiver { rx })
}

/// Producer half of the progress relay.
///
/// A disabled sender turns every emission into a no-op, which is how
/// the blocking invocation mode shares the orchestration code without
/// paying for a channel. Termination is guaranteed two ways: the
/// producer sends [`ProgressEvent::Close`] on every ordinary exit
/// path, and dropping the last sender closes the channel so the
/// consumer still unblocks if the producing task dies mid-pipeline.
#[derive(Clone, Debug)]
pub struct ProgressSender {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl ProgressSender {
    /// A sender that discards everything; used by blocking mode.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    pub async fn log(&self, line: impl Into<String>) {
        self.send(ProgressEvent::Log(line.into())).await;
    }

    pub async fn send(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            // A gone receiver means the client disconnected; the
            // pipeline completes regardless, so drop the event.
            let _ = tx.send(event).await;
        }
    }

    pub async fn close(&self) {
        self.send(ProgressEvent::Close).await;
    }

    /// Request-scoped sink handed to the registrar for the duration of
    /// the REGISTER_EXTERNAL stage only.
    pub fn diagnostics(&self) -> DiagnosticSink {
        DiagnosticSink {
            tx: self.tx.clone(),
        }
    }
}

/// Per-request sink for registrar diagnostics.
///
/// Passed explicitly into [`crate::traits::Registrar::register`], so
/// captured lines can only ever reach the relay of the request that
/// created the sink. There is no process-wide listener to install or
/// remove.
#[derive(Clone, Debug)]
pub struct DiagnosticSink {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl DiagnosticSink {
    /// A sink that discards diagnostics; used by blocking mode.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub async fn emit(&self, line: impl Into<String>) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(ProgressEvent::Log(line.into())).await;
        }
    }
}

/// Consumer half of the progress relay.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::Receiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Suspends until a message arrives; returns `None` once every
    /// sender is gone, so consumers terminate even if the producer
    /// never managed to enqueue `Close`.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }
}
