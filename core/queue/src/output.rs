use shellbook_protocol::CellOutput;
use tokio::sync::mpsc;

/// Receiving end of one execution's output.
///
/// Yields `None` once the execution has ended and every item was read.
#[derive(Debug)]
pub struct OutputStream {
    rx: mpsc::UnboundedReceiver<CellOutput>,
}

impl OutputStream {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<CellOutput>) -> Self {
        Self { rx }
    }

    /// A stream that is already finished.
    pub(crate) fn closed() -> Self {
        let (_, rx) = mpsc::unbounded_channel();
        Self { rx }
    }

    pub async fn recv(&mut self) -> Option<CellOutput> {
        self.rx.recv().await
    }
}
