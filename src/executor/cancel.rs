//! Cooperative cancellation backed by a `tokio::sync::watch` channel

use tokio::sync::watch;

/// Receiving side of a cancellation flag.
///
/// The flag starts `false`; sending `true` cancels every clone. If the
/// sender is dropped without cancelling, `cancelled()` never resolves.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Create a signal and the sender that fires it
    pub fn new() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    pub fn from_receiver(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// A signal that can never fire
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the flag is set
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // Sender gone without cancelling
                std::future::pending::<()>().await;
            }
        }
    }
}
