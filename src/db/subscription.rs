use tokio::sync::broadcast::{self, error::RecvError};

/// Default buffer for real-time channels
pub const CHANNEL_CAPACITY: usize = 64;

/// Handle to a real-time listener.
///
/// Yields the initial snapshot (when there is one) and then every published
/// update. Dropping the handle releases the underlying receiver, so a view
/// owns its listener for exactly as long as it holds the handle.
#[derive(Debug)]
pub struct Subscription<T> {
    initial: Option<T>,
    rx: broadcast::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    pub fn new(initial: Option<T>, rx: broadcast::Receiver<T>) -> Self {
        Self { initial, rx }
    }

    /// Waits for the next value, `None` once the publisher is gone
    pub async fn next(&mut self) -> Option<T> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }

        loop {
            match self.rx.recv().await {
                Ok(value) => return Some(value),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagged behind, skipping to newest");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Takes the initial snapshot without waiting for updates
    pub fn take_initial(&mut self) -> Option<T> {
        self.initial.take()
    }

    /// Releases the listener
    pub fn unsubscribe(self) {}
}
