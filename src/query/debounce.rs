//! Input debouncing.
//!
//! [`channel`] returns a [`DebounceInput`] for every keystroke and a
//! [`Debounced`] stream that yields the latest value only after the input has
//! been quiet for the configured delay.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;

pub fn channel<T: Clone + Default>(delay: Duration) -> (DebounceInput<T>, Debounced<T>) {
    let (tx, rx) = watch::channel(T::default());
    (DebounceInput { tx }, Debounced { rx, delay })
}

#[derive(Debug)]
pub struct DebounceInput<T> {
    tx: watch::Sender<T>,
}

impl<T> DebounceInput<T> {
    /// Record a new raw value; restarts the quiet period.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }
}

#[derive(Debug)]
pub struct Debounced<T> {
    rx: watch::Receiver<T>,
    delay: Duration,
}

impl<T: Clone> Debounced<T> {
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the next settled value.
    ///
    /// Returns `None` once the input is dropped with nothing pending. A value
    /// still settling when the input goes away is yielded immediately.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        loop {
            match timeout(self.delay, self.rx.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) | Err(_) => break,
            }
        }
        Some(self.rx.borrow_and_update().clone())
    }
}
