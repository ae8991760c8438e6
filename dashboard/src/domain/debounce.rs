//! Cancellable debounce timer.
//!
//! Each input source (search box, age slider) owns one [`Debouncer`]. A
//! new event re-arms the single pending timer instead of queueing another
//! action, so a keystroke burst coalesces into one fetch once the burst
//! has quiesced for the configured window.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

/// One pending timer for one input source.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// A debouncer with the given quiescence window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Mutex::new(None),
        }
    }

    /// The configured quiescence window.
    pub fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm the timer with `action`, cancelling any previously armed action.
    ///
    /// The action runs once the window elapses without another `fire`.
    /// Must be called from within a tokio runtime.
    pub fn fire<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let window = self.window;
        let mut pending = self.lock();
        if let Some(armed) = pending.take() {
            armed.abort();
        }
        *pending = Some(tokio::spawn(async move {
            sleep(window).await;
            action.await;
        }));
    }

    /// Drop any armed action without running it.
    pub fn cancel(&self) {
        if let Some(armed) = self.lock().take() {
            armed.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
