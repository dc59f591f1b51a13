//! Cancellable timer slot
//!
//! A controller owns exactly one pending timer: either its tick loop or the
//! delayed auto-resume after a track finishes.

use tokio::task::JoinHandle;

/// Holds at most one scheduled task
#[derive(Debug, Default)]
pub(crate) struct Timer {
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    /// Schedule `handle`, cancelling whatever was pending
    pub(crate) fn start(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.handle = Some(handle);
    }

    /// Abort the pending task, if any
    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Forget the pending task without aborting it
    ///
    /// Used by a timer task that is about to finish on its own.
    pub(crate) fn release(&mut self) {
        self.handle = None;
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn flag_after(delay: Duration, flag: &Arc<AtomicBool>) -> JoinHandle<()> {
        let flag = Arc::clone(flag);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            flag.store(true, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn start_cancels_pending_task() {
        let mut timer = Timer::default();
        assert!(!timer.is_pending());

        let first = Arc::new(AtomicBool::new(false));
        let second = Arc::new(AtomicBool::new(false));
        timer.start(flag_after(Duration::from_secs(1), &first));
        assert!(timer.is_pending());
        timer.start(flag_after(Duration::from_secs(1), &second));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!first.load(Ordering::SeqCst));
        assert!(second.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_aborts_task() {
        let mut timer = Timer::default();
        let fired = Arc::new(AtomicBool::new(false));
        timer.start(flag_after(Duration::from_secs(1), &fired));

        timer.cancel();
        assert!(!timer.is_pending());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn release_lets_task_run() {
        let mut timer = Timer::default();
        let fired = Arc::new(AtomicBool::new(false));
        timer.start(flag_after(Duration::from_secs(1), &fired));

        timer.release();
        assert!(!timer.is_pending());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(fired.load(Ordering::SeqCst));
    }
}
