//! # Debouncer
//!
//! A re-armable quiet-period timer meant to sit inside a controller's `select!` loop.
//!
//! ```rust,ignore
//! let event = tokio::select! {
//!     biased;
//!     cmd = receiver.recv() => Event::Command(cmd),
//!     () = debouncer.elapsed() => Event::QuietPeriodElapsed,
//! };
//! ```
//!
//! `elapsed()` is cancel safe: dropping the future keeps the deadline, so the next
//! loop iteration waits for the same instant again.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Delays an action until `quiet_period` has passed without another `schedule()`.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            deadline: None,
        }
    }

    /// (Re)starts the quiet period from now, discarding any earlier deadline.
    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet_period);
    }

    /// Disarms the timer. `elapsed()` will not resolve until the next `schedule()`.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Resolves once the current deadline passes, then disarms.
    /// Never resolves while nothing is scheduled.
    pub async fn elapsed(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_after_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(400));
        let start = Instant::now();
        debouncer.schedule();
        debouncer.elapsed().await;
        assert!(start.elapsed() >= Duration::from_millis(400));
        assert!(!debouncer.is_scheduled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_pushes_deadline() {
        let mut debouncer = Debouncer::new(Duration::from_millis(400));
        let start = Instant::now();
        debouncer.schedule();
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.schedule();
        debouncer.elapsed().await;
        assert!(start.elapsed() >= Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_never_fires() {
        let mut debouncer = Debouncer::new(Duration::from_millis(400));
        debouncer.schedule();
        debouncer.cancel();
        let fired = tokio::time::timeout(Duration::from_secs(5), debouncer.elapsed()).await;
        assert!(fired.is_err());
    }
}
