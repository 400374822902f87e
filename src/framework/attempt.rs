//! # Attempts and Cancellation
//!
//! Each unit of asynchronous work a controller starts (a search fetch, a comment
//! session) is tagged with an [`Attempt`]: an id plus a `CancellationToken`.
//! The token travels with the request into the catalog client, which aborts the
//! transport when it fires. Cancellation is best-effort, so the controller also
//! checks [`AttemptTracker::is_current`] before applying any result that comes back.

use tokio_util::sync::CancellationToken;

/// Handle identifying one piece of in-flight work.
#[derive(Debug, Clone)]
pub struct Attempt {
    id: u64,
    token: CancellationToken,
}

impl Attempt {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Tracks the single authoritative attempt of a controller.
#[derive(Debug)]
pub struct AttemptTracker {
    next_id: u64,
    current: Option<Attempt>,
    parent: Option<CancellationToken>,
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            current: None,
            parent: None,
        }
    }

    /// Attempts become children of `parent`: cancelling it cancels them all.
    pub fn with_parent(parent: CancellationToken) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new()
        }
    }

    /// Cancels whatever is in flight and starts a new authoritative attempt.
    pub fn begin(&mut self) -> Attempt {
        self.supersede();
        let token = match &self.parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let attempt = Attempt {
            id: self.next_id,
            token,
        };
        self.next_id += 1;
        self.current = Some(attempt.clone());
        attempt
    }

    /// Cancels the in-flight attempt, if any. Returns whether one was cancelled.
    pub fn supersede(&mut self) -> bool {
        match self.current.take() {
            Some(attempt) => {
                attempt.token.cancel();
                true
            }
            None => false,
        }
    }

    /// True only for the latest attempt, and only while it has not been cancelled.
    pub fn is_current(&self, attempt: &Attempt) -> bool {
        !attempt.is_cancelled()
            && self
                .current
                .as_ref()
                .is_some_and(|current| current.id == attempt.id)
    }

    /// Marks `attempt` settled. Stale attempts are ignored.
    pub fn finish(&mut self, attempt: &Attempt) {
        if self.is_current(attempt) {
            self.current = None;
        }
    }

    pub fn in_flight(&self) -> Option<&Attempt> {
        self.current.as_ref()
    }
}

impl Default for AttemptTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_supersedes_previous() {
        let mut tracker = AttemptTracker::new();
        let first = tracker.begin();
        let second = tracker.begin();

        assert!(first.is_cancelled());
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
        assert_eq!(second.id(), first.id() + 1);
    }

    #[test]
    fn test_finish_clears_only_current() {
        let mut tracker = AttemptTracker::new();
        let stale = tracker.begin();
        let current = tracker.begin();

        tracker.finish(&stale);
        assert!(tracker.in_flight().is_some());

        tracker.finish(&current);
        assert!(tracker.in_flight().is_none());
        // A finished attempt is no longer authoritative.
        assert!(!tracker.is_current(&current));
    }

    #[test]
    fn test_parent_cancellation_reaches_attempts() {
        let parent = CancellationToken::new();
        let mut tracker = AttemptTracker::with_parent(parent.clone());
        let attempt = tracker.begin();

        parent.cancel();
        assert!(attempt.is_cancelled());
        assert!(!tracker.is_current(&attempt));
    }

    #[test]
    fn test_supersede_without_attempt() {
        let mut tracker = AttemptTracker::new();
        assert!(!tracker.supersede());
    }
}
